//! Error types for campusrag

use thiserror::Error;

/// Result type alias using CampusRagError
pub type Result<T> = std::result::Result<T, CampusRagError>;

/// Error type alias for convenience
pub type Error = CampusRagError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for campusrag
#[derive(Debug, Error)]
pub enum CampusRagError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fragment not found: {0}")]
    FragmentNotFound(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External service error: {0}")]
    ExternalError(String),

    #[error("Timed out after {0} ms")]
    Timeout(u64),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CampusRagError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FragmentNotFound(_) => exit_codes::NOT_FOUND,
            Self::InvalidInput(_) | Self::Config(_) | Self::Regex(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CampusRagError::FragmentNotFound("abc".into()).exit_code(),
            exit_codes::NOT_FOUND
        );
        assert_eq!(
            CampusRagError::Config("bad".into()).exit_code(),
            exit_codes::INVALID_INPUT
        );
        assert_eq!(
            CampusRagError::Llm("down".into()).exit_code(),
            exit_codes::GENERAL_ERROR
        );
    }
}
