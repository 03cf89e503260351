//! Configuration management

mod boost;

pub use boost::{BoostConfig, BoostRule, ProgramRule};

use crate::error::{CampusRagError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM service configuration
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Retrieval pipeline tuning
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Query-pattern boosting rules
    #[serde(default)]
    pub boost: BoostConfig,
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the LLM service for chat/completions
    pub url: String,

    /// Model name for chat completions (reformulation, scoring, routing, compression)
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimensions (will be auto-detected if not specified)
    #[serde(default)]
    pub embedding_dimensions: Option<usize>,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl LLMServiceConfig {
    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("CAMPUSRAG_LLM_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            model: default_chat_model(),
            embedding_url: std::env::var("CAMPUSRAG_EMBEDDING_URL").ok(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: std::env::var("CAMPUSRAG_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok()),
            api_key: std::env::var("CAMPUSRAG_LLM_API_KEY").ok(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_chat_model() -> String {
    std::env::var("CAMPUSRAG_LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("CAMPUSRAG_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "text-embedding-ada-002".to_string())
}

fn default_timeout() -> u64 {
    30
}

/// Tuning knobs for the retrieval pipeline stages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Minimum cosine similarity for the semantic branch
    pub similarity_floor: f64,
    /// Multiplier applied to the keyword result count for boosted queries
    pub keyword_boost_factor: usize,
    /// Only this many leading fragments are scored by the reranker
    pub rerank_limit: usize,
    /// Characters of fragment content shown to the scoring prompt
    pub rerank_excerpt_chars: usize,
    /// Score multiplier for fragments beyond the rerank limit
    pub overflow_penalty: f64,
    /// Per-call timeout for scoring requests (none = rely on the HTTP timeout)
    pub rerank_timeout_ms: Option<u64>,
    /// Fragments kept when nothing passes the relevance threshold
    pub filter_fallback_count: usize,
    /// Character ceiling on context sent for compression
    pub compression_input_chars: usize,
    /// Fragments kept when compression fails
    pub compression_fallback_count: usize,
    /// MMR trade-off between relevance (1.0) and novelty (0.0)
    pub mmr_lambda: f64,
    /// Results fetched per literal probe
    pub probe_result_limit: usize,
    /// Upper bound on literal probes issued for one query
    pub max_probes: usize,
    /// Similarity floor for HyDE vector search
    pub hyde_similarity_floor: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            similarity_floor: 0.3,
            keyword_boost_factor: 2,
            rerank_limit: 20,
            rerank_excerpt_chars: 500,
            overflow_penalty: 0.5,
            rerank_timeout_ms: None,
            filter_fallback_count: 3,
            compression_input_chars: 8000,
            compression_fallback_count: 5,
            mmr_lambda: 0.5,
            probe_result_limit: 5,
            max_probes: 8,
            hyde_similarity_floor: 0.4,
        }
    }
}

impl RetrievalConfig {
    /// Reject values that would break pipeline invariants
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.similarity_floor) {
            return Err(CampusRagError::Config(format!(
                "similarity_floor must be within [0, 1], got {}",
                self.similarity_floor
            )));
        }
        if !(0.0..=1.0).contains(&self.mmr_lambda) {
            return Err(CampusRagError::Config(format!(
                "mmr_lambda must be within [0, 1], got {}",
                self.mmr_lambda
            )));
        }
        if !(0.0..=1.0).contains(&self.overflow_penalty) {
            return Err(CampusRagError::Config(format!(
                "overflow_penalty must be within [0, 1], got {}",
                self.overflow_penalty
            )));
        }
        for (name, value) in [
            ("keyword_boost_factor", self.keyword_boost_factor),
            ("filter_fallback_count", self.filter_fallback_count),
            ("compression_fallback_count", self.compression_fallback_count),
        ] {
            if value == 0 {
                return Err(CampusRagError::Config(format!("{} must be at least 1", name)));
            }
        }
        Ok(())
    }
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from an explicit path, falling back to defaults when absent
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_yaml::from_str::<Config>(&content)?
        } else {
            Config::default()
        };
        config.retrieval.validate()?;
        Ok(config)
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}
