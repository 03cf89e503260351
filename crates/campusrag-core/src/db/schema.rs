//! Knowledge base schema and initialization

use crate::error::{CampusRagError, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite-backed store of pre-chunked document fragments
///
/// The connection sits behind a mutex so one store can serve concurrent
/// pipeline runs.
pub struct KnowledgeBase {
    conn: Mutex<Connection>,
}

const SCHEMA_VERSION: i32 = 1;

const CREATE_TABLES: &str = r#"
-- Fragments (content-addressable by SHA-256 hash)
CREATE TABLE IF NOT EXISTS fragments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    hash TEXT NOT NULL UNIQUE,
    content TEXT NOT NULL,
    source TEXT NOT NULL,
    title TEXT,
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL
);

-- Full-text search index
CREATE VIRTUAL TABLE IF NOT EXISTS fragments_fts USING fts5(
    title,
    body,
    tokenize='porter unicode61'
);

-- One embedding per fragment
CREATE TABLE IF NOT EXISTS embeddings (
    fragment_id INTEGER PRIMARY KEY REFERENCES fragments(id) ON DELETE CASCADE,
    dimensions INTEGER NOT NULL,
    embedding BLOB NOT NULL,
    created_at TEXT NOT NULL
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

CREATE INDEX IF NOT EXISTS idx_fragments_source ON fragments(source);
"#;

const CREATE_TRIGGERS: &str = r#"
CREATE TRIGGER IF NOT EXISTS fragments_ai
AFTER INSERT ON fragments
BEGIN
    INSERT INTO fragments_fts(rowid, title, body)
    VALUES (new.id, COALESCE(new.title, ''), new.content);
END;

CREATE TRIGGER IF NOT EXISTS fragments_ad
AFTER DELETE ON fragments
BEGIN
    DELETE FROM fragments_fts WHERE rowid = old.id;
END;
"#;

impl KnowledgeBase {
    /// Open database at path, creating if necessary
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Initialize database schema
    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        conn.execute_batch(CREATE_TABLES)?;
        conn.execute_batch(CREATE_TRIGGERS)?;

        conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> Result<Option<i32>> {
        let version = self
            .conn()?
            .query_row(
                "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .ok();
        Ok(version)
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CampusRagError::Search("knowledge base connection poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_is_idempotent() {
        let kb = KnowledgeBase::open_in_memory().unwrap();
        kb.initialize().unwrap();
        kb.initialize().unwrap();
        assert_eq!(kb.schema_version().unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("knowledge.sqlite");
        let kb = KnowledgeBase::open(&path).unwrap();
        kb.initialize().unwrap();
        assert!(path.exists());
    }
}
