//! Knowledge base store
//!
//! Provides SQLite-based storage with:
//! - FTS5 full-text search
//! - Embedding storage with cosine similarity search
//! - Content-addressable fragments

mod content;
mod keyword;
mod schema;
pub mod vectors;

pub use content::{fragment_id_from_hash, hash_content, Inserted, NewFragment, FRAGMENT_ID_CHARS};
pub use keyword::{bm25_to_score, sanitize_fts5_query};
pub use schema::KnowledgeBase;

use crate::error::Result;
use crate::search::{DocumentFragment, KeywordSearch, VectorSearch};
use async_trait::async_trait;
use std::path::PathBuf;

impl KnowledgeBase {
    /// Get the default database path
    ///
    /// `CAMPUSRAG_DB` overrides the per-user cache location.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("CAMPUSRAG_DB") {
            return PathBuf::from(path);
        }
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CACHE_DIR_NAME)
            .join("knowledge.sqlite")
    }
}

#[async_trait]
impl VectorSearch for KnowledgeBase {
    async fn vector_search(
        &self,
        query_vector: &[f32],
        similarity_floor: f64,
        limit: usize,
    ) -> Result<Vec<DocumentFragment>> {
        self.search_vectors(query_vector, similarity_floor, limit)
    }
}

#[async_trait]
impl KeywordSearch for KnowledgeBase {
    async fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<DocumentFragment>> {
        self.search_fts(query, limit)
    }
}
