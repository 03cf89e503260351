//! Search store trait definitions

use super::DocumentFragment;
use crate::error::Result;
use async_trait::async_trait;

/// Vector similarity search over the fragment corpus
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// Fragments whose similarity to `query_vector` is at least `similarity_floor`,
    /// most similar first, with the similarity as `relevance_score`
    async fn vector_search(
        &self,
        query_vector: &[f32],
        similarity_floor: f64,
        limit: usize,
    ) -> Result<Vec<DocumentFragment>>;
}

/// Full-text search over the same corpus
#[async_trait]
pub trait KeywordSearch: Send + Sync {
    /// Fragments matching `query`, best match first
    async fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<DocumentFragment>>;
}
