//! LLM trait definitions

use crate::error::Result;
use crate::search::DocumentFragment;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Embedding generation trait
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for batch of texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Sampling parameters for a single completion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.7,
        }
    }
}

/// Single-shot text completion
#[async_trait]
pub trait TextCompleter: Send + Sync {
    /// Complete `prompt`, returning the raw model text
    async fn complete(&self, prompt: &str, params: CompletionParams) -> Result<String>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Query reformulation trait
///
/// Never fails: implementations degrade to `[query]`.
#[async_trait]
pub trait QueryExpander: Send + Sync {
    /// Original query first, followed by alternative phrasings
    async fn expand(&self, query: &str) -> Vec<String>;
}

/// Fragment reranking trait
///
/// Never fails: fragments that cannot be scored keep their prior score.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Rescore fragments for `query`, most relevant first
    async fn rerank(&self, query: &str, fragments: Vec<DocumentFragment>) -> Vec<DocumentFragment>;
}
