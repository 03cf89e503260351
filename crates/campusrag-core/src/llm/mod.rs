//! LLM integration
//!
//! Provides traits and implementations for:
//! - Embedding generation and text completion via external services (vLLM, OpenAI, etc.)
//! - Query reformulation and intent routing
//! - Relevance reranking
//! - Context compression and evaluation

mod cache;
mod client;
mod context_compressor;
mod context_evaluator;
mod http_completer;
mod http_embedder;
mod query_reformulator;
mod query_router;
mod relevance_reranker;
mod scoring;
mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheStats, LLMCache};
pub use client::{ChatMessage, LLMClient, MetricsSnapshot, VLLMClient, EMBED_INPUT_CHARS};
pub use context_compressor::{CompressedContext, CompressionKind, ContextCompressor};
pub use context_evaluator::{
    overall_score, score_conciseness, ContextEvaluator, EvaluationRecord, EvaluationStatistics,
    MetricStats, RetrievalMetrics,
};
pub use http_completer::HttpCompleter;
pub use http_embedder::HttpEmbedder;
pub use query_reformulator::{QueryReformulator, ALTERNATIVE_COUNT};
pub use query_router::{QueryIntent, QueryRouter, RouteDecision};
pub use relevance_reranker::RelevanceReranker;
pub use scoring::{parse_leading_number, parse_rating};
pub use traits::*;
