//! Campusrag Core Library
//!
//! Advanced retrieval pipeline for answering admissions and policy questions
//! from a knowledge base of document fragments.
//!
//! # Features
//! - Hybrid search: vector similarity plus FTS5 keyword search with weighted rank fusion
//! - Domain query-pattern boosting with literal keyword probes
//! - LLM query reformulation, per-fragment relevance reranking and intent routing
//! - MMR diversity selection and query-guided context compression
//! - HyDE retrieval and LLM-rated context evaluation
//! - SQLite knowledge base store with content-addressable fragments

pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod search;

pub use config::{BoostConfig, Config, LLMServiceConfig, RetrievalConfig};
pub use db::{KnowledgeBase, NewFragment};
pub use error::{CampusRagError, Error, Result};
pub use llm::{
    ChatMessage, CompletionParams, ContextEvaluator, Embedder, HttpCompleter, HttpEmbedder,
    LLMClient, MetricsSnapshot, QueryExpander, QueryIntent, QueryRouter, Reranker,
    RetrievalMetrics, TextCompleter, VLLMClient,
};
pub use search::{
    DocumentFragment, KeywordSearch, PipelineReport, RetrievalMode, RetrievalPipeline,
    SearchSource, Strategy, VectorSearch, NOT_FOUND_SENTINEL,
};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "campusrag";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "campusrag";
