//! Retrieval pipeline
//!
//! Provides:
//! - Hybrid semantic + keyword search with query-pattern boosting
//! - Content-fingerprint deduplication
//! - Relevance filtering with a top-N fallback
//! - Maximal Marginal Relevance diversity selection
//! - HyDE retrieval
//! - The orchestrated `fast` / `smart` / `custom` pipelines

mod boost;
mod dedup;
mod diversity;
mod filter;
mod hybrid;
mod hyde;
mod orchestrated;
mod traits;

pub use boost::{BoostPlan, QueryBooster};
pub use dedup::{dedupe, fingerprint, FINGERPRINT_CHARS};
pub use diversity::{jaccard_similarity, select_diverse, DEFAULT_MMR_LAMBDA};
pub use filter::filter_by_relevance;
pub use hybrid::{combine_search_results, HybridRetriever, MergeWeights};
pub use hyde::HydeRetriever;
pub use orchestrated::{PipelineReport, RetrievalMode, RetrievalPipeline};
pub use traits::{KeywordSearch, VectorSearch};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Returned instead of context when nothing could be retrieved
pub const NOT_FOUND_SENTINEL: &str = "No relevant information found in the knowledge base.";

/// Separator between formatted fragments
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Which retrieval branch produced a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchSource {
    #[default]
    Semantic,
    Keyword,
    Hybrid,
    Hyde,
}

/// A retrieved unit of source content with its current relevance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFragment {
    pub id: String,
    pub content: String,
    pub source: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Replaced (not accumulated) as the fragment moves through the pipeline
    pub relevance_score: f64,
    /// Index in the reranker batch when the fragment was rescored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerank_position: Option<usize>,
    #[serde(default)]
    pub origin: SearchSource,
}

impl DocumentFragment {
    pub fn new(id: impl Into<String>, content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            source: source.into(),
            metadata: HashMap::new(),
            relevance_score: 0.5,
            rerank_position: None,
            origin: SearchSource::default(),
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.relevance_score = score;
        self
    }

    pub fn with_origin(mut self, origin: SearchSource) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Optional human title stored under `metadata.title`
    pub fn title(&self) -> Option<&str> {
        self.metadata
            .get("title")
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
    }

    /// Content length in characters
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }
}

/// Largest accepted `top_k`
pub const MAX_TOP_K: usize = 1000;

/// Retrieval parameter bundle, fixed for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub top_k: usize,
    pub min_relevance_score: f64,
    pub enable_diversity_selection: bool,
    pub compression_target_ratio: f64,
    pub use_query_expansion: bool,
    pub use_hybrid_search: bool,
    pub use_reranking: bool,
    #[serde(default)]
    pub use_hyde: bool,
}

impl Default for Strategy {
    fn default() -> Self {
        Self {
            top_k: 10,
            min_relevance_score: 0.2,
            enable_diversity_selection: true,
            compression_target_ratio: 0.95,
            use_query_expansion: true,
            use_hybrid_search: true,
            use_reranking: true,
            use_hyde: false,
        }
    }
}

impl Strategy {
    /// Latency-optimized: no reformulation, no reranking, no compression
    pub fn fast() -> Self {
        Self {
            top_k: 8,
            min_relevance_score: 0.3,
            enable_diversity_selection: true,
            compression_target_ratio: 1.0,
            use_query_expansion: false,
            use_hybrid_search: true,
            use_reranking: false,
            use_hyde: false,
        }
    }

    /// Full pipeline with moderate compression and a stricter threshold
    pub fn balanced() -> Self {
        Self {
            top_k: 8,
            min_relevance_score: 0.35,
            compression_target_ratio: 0.85,
            ..Self::default()
        }
    }

    /// Clamp fields into their valid ranges
    pub fn normalized(mut self) -> Self {
        self.top_k = self.top_k.clamp(1, MAX_TOP_K);
        self.min_relevance_score = clamp_unit(self.min_relevance_score);
        if !(self.compression_target_ratio > 0.0) {
            self.compression_target_ratio = 1.0;
        }
        self.compression_target_ratio = self.compression_target_ratio.min(1.0);
        self
    }
}

/// Clamp a score into [0, 1], mapping NaN to 0
pub fn clamp_unit(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Lowercase and collapse whitespace runs to single spaces
pub fn normalize_content(content: &str) -> String {
    content
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Borrow at most `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Sort fragments by descending relevance, keeping input order on ties
pub fn sort_by_relevance(fragments: &mut [DocumentFragment]) {
    fragments.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Render fragments as a source-annotated context block
pub fn format_context(fragments: &[DocumentFragment]) -> String {
    fragments
        .iter()
        .enumerate()
        .map(|(idx, fragment)| {
            let title = fragment
                .title()
                .map(|t| format!(" ({})", t))
                .unwrap_or_default();
            format!(
                "[Document {}] Source: {}{}\n{}",
                idx + 1,
                fragment.source,
                title,
                fragment.content
            )
        })
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}
