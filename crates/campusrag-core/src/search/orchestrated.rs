//! Retrieval pipeline orchestration
//!
//! Drives one query through reformulation, retrieval, deduplication,
//! reranking, relevance filtering, diversity selection and compression.
//! Every stage degrades instead of failing; only a retrieval stage with no
//! source left to answer returns an error.

use super::{
    dedupe, filter_by_relevance, select_diverse, DocumentFragment, HybridRetriever, HydeRetriever,
    KeywordSearch, QueryBooster, Strategy, VectorSearch, NOT_FOUND_SENTINEL,
};
use crate::config::Config;
use crate::error::{CampusRagError, Result};
use crate::llm::{
    CompressionKind, ContextCompressor, Embedder, QueryExpander, QueryIntent, QueryReformulator,
    QueryRouter, RelevanceReranker, Reranker, RouteDecision, TextCompleter,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// How the strategy for one run is chosen
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalMode {
    /// Latency preset: no reformulation, no reranking, no compression
    Fast,
    /// Classify the query and use the preset for its intent
    Smart,
    /// Caller-supplied strategy
    Custom(Strategy),
}

impl RetrievalMode {
    pub fn name(&self) -> &'static str {
        match self {
            RetrievalMode::Fast => "fast",
            RetrievalMode::Smart => "smart",
            RetrievalMode::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-stage accounting for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<QueryIntent>,
    pub strategy: Strategy,
    pub queries: Vec<String>,
    /// Fragments returned by all retrieval calls, before deduplication
    pub retrieved: usize,
    pub deduplicated: usize,
    pub ranked: usize,
    pub filtered: usize,
    pub used_filter_fallback: bool,
    pub selected: usize,
    /// None when nothing survived and the not-found sentinel was returned
    pub compressed: Option<CompressionKind>,
    pub context_chars: usize,
    pub elapsed_ms: u64,
}

/// The multi-stage retrieval pipeline
pub struct RetrievalPipeline {
    expander: Arc<dyn QueryExpander>,
    retriever: Arc<HybridRetriever>,
    hyde: HydeRetriever,
    reranker: Arc<dyn Reranker>,
    router: QueryRouter,
    compressor: ContextCompressor,
    filter_fallback_count: usize,
    mmr_lambda: f64,
}

impl RetrievalPipeline {
    /// Wire the pipeline from configuration and the four collaborators
    pub fn new(
        config: &Config,
        embedder: Arc<dyn Embedder>,
        completer: Arc<dyn TextCompleter>,
        vectors: Arc<dyn VectorSearch>,
        keywords: Arc<dyn KeywordSearch>,
    ) -> Result<Self> {
        let retrieval = &config.retrieval;
        retrieval.validate()?;

        let booster = Arc::new(QueryBooster::new(&config.boost, retrieval.max_probes)?);
        let retriever = Arc::new(HybridRetriever::new(
            embedder, vectors, keywords, booster, retrieval,
        ));

        Ok(Self {
            expander: Arc::new(QueryReformulator::new(completer.clone())),
            hyde: HydeRetriever::new(
                completer.clone(),
                retriever.clone(),
                retrieval.hyde_similarity_floor,
            ),
            retriever,
            reranker: Arc::new(RelevanceReranker::new(completer.clone(), retrieval)),
            router: QueryRouter::new(completer.clone()),
            compressor: ContextCompressor::new(completer, retrieval),
            filter_fallback_count: retrieval.filter_fallback_count,
            mmr_lambda: retrieval.mmr_lambda,
        })
    }

    /// Replace the query reformulation stage
    pub fn with_expander(mut self, expander: Arc<dyn QueryExpander>) -> Self {
        self.expander = expander;
        self
    }

    /// Replace the reranking stage
    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = reranker;
        self
    }

    pub fn retriever(&self) -> &HybridRetriever {
        &self.retriever
    }

    /// Classify a query without retrieving
    pub async fn route(&self, query: &str) -> RouteDecision {
        self.router.route(query).await
    }

    /// Latency-optimized retrieval
    pub async fn fast_retrieve(&self, query: &str) -> Result<String> {
        self.retrieve_context(query, RetrievalMode::Fast).await
    }

    /// Routed retrieval with the preset for the query's intent
    pub async fn smart_retrieve(&self, query: &str) -> Result<String> {
        self.retrieve_context(query, RetrievalMode::Smart).await
    }

    /// Retrieval with a caller strategy
    pub async fn retrieve(&self, query: &str, strategy: Strategy) -> Result<String> {
        self.retrieve_context(query, RetrievalMode::Custom(strategy)).await
    }

    /// Context string for `query`; the not-found sentinel when nothing survives
    pub async fn retrieve_context(&self, query: &str, mode: RetrievalMode) -> Result<String> {
        Ok(self.retrieve_with_report(query, mode).await?.0)
    }

    /// Context string together with per-stage accounting
    pub async fn retrieve_with_report(
        &self,
        query: &str,
        mode: RetrievalMode,
    ) -> Result<(String, PipelineReport)> {
        let start = Instant::now();

        let (strategy, intent) = match &mode {
            RetrievalMode::Fast => (Strategy::fast(), None),
            RetrievalMode::Smart => {
                let decision = self.router.route(query).await;
                (decision.strategy, Some(decision.intent))
            }
            RetrievalMode::Custom(strategy) => (strategy.clone().normalized(), None),
        };

        tracing::info!("Retrieval started ({} mode) for '{}'", mode, query);
        let (context, mut report) = self.run(query, &strategy).await?;

        report.mode = mode.name().to_string();
        report.intent = intent;
        report.elapsed_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Retrieval finished in {} ms: {} retrieved, {} unique, {} kept, {} selected, {} chars",
            report.elapsed_ms,
            report.retrieved,
            report.deduplicated,
            report.filtered,
            report.selected,
            report.context_chars
        );

        Ok((context, report))
    }

    async fn run(&self, query: &str, strategy: &Strategy) -> Result<(String, PipelineReport)> {
        let queries = if strategy.use_query_expansion {
            let expanded = self.expander.expand(query).await;
            tracing::info!("Reformulated into {} queries", expanded.len());
            expanded
        } else {
            vec![query.to_string()]
        };

        let mut fragments = self.retrieve_all(&queries, strategy).await?;

        if strategy.use_hyde {
            match self.hyde.search(query, strategy.top_k).await {
                Ok(found) => {
                    tracing::info!("HyDE contributed {} fragments", found.len());
                    fragments.extend(found);
                }
                Err(e) => tracing::warn!("HyDE retrieval failed: {}", e),
            }
        }
        let retrieved = fragments.len();

        let unique = dedupe(fragments);
        let deduplicated = unique.len();
        tracing::info!("After deduplication: {} of {} fragments", deduplicated, retrieved);

        let ranked = if strategy.use_reranking {
            self.reranker.rerank(query, unique).await
        } else {
            unique
        };
        let ranked_count = ranked.len();

        let (kept, used_filter_fallback) =
            filter_by_relevance(ranked, strategy.min_relevance_score, self.filter_fallback_count);
        let filtered = kept.len();
        tracing::info!(
            "After relevance filter (>= {:.2}): {} fragments",
            strategy.min_relevance_score,
            filtered
        );

        let selected = if strategy.enable_diversity_selection {
            let diverse = select_diverse(kept, strategy.top_k, self.mmr_lambda);
            tracing::info!("After diversity selection: {} fragments", diverse.len());
            diverse
        } else {
            kept
        };

        let mut report = PipelineReport {
            mode: String::new(),
            intent: None,
            strategy: strategy.clone(),
            queries,
            retrieved,
            deduplicated,
            ranked: ranked_count,
            filtered,
            used_filter_fallback,
            selected: selected.len(),
            compressed: None,
            context_chars: 0,
            elapsed_ms: 0,
        };

        if selected.is_empty() {
            tracing::warn!("No fragments survived for '{}'", query);
            report.context_chars = NOT_FOUND_SENTINEL.chars().count();
            return Ok((NOT_FOUND_SENTINEL.to_string(), report));
        }

        let compressed = self
            .compressor
            .compress(query, &selected, strategy.compression_target_ratio)
            .await;
        report.compressed = Some(compressed.kind);
        report.context_chars = compressed.text.chars().count();

        Ok((compressed.text, report))
    }

    /// One retrieval call per query, in order
    ///
    /// A query whose retrieval fails is skipped; the run fails only when
    /// every query failed.
    async fn retrieve_all(
        &self,
        queries: &[String],
        strategy: &Strategy,
    ) -> Result<Vec<DocumentFragment>> {
        let mut fragments = Vec::new();
        let mut first_error: Option<CampusRagError> = None;
        let mut answered = 0;

        for q in queries {
            match self.retrieve_one(q, strategy).await {
                Ok(found) => {
                    tracing::debug!("Query '{}' retrieved {} fragments", q, found.len());
                    fragments.extend(found);
                    answered += 1;
                }
                Err(e) => {
                    tracing::warn!("Retrieval failed for '{}': {}", q, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if answered == 0 => Err(e),
            _ => Ok(fragments),
        }
    }

    async fn retrieve_one(&self, query: &str, strategy: &Strategy) -> Result<Vec<DocumentFragment>> {
        if strategy.use_hybrid_search {
            return self.retriever.search(query, strategy.top_k).await;
        }

        match self.retriever.semantic_search(query, strategy.top_k).await {
            Ok(found) => Ok(found),
            Err(semantic_err) => {
                tracing::warn!("Semantic search failed: {}, trying keyword search", semantic_err);
                self.retriever
                    .keyword_search(query, strategy.top_k)
                    .await
                    .map_err(|keyword_err| {
                        CampusRagError::Retrieval(format!(
                            "semantic search: {}; keyword search: {}",
                            semantic_err, keyword_err
                        ))
                    })
            }
        }
    }
}
