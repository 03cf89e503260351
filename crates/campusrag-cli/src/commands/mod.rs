//! CLI command handlers

pub mod compare;
pub mod config;
pub mod import;
pub mod retrieve;
pub mod route;
pub mod status;

use anyhow::Result;
use campusrag_core::{
    Config, HttpCompleter, HttpEmbedder, KnowledgeBase, LLMClient, RetrievalPipeline, VLLMClient,
};
use std::sync::Arc;

/// HTTP collaborators sharing one service client
pub struct Services {
    pub client: Arc<VLLMClient>,
    pub embedder: Arc<HttpEmbedder>,
    pub completer: Arc<HttpCompleter>,
}

impl Services {
    pub fn connect(config: &Config) -> Result<Self> {
        let client = Arc::new(VLLMClient::new(config.llm_service.clone())?);
        let shared: Arc<dyn LLMClient> = client.clone();

        Ok(Self {
            embedder: Arc::new(HttpEmbedder::new(shared.clone())),
            completer: Arc::new(HttpCompleter::new(shared)),
            client,
        })
    }

    /// Pipeline over `db` with these collaborators
    pub fn pipeline(&self, db: KnowledgeBase, config: &Config) -> Result<RetrievalPipeline> {
        let db = Arc::new(db);
        Ok(RetrievalPipeline::new(
            config,
            self.embedder.clone(),
            self.completer.clone(),
            db.clone(),
            db,
        )?)
    }

    /// Log request accounting for the run
    pub fn log_metrics(&self) {
        let metrics = self.client.metrics();
        tracing::info!(
            "LLM service: {} requests, {} errors, {} cache hits, {:.0} ms average latency",
            metrics.total_requests,
            metrics.total_errors,
            metrics.cache_hits,
            metrics.avg_latency_ms
        );
    }
}
