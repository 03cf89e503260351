//! HTTP client for OpenAI-compatible LLM services (vLLM, OpenAI, etc.)

use super::cache::{chat_cache_key, embedding_cache_key, LLMCache};
use super::CompletionParams;
use crate::config::LLMServiceConfig;
use crate::error::{CampusRagError, Result};
use crate::search::truncate_chars;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Embedding input is cut to this many characters before it is sent
pub const EMBED_INPUT_CHARS: usize = 8000;

/// Trait for LLM service clients
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate chat completion
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        params: CompletionParams,
    ) -> Result<String>;

    /// Generate embeddings for text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions
    fn embedding_dimensions(&self) -> usize;

    /// Get chat model name
    fn model_name(&self) -> &str;

    /// Get embedding model name
    fn embedding_model_name(&self) -> &str;
}

/// Chat message for completion requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// API metrics for monitoring
#[derive(Debug, Default)]
pub struct APIMetrics {
    pub total_requests: AtomicU64,
    pub total_errors: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
    pub total_latency_ms: AtomicU64,
}

/// Snapshot of API metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: f64,
    pub avg_latency_ms: f64,
}

/// vLLM/OpenAI-compatible client
pub struct VLLMClient {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
    embedding_dimensions: usize,
    cache: Arc<LLMCache>,
    metrics: Arc<APIMetrics>,
}

impl VLLMClient {
    /// Create new client from configuration
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        // ada-002 width unless configured
        let embedding_dimensions = config.embedding_dimensions.unwrap_or(1536);

        Ok(Self {
            http_client,
            config,
            embedding_dimensions,
            cache: Arc::new(LLMCache::new()),
            metrics: Arc::new(APIMetrics::default()),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(LLMServiceConfig::default())
    }

    /// Get current API metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        let total = self.metrics.total_requests.load(Ordering::Relaxed);
        let hits = self.metrics.cache_hits.load(Ordering::Relaxed);

        MetricsSnapshot {
            total_requests: total,
            total_errors: self.metrics.total_errors.load(Ordering::Relaxed),
            cache_hits: hits,
            cache_misses: self.metrics.cache_misses.load(Ordering::Relaxed),
            cache_hit_rate: if total > 0 {
                hits as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            avg_latency_ms: if total > 0 {
                self.metrics.total_latency_ms.load(Ordering::Relaxed) as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    /// Embed texts with several batches in flight
    ///
    /// Output order matches input order.
    pub async fn embed_batch_parallel(
        &self,
        texts: &[String],
        batch_size: usize,
        max_concurrent: usize,
    ) -> Result<Vec<Vec<f32>>> {
        const DEFAULT_BATCH_SIZE: usize = 32;
        const DEFAULT_CONCURRENT: usize = 4;

        let chunk_size = if batch_size > 0 {
            batch_size
        } else {
            DEFAULT_BATCH_SIZE
        };
        let concurrent = if max_concurrent > 0 {
            max_concurrent
        } else {
            DEFAULT_CONCURRENT
        };

        let chunks: Vec<_> = texts.chunks(chunk_size).collect();
        let total_chunks = chunks.len();

        tracing::info!(
            "Embedding {} texts in {} batches ({} concurrent)",
            texts.len(),
            total_chunks,
            concurrent
        );

        let mut results: Vec<_> = stream::iter(chunks)
            .enumerate()
            .map(|(idx, chunk)| async move {
                tracing::debug!("Processing batch {}/{}", idx + 1, total_chunks);
                (idx, self.embed_batch(chunk).await)
            })
            .buffer_unordered(concurrent)
            .collect()
            .await;

        results.sort_by_key(|(idx, _)| *idx);

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for (_, result) in results {
            all_embeddings.extend(result?);
        }
        Ok(all_embeddings)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.api_key {
            Some(ref api_key) => req.header("Authorization", format!("Bearer {}", api_key)),
            None => req,
        }
    }

    fn record_error(&self) {
        self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
    }

    fn record_latency(&self, start: Instant) {
        let elapsed = start.elapsed().as_millis() as u64;
        self.metrics
            .total_latency_ms
            .fetch_add(elapsed, Ordering::Relaxed);
    }
}

#[async_trait]
impl LLMClient for VLLMClient {
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        params: CompletionParams,
    ) -> Result<String> {
        let start = Instant::now();
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        let messages_json = serde_json::to_string(&messages)?;
        let cache_key = chat_cache_key(&self.config.model, &params, &messages_json);

        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!("Cache hit for chat completion");
            self.metrics.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(cached);
        }
        self.metrics.cache_misses.fetch_add(1, Ordering::Relaxed);

        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatMessage,
        }

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let url = format!("{}/v1/chat/completions", self.config.url);
        let req = self.authorized(self.http_client.post(&url).json(&request));

        let response = req.send().await.map_err(|e| {
            self.record_error();
            CampusRagError::Http(e)
        })?;

        if !response.status().is_success() {
            self.record_error();
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CampusRagError::ExternalError(format!(
                "LLM service error (HTTP {}): {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            self.record_error();
            CampusRagError::Http(e)
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                self.record_error();
                CampusRagError::Llm("No response from LLM".to_string())
            })?
            .message
            .content;

        self.cache.set(cache_key, content.clone());
        self.record_latency(start);

        Ok(content)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| CampusRagError::Llm("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        let model = &self.config.embedding_model;
        let mut results: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut uncached_texts = Vec::new();
        let mut uncached_indices = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            let input = truncate_chars(text, EMBED_INPUT_CHARS);
            let cache_key = embedding_cache_key(model, input);
            if let Some(embedding) = self
                .cache
                .get(&cache_key)
                .and_then(|cached| serde_json::from_str::<Vec<f32>>(&cached).ok())
            {
                results.push(Some(embedding));
                self.metrics.cache_hits.fetch_add(1, Ordering::Relaxed);
                continue;
            }
            self.metrics.cache_misses.fetch_add(1, Ordering::Relaxed);
            results.push(None);
            uncached_texts.push(input.to_string());
            uncached_indices.push(i);
        }

        if !uncached_texts.is_empty() {
            tracing::debug!(
                "Embedding batch: {} cached, {} to fetch",
                texts.len() - uncached_texts.len(),
                uncached_texts.len()
            );

            #[derive(Serialize)]
            struct EmbedRequest<'a> {
                model: &'a str,
                input: &'a [String],
            }

            #[derive(Deserialize)]
            struct EmbedResponse {
                data: Vec<EmbedData>,
            }

            #[derive(Deserialize)]
            struct EmbedData {
                embedding: Vec<f32>,
            }

            let request = EmbedRequest {
                model,
                input: &uncached_texts,
            };

            let url = format!("{}/v1/embeddings", self.config.embeddings_url());
            let req = self.authorized(self.http_client.post(&url).json(&request));

            let response = req.send().await.map_err(|e| {
                self.record_error();
                CampusRagError::Http(e)
            })?;

            if !response.status().is_success() {
                self.record_error();
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(CampusRagError::ExternalError(format!(
                    "Embedding service error (HTTP {}): {}",
                    status, body
                )));
            }

            let embed_response: EmbedResponse = response.json().await.map_err(|e| {
                self.record_error();
                CampusRagError::Http(e)
            })?;

            if embed_response.data.len() != uncached_texts.len() {
                self.record_error();
                return Err(CampusRagError::Llm(format!(
                    "Expected {} embeddings, service returned {}",
                    uncached_texts.len(),
                    embed_response.data.len()
                )));
            }

            for ((data, idx), text) in embed_response
                .data
                .into_iter()
                .zip(uncached_indices)
                .zip(&uncached_texts)
            {
                if let Ok(json) = serde_json::to_string(&data.embedding) {
                    self.cache.set(embedding_cache_key(model, text), json);
                }
                results[idx] = Some(data.embedding);
            }
        } else {
            tracing::debug!("All {} embeddings from cache", texts.len());
        }

        self.record_latency(start);

        results
            .into_iter()
            .map(|r| r.ok_or_else(|| CampusRagError::Llm("Missing embedding".to_string())))
            .collect()
    }

    fn embedding_dimensions(&self) -> usize {
        self.embedding_dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn embedding_model_name(&self) -> &str {
        &self.config.embedding_model
    }
}
