//! Per-fragment LLM relevance scoring

use super::scoring::parse_rating;
use super::{CompletionParams, Reranker, TextCompleter};
use crate::config::RetrievalConfig;
use crate::error::{CampusRagError, Result};
use crate::search::{clamp_unit, sort_by_relevance, truncate_chars, DocumentFragment};
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

const SCORING_PARAMS: CompletionParams = CompletionParams {
    max_tokens: 5,
    temperature: 0.3,
};

/// Scores the leading fragments concurrently, penalizes the rest
pub struct RelevanceReranker {
    completer: Arc<dyn TextCompleter>,
    limit: usize,
    excerpt_chars: usize,
    overflow_penalty: f64,
    call_timeout: Option<Duration>,
}

impl RelevanceReranker {
    pub fn new(completer: Arc<dyn TextCompleter>, config: &RetrievalConfig) -> Self {
        Self {
            completer,
            limit: config.rerank_limit,
            excerpt_chars: config.rerank_excerpt_chars,
            overflow_penalty: config.overflow_penalty,
            call_timeout: config.rerank_timeout_ms.map(Duration::from_millis),
        }
    }

    /// Rating for one fragment; None when the call fails or is not numeric
    async fn score(&self, query: &str, fragment: &DocumentFragment, position: usize) -> Option<f64> {
        let prompt = build_scoring_prompt(query, truncate_chars(&fragment.content, self.excerpt_chars));

        let call = self.completer.complete(&prompt, SCORING_PARAMS);
        let response: Result<String> = match self.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(CampusRagError::Timeout(limit.as_millis() as u64)),
            },
            None => call.await,
        };

        match response {
            Ok(text) => {
                let rating = parse_rating(&text);
                if rating.is_none() {
                    tracing::warn!(
                        "Non-numeric score for fragment {} at position {}: {:?}",
                        fragment.id,
                        position,
                        text
                    );
                }
                rating
            }
            Err(e) => {
                tracing::warn!(
                    "Scoring failed for fragment {} at position {}: {}",
                    fragment.id,
                    position,
                    e
                );
                None
            }
        }
    }
}

#[async_trait]
impl Reranker for RelevanceReranker {
    async fn rerank(&self, query: &str, mut fragments: Vec<DocumentFragment>) -> Vec<DocumentFragment> {
        if fragments.is_empty() {
            return fragments;
        }

        let split = self.limit.min(fragments.len());
        let mut remaining = fragments.split_off(split);
        let mut head = fragments;

        let scores = join_all(
            head.iter()
                .enumerate()
                .map(|(position, fragment)| self.score(query, fragment, position)),
        )
        .await;

        let mut scored = 0;
        for (position, (fragment, score)) in head.iter_mut().zip(scores).enumerate() {
            fragment.rerank_position = Some(position);
            if let Some(score) = score {
                fragment.relevance_score = score;
                scored += 1;
            }
        }

        for fragment in &mut remaining {
            fragment.relevance_score = clamp_unit(fragment.relevance_score * self.overflow_penalty);
        }

        tracing::info!(
            "Reranked {} fragments ({} scored, {} penalized)",
            head.len() + remaining.len(),
            scored,
            remaining.len()
        );

        head.append(&mut remaining);
        sort_by_relevance(&mut head);
        head
    }
}

fn build_scoring_prompt(query: &str, excerpt: &str) -> String {
    format!(
        r#"Rate the relevance of this document to the query on a scale of 0-10.
Consider:
- Direct answer to query: high score
- Related but not directly answering: medium score
- Unrelated or tangential: low score

Query: "{}"

Document: "{}"

Respond with ONLY a number from 0-10:"#,
        query, excerpt
    )
}
