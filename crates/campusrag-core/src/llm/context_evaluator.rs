//! Retrieval quality evaluation
//!
//! Rates a retrieved context against its query with the completion model and
//! keeps a bounded history of results for aggregate statistics.

use super::scoring::parse_rating;
use super::{CompletionParams, TextCompleter};
use crate::search::truncate_chars;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

const RATING_PARAMS: CompletionParams = CompletionParams {
    max_tokens: 5,
    temperature: 0.2,
};

/// Context characters shown to rating prompts
const RATED_CONTEXT_CHARS: usize = 2000;

/// Evaluations retained for statistics
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// Neutral rating used when the model cannot provide one
const NEUTRAL_RATING: f64 = 0.5;

const RELEVANCE_WEIGHT: f64 = 0.4;
const COMPLETENESS_WEIGHT: f64 = 0.3;
const CONCISENESS_WEIGHT: f64 = 0.2;
const FAITHFULNESS_WEIGHT: f64 = 0.1;

/// Quality ratings for one context, all in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMetrics {
    pub relevance: f64,
    pub completeness: f64,
    pub conciseness: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faithfulness: Option<f64>,
    pub overall: f64,
}

/// One recorded evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub metrics: RetrievalMetrics,
    pub context_length: usize,
}

/// Aggregate of one metric across the history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl MetricStats {
    fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self {
            average: values.iter().sum::<f64>() / values.len() as f64,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            count: values.len(),
        })
    }
}

/// Aggregate statistics over all recorded evaluations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationStatistics {
    pub relevance: Option<MetricStats>,
    pub completeness: Option<MetricStats>,
    pub conciseness: Option<MetricStats>,
    pub faithfulness: Option<MetricStats>,
    pub overall: Option<MetricStats>,
    pub total_evaluations: usize,
    pub average_context_length: f64,
}

/// LLM-backed context evaluator with history
pub struct ContextEvaluator {
    completer: Arc<dyn TextCompleter>,
    history: Mutex<VecDeque<EvaluationRecord>>,
    history_limit: usize,
}

impl ContextEvaluator {
    pub fn new(completer: Arc<dyn TextCompleter>) -> Self {
        Self {
            completer,
            history: Mutex::new(VecDeque::new()),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Keep only the `limit` most recent evaluations (at least one)
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    /// Rate `context` for `query`, recording the result
    ///
    /// Faithfulness is only rated when a reference answer is given.
    pub async fn evaluate(
        &self,
        query: &str,
        context: &str,
        ground_truth: Option<&str>,
    ) -> RetrievalMetrics {
        let excerpt = truncate_chars(context, RATED_CONTEXT_CHARS);

        let relevance = self.rate("relevance", &build_relevance_prompt(query, excerpt)).await;
        let completeness = self
            .rate("completeness", &build_completeness_prompt(query, excerpt))
            .await;
        let conciseness = score_conciseness(context);
        let faithfulness = match ground_truth {
            Some(answer) => Some(
                self.rate("faithfulness", &build_faithfulness_prompt(excerpt, answer))
                    .await,
            ),
            None => None,
        };

        let overall = overall_score(relevance, completeness, conciseness, faithfulness);
        let metrics = RetrievalMetrics {
            relevance,
            completeness,
            conciseness,
            faithfulness,
            overall,
        };

        tracing::info!(
            "Evaluated '{}': relevance {:.2}, completeness {:.2}, conciseness {:.2}, overall {:.2}",
            query,
            relevance,
            completeness,
            conciseness,
            overall
        );

        if let Ok(mut history) = self.history.lock() {
            history.push_back(EvaluationRecord {
                timestamp: Utc::now(),
                query: query.to_string(),
                metrics: metrics.clone(),
                context_length: context.chars().count(),
            });
            while history.len() > self.history_limit {
                history.pop_front();
            }
        }

        metrics
    }

    async fn rate(&self, metric: &str, prompt: &str) -> f64 {
        match self.completer.complete(prompt, RATING_PARAMS).await {
            Ok(text) => parse_rating(&text).unwrap_or_else(|| {
                tracing::warn!("Non-numeric {} rating {:?}", metric, text);
                NEUTRAL_RATING
            }),
            Err(e) => {
                tracing::warn!("{} rating failed: {}", metric, e);
                NEUTRAL_RATING
            }
        }
    }

    /// Aggregates over the recorded history
    pub fn statistics(&self) -> EvaluationStatistics {
        let history = match self.history.lock() {
            Ok(history) => history,
            Err(_) => return EvaluationStatistics::default(),
        };
        if history.is_empty() {
            return EvaluationStatistics::default();
        }

        let collect = |f: fn(&RetrievalMetrics) -> Option<f64>| -> Option<MetricStats> {
            let values: Vec<f64> = history.iter().filter_map(|r| f(&r.metrics)).collect();
            MetricStats::from_values(&values)
        };

        EvaluationStatistics {
            relevance: collect(|m| Some(m.relevance)),
            completeness: collect(|m| Some(m.completeness)),
            conciseness: collect(|m| Some(m.conciseness)),
            faithfulness: collect(|m| m.faithfulness),
            overall: collect(|m| Some(m.overall)),
            total_evaluations: history.len(),
            average_context_length: history.iter().map(|r| r.context_length as f64).sum::<f64>()
                / history.len() as f64,
        }
    }

    /// Most recent evaluations, newest first
    pub fn recent(&self, limit: usize) -> Vec<EvaluationRecord> {
        self.history
            .lock()
            .map(|history| history.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Clear the history
    pub fn reset(&self) {
        if let Ok(mut history) = self.history.lock() {
            history.clear();
        }
    }
}

/// Length and redundancy penalties, floored at zero
pub fn score_conciseness(context: &str) -> f64 {
    let length = context.chars().count();
    let words: Vec<&str> = context.split_whitespace().collect();
    let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let unique_ratio = if words.is_empty() {
        1.0
    } else {
        unique.len() as f64 / words.len() as f64
    };

    let mut score: f64 = 1.0;
    if length > 5000 {
        score -= 0.2;
    }
    if length > 8000 {
        score -= 0.2;
    }
    if unique_ratio < 0.4 {
        score -= 0.3;
    }
    score.max(0.0)
}

/// Weighted mean over the metrics present
pub fn overall_score(
    relevance: f64,
    completeness: f64,
    conciseness: f64,
    faithfulness: Option<f64>,
) -> f64 {
    let mut score = relevance * RELEVANCE_WEIGHT
        + completeness * COMPLETENESS_WEIGHT
        + conciseness * CONCISENESS_WEIGHT;
    let mut total_weight = RELEVANCE_WEIGHT + COMPLETENESS_WEIGHT + CONCISENESS_WEIGHT;

    if let Some(faithfulness) = faithfulness {
        score += faithfulness * FAITHFULNESS_WEIGHT;
        total_weight += FAITHFULNESS_WEIGHT;
    }
    score / total_weight
}

fn build_relevance_prompt(query: &str, context: &str) -> String {
    format!(
        r#"Rate how relevant this retrieved context is for answering the query.

Query: "{}"

Context: "{}"

Rate from 0-10 where:
- 10: Perfectly relevant, directly answers the query
- 7-9: Highly relevant, contains most needed information
- 4-6: Somewhat relevant, contains some useful information
- 1-3: Barely relevant, mostly unrelated
- 0: Completely irrelevant

Respond with ONLY a number:"#,
        query, context
    )
}

fn build_completeness_prompt(query: &str, context: &str) -> String {
    format!(
        r#"Rate how complete this context is for fully answering the query.

Query: "{}"

Context: "{}"

Rate from 0-10 where:
- 10: Contains all information needed for complete answer
- 7-9: Contains most information, minor gaps
- 4-6: Partial information, significant gaps
- 1-3: Very incomplete, major information missing
- 0: Missing all necessary information

Respond with ONLY a number:"#,
        query, context
    )
}

fn build_faithfulness_prompt(context: &str, answer: &str) -> String {
    format!(
        r#"Does this answer only use information from the context, without hallucination?

Context: "{}"

Answer: "{}"

Rate from 0-10 where:
- 10: Perfectly faithful, every claim is in context
- 7-9: Mostly faithful, minor extrapolations
- 4-6: Some claims not in context
- 1-3: Many claims not in context
- 0: Completely hallucinated

Respond with ONLY a number:"#,
        context, answer
    )
}
