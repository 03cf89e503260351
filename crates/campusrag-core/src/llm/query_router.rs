//! Intent classification and strategy routing

use super::{CompletionParams, TextCompleter};
use crate::search::Strategy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

const ROUTING_PARAMS: CompletionParams = CompletionParams {
    max_tokens: 10,
    temperature: 0.2,
};

/// Query intent category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryIntent {
    /// Specific facts, numbers, dates, requirements
    Factual,
    /// Comparing options, programs, or alternatives
    Comparison,
    /// Steps and processes
    Procedural,
    /// Explanations of concepts
    Conceptual,
}

impl QueryIntent {
    pub const ALL: [QueryIntent; 4] = [
        QueryIntent::Factual,
        QueryIntent::Comparison,
        QueryIntent::Procedural,
        QueryIntent::Conceptual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryIntent::Factual => "FACTUAL",
            QueryIntent::Comparison => "COMPARISON",
            QueryIntent::Procedural => "PROCEDURAL",
            QueryIntent::Conceptual => "CONCEPTUAL",
        }
    }

    /// Retrieval preset for this intent
    ///
    /// Routed strategies always run the full pipeline; only sizing,
    /// threshold, diversity and compression differ.
    pub fn strategy(&self) -> Strategy {
        let (top_k, min_relevance_score, enable_diversity_selection, compression_target_ratio) = match self {
            QueryIntent::Factual => (10, 0.15, false, 1.0),
            QueryIntent::Comparison => (12, 0.20, true, 0.95),
            QueryIntent::Procedural => (8, 0.25, true, 0.95),
            QueryIntent::Conceptual => (10, 0.20, true, 0.95),
        };

        Strategy {
            top_k,
            min_relevance_score,
            enable_diversity_selection,
            compression_target_ratio,
            use_query_expansion: true,
            use_hybrid_search: true,
            use_reranking: true,
            use_hyde: false,
        }
    }
}

impl fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryIntent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FACTUAL" => Ok(QueryIntent::Factual),
            "COMPARISON" => Ok(QueryIntent::Comparison),
            "PROCEDURAL" => Ok(QueryIntent::Procedural),
            "CONCEPTUAL" => Ok(QueryIntent::Conceptual),
            other => Err(format!("unknown intent: {}", other)),
        }
    }
}

/// Routing outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub intent: QueryIntent,
    pub strategy: Strategy,
    /// Classification failed or was unrecognized and FACTUAL was assumed
    pub defaulted: bool,
}

/// Classifies queries and picks a retrieval strategy
pub struct QueryRouter {
    completer: Arc<dyn TextCompleter>,
}

impl QueryRouter {
    pub fn new(completer: Arc<dyn TextCompleter>) -> Self {
        Self { completer }
    }

    /// Classify `query`; failures and unknown labels route as FACTUAL
    pub async fn route(&self, query: &str) -> RouteDecision {
        let prompt = build_routing_prompt(query);

        let parsed = match self.completer.complete(&prompt, ROUTING_PARAMS).await {
            Ok(response) => {
                tracing::debug!("Routing response: {}", response);
                let intent = parse_intent(&response);
                if intent.is_none() {
                    tracing::warn!("Unrecognized intent label {:?}, routing as FACTUAL", response);
                }
                intent
            }
            Err(e) => {
                tracing::warn!("Query routing failed: {}, routing as FACTUAL", e);
                None
            }
        };

        let defaulted = parsed.is_none();
        let intent = parsed.unwrap_or(QueryIntent::Factual);
        tracing::info!("Routed '{}' as {}", query, intent);

        RouteDecision {
            intent,
            strategy: intent.strategy(),
            defaulted,
        }
    }
}

fn build_routing_prompt(query: &str) -> String {
    format!(
        r#"Classify this query into ONE category:
1. FACTUAL - Asking for specific facts, numbers, dates, requirements
2. COMPARISON - Comparing options, programs, or alternatives
3. PROCEDURAL - How to do something, steps, processes
4. CONCEPTUAL - Understanding concepts, explanations

Query: "{}"

Category (one word):"#,
        query
    )
}

/// Accepts the bare label with optional numbering or trailing punctuation
fn parse_intent(response: &str) -> Option<QueryIntent> {
    let word = response
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_ascii_alphabetic()))
        .find(|w| !w.is_empty())?;
    word.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedCompleter;

    #[test]
    fn test_preset_table() {
        let factual = QueryIntent::Factual.strategy();
        assert_eq!(factual.top_k, 10);
        assert_eq!(factual.min_relevance_score, 0.15);
        assert!(!factual.enable_diversity_selection);
        assert_eq!(factual.compression_target_ratio, 1.0);

        let comparison = QueryIntent::Comparison.strategy();
        assert_eq!((comparison.top_k, comparison.min_relevance_score), (12, 0.20));

        let procedural = QueryIntent::Procedural.strategy();
        assert_eq!((procedural.top_k, procedural.min_relevance_score), (8, 0.25));

        for intent in QueryIntent::ALL {
            let s = intent.strategy();
            assert!(s.use_query_expansion && s.use_hybrid_search && s.use_reranking);
        }
    }

    #[test]
    fn test_parse_intent() {
        assert_eq!(parse_intent("COMPARISON"), Some(QueryIntent::Comparison));
        assert_eq!(parse_intent("procedural."), Some(QueryIntent::Procedural));
        assert_eq!(parse_intent("3. PROCEDURAL"), Some(QueryIntent::Procedural));
        assert_eq!(parse_intent("**Conceptual**"), Some(QueryIntent::Conceptual));
        assert_eq!(parse_intent("OPINION"), None);
        assert_eq!(parse_intent(""), None);
    }

    #[tokio::test]
    async fn test_route_uses_label() {
        let completer = Arc::new(ScriptedCompleter::replying("COMPARISON"));
        let router = QueryRouter::new(completer.clone());
        let decision = router.route("BSCS vs BSSE").await;
        assert_eq!(decision.intent, QueryIntent::Comparison);
        assert_eq!(decision.strategy.top_k, 12);
        assert!(!decision.defaulted);
        assert_eq!(completer.last_params(), Some(ROUTING_PARAMS));
    }

    #[tokio::test]
    async fn test_failure_routes_factual() {
        let router = QueryRouter::new(Arc::new(ScriptedCompleter::failing()));
        let decision = router.route("anything").await;
        assert_eq!(decision.intent, QueryIntent::Factual);
        assert!(decision.defaulted);
    }

    #[tokio::test]
    async fn test_unknown_label_routes_factual() {
        let router = QueryRouter::new(Arc::new(ScriptedCompleter::replying("GREETING")));
        let decision = router.route("hello").await;
        assert_eq!(decision.strategy, QueryIntent::Factual.strategy());
    }
}
