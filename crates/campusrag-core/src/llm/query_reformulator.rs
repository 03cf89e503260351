//! LLM query reformulation

use super::{CompletionParams, QueryExpander, TextCompleter};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;

/// Alternative phrasings requested per query
pub const ALTERNATIVE_COUNT: usize = 2;

const REFORMULATION_PARAMS: CompletionParams = CompletionParams {
    max_tokens: 150,
    temperature: 0.7,
};

lazy_static! {
    static ref ENUMERATION_MARKER: Regex = Regex::new(r"^[-•*\d.)\s]+").unwrap();
}

/// Produces the original query plus up to two rephrasings
pub struct QueryReformulator {
    completer: Arc<dyn TextCompleter>,
}

impl QueryReformulator {
    pub fn new(completer: Arc<dyn TextCompleter>) -> Self {
        Self { completer }
    }
}

#[async_trait]
impl QueryExpander for QueryReformulator {
    async fn expand(&self, query: &str) -> Vec<String> {
        let prompt = build_reformulation_prompt(query);

        match self.completer.complete(&prompt, REFORMULATION_PARAMS).await {
            Ok(response) => {
                tracing::debug!("Reformulation response: {}", response);
                let mut queries = vec![query.to_string()];
                queries.extend(parse_alternatives(&response));
                if queries.len() == 1 {
                    tracing::warn!("Reformulation produced no usable phrasings for '{}'", query);
                }
                queries
            }
            Err(e) => {
                tracing::warn!("Query reformulation failed: {}, using original query", e);
                vec![query.to_string()]
            }
        }
    }
}

fn build_reformulation_prompt(query: &str) -> String {
    format!(
        r#"Given the user query, generate {} alternative phrasings that capture the same intent but use different wording.
This helps retrieve more relevant documents.

User Query: "{}"

Generate {} alternative queries (one per line, no numbering):"#,
        ALTERNATIVE_COUNT, query, ALTERNATIVE_COUNT
    )
}

/// Strip enumeration markers, drop blanks, keep the first two lines
fn parse_alternatives(response: &str) -> Vec<String> {
    response
        .lines()
        .map(|line| ENUMERATION_MARKER.replace(line.trim(), "").trim().to_string())
        .filter(|line| !line.is_empty())
        .take(ALTERNATIVE_COUNT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedCompleter;

    #[test]
    fn test_parse_alternatives_strips_markers() {
        let response = "1. BSCS tuition cost\n\n- fee for computer science\n* third one";
        assert_eq!(
            parse_alternatives(response),
            vec!["BSCS tuition cost", "fee for computer science"]
        );
    }

    #[test]
    fn test_parse_alternatives_bullets_and_parens() {
        assert_eq!(parse_alternatives("• a\n2) b"), vec!["a", "b"]);
        assert!(parse_alternatives("  \n 1. \n").is_empty());
    }

    #[tokio::test]
    async fn test_original_query_first() {
        let completer = Arc::new(ScriptedCompleter::replying("cost of BSCS\nBSCS semester fee"));
        let reformulator = QueryReformulator::new(completer.clone());

        let queries = reformulator.expand("BSCS fee").await;
        assert_eq!(queries, vec!["BSCS fee", "cost of BSCS", "BSCS semester fee"]);
        assert_eq!(completer.last_params(), Some(REFORMULATION_PARAMS));
    }

    #[tokio::test]
    async fn test_failure_returns_query_only() {
        let reformulator = QueryReformulator::new(Arc::new(ScriptedCompleter::failing()));
        assert_eq!(reformulator.expand("hostel rules").await, vec!["hostel rules"]);
    }

    #[tokio::test]
    async fn test_empty_output_returns_query_only() {
        let reformulator = QueryReformulator::new(Arc::new(ScriptedCompleter::replying("")));
        assert_eq!(reformulator.expand("hostel rules").await, vec!["hostel rules"]);
    }
}
