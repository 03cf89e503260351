//! HyDE: Hypothetical Document Embeddings
//!
//! Embeds a generated answer instead of the question, which lands closer to
//! answer-shaped fragments in embedding space.

use super::{DocumentFragment, HybridRetriever, SearchSource};
use crate::error::Result;
use crate::llm::{CompletionParams, TextCompleter};
use std::sync::Arc;

const HYDE_PARAMS: CompletionParams = CompletionParams {
    max_tokens: 300,
    temperature: 0.7,
};

/// Retrieves by embedding a hypothetical answer
pub struct HydeRetriever {
    completer: Arc<dyn TextCompleter>,
    retriever: Arc<HybridRetriever>,
    similarity_floor: f64,
}

impl HydeRetriever {
    pub fn new(
        completer: Arc<dyn TextCompleter>,
        retriever: Arc<HybridRetriever>,
        similarity_floor: f64,
    ) -> Self {
        Self {
            completer,
            retriever,
            similarity_floor,
        }
    }

    /// Vector search with a hypothetical answer, or with the query if generation fails
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<DocumentFragment>> {
        match self.hypothetical_answer(query).await {
            Some(answer) => {
                match self
                    .retriever
                    .semantic_with_floor(&answer, self.similarity_floor, top_k)
                    .await
                {
                    Ok(fragments) => {
                        return Ok(fragments
                            .into_iter()
                            .map(|f| f.with_origin(SearchSource::Hyde))
                            .collect())
                    }
                    Err(e) => tracing::warn!("HyDE vector search failed: {}", e),
                }
            }
            None => tracing::warn!("HyDE generation unavailable, searching with the query"),
        }

        self.retriever.semantic_search(query, top_k).await
    }

    async fn hypothetical_answer(&self, query: &str) -> Option<String> {
        let prompt = build_hyde_prompt(query);
        match self.completer.complete(&prompt, HYDE_PARAMS).await {
            Ok(answer) => {
                let answer = answer.trim().to_string();
                (!answer.is_empty()).then_some(answer)
            }
            Err(e) => {
                tracing::warn!("HyDE generation failed: {}", e);
                None
            }
        }
    }
}

fn build_hyde_prompt(query: &str) -> String {
    format!(
        r#"Given this question, write a detailed, factual answer as if you had perfect knowledge.

Question: "{}"

Detailed Answer:"#,
        query
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_question() {
        let prompt = build_hyde_prompt("When is NET Series-3?");
        assert!(prompt.contains("\"When is NET Series-3?\""));
        assert!(prompt.ends_with("Detailed Answer:"));
    }
}
