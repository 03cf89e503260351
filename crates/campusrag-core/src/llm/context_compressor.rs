//! Query-guided context compression

use super::{CompletionParams, TextCompleter};
use crate::config::RetrievalConfig;
use crate::search::{format_context, truncate_chars, DocumentFragment};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Characters per completion token assumed when sizing the output budget
const CHARS_PER_TOKEN: f64 = 2.5;

/// How the final context was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionKind {
    /// Already within target, formatted as-is
    Unchanged,
    /// Model summary accepted
    Compressed,
    /// Summary unavailable or unusable, leading fragments formatted instead
    Fallback,
}

/// Compression result
#[derive(Debug, Clone)]
pub struct CompressedContext {
    pub text: String,
    pub kind: CompressionKind,
}

/// Shrinks formatted context toward a target size
pub struct ContextCompressor {
    completer: Arc<dyn TextCompleter>,
    input_chars: usize,
    fallback_count: usize,
}

impl ContextCompressor {
    pub fn new(completer: Arc<dyn TextCompleter>, config: &RetrievalConfig) -> Self {
        Self {
            completer,
            input_chars: config.compression_input_chars,
            fallback_count: config.compression_fallback_count,
        }
    }

    /// Compress `fragments` to roughly `ratio` of their content length
    ///
    /// The result is never longer than the uncompressed formatted context.
    pub async fn compress(
        &self,
        query: &str,
        fragments: &[DocumentFragment],
        ratio: f64,
    ) -> CompressedContext {
        let total: usize = fragments.iter().map(|f| f.content_chars()).sum();
        let target = (total as f64 * ratio).floor() as usize;
        let formatted = format_context(fragments);

        if total <= target {
            tracing::debug!("No compression needed ({} chars, target {})", total, target);
            return CompressedContext {
                text: formatted,
                kind: CompressionKind::Unchanged,
            };
        }

        let prompt = build_compression_prompt(query, truncate_chars(&formatted, self.input_chars), target);
        let params = CompletionParams {
            max_tokens: ((target as f64 / CHARS_PER_TOKEN).floor() as u32).max(1),
            temperature: 0.3,
        };

        match self.completer.complete(&prompt, params).await {
            Ok(answer) => {
                let answer = answer.trim();
                let formatted_chars = formatted.chars().count();
                let answer_chars = answer.chars().count();

                if !answer.is_empty() && answer_chars <= formatted_chars {
                    tracing::info!(
                        "Compression: {} chars -> {} chars ({}%)",
                        total,
                        answer_chars,
                        if total > 0 { answer_chars * 100 / total } else { 100 }
                    );
                    return CompressedContext {
                        text: answer.to_string(),
                        kind: CompressionKind::Compressed,
                    };
                }
                tracing::warn!(
                    "Unusable compression output ({} chars for {} char input), using top {} fragments",
                    answer_chars,
                    formatted_chars,
                    self.fallback_count
                );
            }
            Err(e) => {
                tracing::warn!("Context compression failed: {}, using top {} fragments", e, self.fallback_count);
            }
        }

        let keep = self.fallback_count.min(fragments.len());
        CompressedContext {
            text: format_context(&fragments[..keep]),
            kind: CompressionKind::Fallback,
        }
    }
}

fn build_compression_prompt(query: &str, context: &str, target: usize) -> String {
    format!(
        r#"You are a context compression expert. Reduce the following context to approximately {} characters while keeping the information relevant to answering this query.

IMPORTANT: Preserve ALL table data, dates, numbers, and structured information exactly as they appear. Keep relationships between columns clear (e.g., "Series-3: Islamabad - Apr 2026"). Remove only redundant explanatory text.

Query: "{}"

Context:
{}

Provide a compressed version maintaining ALL structured data, dates, and key facts:"#,
        target, query, context
    )
}
