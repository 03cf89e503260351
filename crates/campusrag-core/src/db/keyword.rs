//! FTS5 keyword search

use super::content::{fragment_from_row, FRAGMENT_COLUMNS};
use super::KnowledgeBase;
use crate::error::Result;
use crate::search::DocumentFragment;
use rusqlite::params;

/// Common words to filter from full-text queries
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from",
    "has", "have", "he", "in", "is", "it", "its", "of", "on", "that",
    "the", "to", "was", "will", "with", "does", "do", "did", "can",
    "could", "should", "would", "what", "where", "when", "why", "how",
    "who", "which", "this", "these", "those", "there", "here", "me",
    "my", "i", "tell", "about",
];

/// Turn free text into a safe FTS5 query
///
/// Words are split on anything that is not alphanumeric, stop words are
/// dropped and every remaining term is quoted, so FTS5 operators and
/// punctuation in user text never reach the parser. Terms are ANDed.
/// Returns an empty string when nothing searchable is left.
pub fn sanitize_fts5_query(query: &str) -> String {
    let terms: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .filter(|word| !STOP_WORDS.contains(&word.to_lowercase().as_str()))
        .map(|word| format!("\"{}\"", word))
        .collect();

    terms.join(" ")
}

/// Map a BM25 rank (negative, lower is better) into (0, 1)
pub fn bm25_to_score(rank: f64) -> f64 {
    let strength = rank.abs();
    strength / (1.0 + strength)
}

impl KnowledgeBase {
    /// Full-text search, best match first
    pub fn search_fts(&self, query: &str, limit: usize) -> Result<Vec<DocumentFragment>> {
        let sanitized = sanitize_fts5_query(query);
        if sanitized.is_empty() || limit == 0 {
            tracing::debug!("Keyword query '{}' has no searchable terms", query);
            return Ok(Vec::new());
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {}, bm25(fragments_fts, 2.0, 1.0) AS rank
             FROM fragments_fts fts
             JOIN fragments f ON f.id = fts.rowid
             WHERE fragments_fts MATCH ?1
             ORDER BY rank
             LIMIT ?2",
            FRAGMENT_COLUMNS
        ))?;

        let results = stmt
            .query_map(params![sanitized, i64::try_from(limit).unwrap_or(i64::MAX)], |row| {
                let fragment = fragment_from_row(row)?;
                let rank: f64 = row.get(4)?;
                Ok(fragment.with_score(bm25_to_score(rank)))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(results)
    }
}
