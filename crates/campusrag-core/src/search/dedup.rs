//! Fragment deduplication by normalized content fingerprint

use super::{normalize_content, truncate_chars, DocumentFragment};
use std::collections::HashSet;

/// Characters of normalized content that identify a fragment
pub const FINGERPRINT_CHARS: usize = 200;

/// Lowercased, whitespace-collapsed prefix of the content
///
/// Fragments that differ only after the prefix collapse together.
pub fn fingerprint(content: &str) -> String {
    let normalized = normalize_content(content);
    truncate_chars(&normalized, FINGERPRINT_CHARS).to_string()
}

/// Drop fragments whose fingerprint was already seen, keeping first-seen order
pub fn dedupe(fragments: Vec<DocumentFragment>) -> Vec<DocumentFragment> {
    let mut seen: HashSet<String> = HashSet::with_capacity(fragments.len());

    fragments
        .into_iter()
        .filter(|fragment| seen.insert(fingerprint(&fragment.content)))
        .collect()
}
