//! Relevance threshold filter

use super::DocumentFragment;

/// Keep fragments scoring at least `min_score`
///
/// When nothing passes but `ranked` is non-empty, the first `fallback_count`
/// ranked fragments are returned instead so the pipeline never ends up with
/// zero context while candidates existed. Returns the kept fragments and
/// whether the fallback was used.
pub fn filter_by_relevance(
    ranked: Vec<DocumentFragment>,
    min_score: f64,
    fallback_count: usize,
) -> (Vec<DocumentFragment>, bool) {
    let passing: Vec<DocumentFragment> = ranked
        .iter()
        .filter(|f| f.relevance_score >= min_score)
        .cloned()
        .collect();

    if passing.is_empty() && !ranked.is_empty() {
        tracing::warn!(
            "No fragments reached relevance {:.2}, keeping top {} of {}",
            min_score,
            fallback_count.min(ranked.len()),
            ranked.len()
        );
        return (ranked.into_iter().take(fallback_count).collect(), true);
    }

    (passing, false)
}
