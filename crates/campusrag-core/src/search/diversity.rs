//! Maximal Marginal Relevance selection

use super::DocumentFragment;
use std::collections::HashSet;

/// Equal weight to relevance and novelty
pub const DEFAULT_MMR_LAMBDA: f64 = 0.5;

fn token_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(|t| t.to_lowercase()).collect()
}

/// Jaccard similarity of lowercased whitespace-token sets
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    jaccard(&token_set(a), &token_set(b))
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Greedy MMR: pick up to `k` fragments balancing relevance against redundancy
///
/// Inputs of length `<= k` are returned unchanged. Otherwise the most relevant
/// fragment seeds the selection and each round adds the candidate maximizing
/// `lambda * relevance + (1 - lambda) * (1 - max_similarity_to_selected)`.
pub fn select_diverse(fragments: Vec<DocumentFragment>, k: usize, lambda: f64) -> Vec<DocumentFragment> {
    if fragments.len() <= k {
        return fragments;
    }
    if k == 0 {
        return Vec::new();
    }

    let tokens: Vec<HashSet<String>> = fragments.iter().map(|f| token_set(&f.content)).collect();
    let mut remaining: Vec<usize> = (0..fragments.len()).collect();
    let mut selected: Vec<usize> = Vec::with_capacity(k);

    let seed_pos = remaining
        .iter()
        .enumerate()
        .fold(0, |best, (pos, &idx)| {
            if fragments[idx].relevance_score > fragments[remaining[best]].relevance_score {
                pos
            } else {
                best
            }
        });
    selected.push(remaining.remove(seed_pos));

    while selected.len() < k && !remaining.is_empty() {
        let mut best_pos = 0;
        let mut best_score = f64::NEG_INFINITY;

        for (pos, &candidate) in remaining.iter().enumerate() {
            let max_similarity = selected
                .iter()
                .map(|&chosen| jaccard(&tokens[candidate], &tokens[chosen]))
                .fold(0.0_f64, f64::max);
            let score = lambda * fragments[candidate].relevance_score
                + (1.0 - lambda) * (1.0 - max_similarity);

            if score > best_score {
                best_score = score;
                best_pos = pos;
            }
        }

        selected.push(remaining.remove(best_pos));
    }

    let mut slots: Vec<Option<DocumentFragment>> = fragments.into_iter().map(Some).collect();
    selected
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect()
}
