//! Hybrid search with weighted rank fusion

use super::{
    clamp_unit, normalize_content, sort_by_relevance, BoostPlan, DocumentFragment, KeywordSearch,
    QueryBooster, SearchSource, VectorSearch,
};
use crate::config::RetrievalConfig;
use crate::error::{CampusRagError, Result};
use crate::llm::Embedder;
use futures::future::try_join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Per-source weights for rank fusion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeWeights {
    pub semantic: f64,
    pub keyword: f64,
}

impl MergeWeights {
    /// Semantic-dominant weighting for ordinary queries
    pub const SEMANTIC_DOMINANT: MergeWeights = MergeWeights {
        semantic: 0.6,
        keyword: 0.4,
    };

    /// Keyword-dominant weighting for boosted queries
    pub const KEYWORD_DOMINANT: MergeWeights = MergeWeights {
        semantic: 0.3,
        keyword: 0.7,
    };

    pub fn for_plan(plan: &BoostPlan) -> Self {
        if plan.is_boosted() {
            Self::KEYWORD_DOMINANT
        } else {
            Self::SEMANTIC_DOMINANT
        }
    }
}

/// Fuse two ranked lists
///
/// Each list contributes `weight * (1 - index / len)` per fragment. Fragments
/// are keyed by normalized content; one present in both lists gets the sum.
/// Repeats inside a single list only count at their best rank.
pub fn combine_search_results(
    semantic: Vec<DocumentFragment>,
    keyword: Vec<DocumentFragment>,
    weights: MergeWeights,
) -> Vec<DocumentFragment> {
    let mut merged: Vec<DocumentFragment> = Vec::with_capacity(semantic.len() + keyword.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    let mut accumulate = |list: Vec<DocumentFragment>, weight: f64| {
        let count = list.len();
        let mut seen_in_list: HashSet<String> = HashSet::with_capacity(count);

        for (rank, mut fragment) in list.into_iter().enumerate() {
            let key = normalize_content(&fragment.content);
            if !seen_in_list.insert(key.clone()) {
                continue;
            }

            let score = (1.0 - rank as f64 / count as f64) * weight;
            match positions.get(&key) {
                Some(&pos) => {
                    let existing = &mut merged[pos];
                    existing.relevance_score = clamp_unit(existing.relevance_score + score);
                    existing.origin = SearchSource::Hybrid;
                }
                None => {
                    fragment.relevance_score = clamp_unit(score);
                    positions.insert(key, merged.len());
                    merged.push(fragment);
                }
            }
        }
    };

    accumulate(semantic, weights.semantic);
    accumulate(keyword, weights.keyword);

    sort_by_relevance(&mut merged);
    merged
}

/// Detailed outcome of one hybrid search
#[derive(Debug, Clone)]
pub struct HybridResults {
    pub fragments: Vec<DocumentFragment>,
    pub plan: BoostPlan,
    pub weights: MergeWeights,
    /// Keyword probes actually issued
    pub probes_issued: usize,
    /// The hybrid path failed and a single-source fallback answered
    pub degraded: bool,
}

/// Semantic + keyword retriever
pub struct HybridRetriever {
    embedder: Arc<dyn Embedder>,
    vectors: Arc<dyn VectorSearch>,
    keywords: Arc<dyn KeywordSearch>,
    booster: Arc<QueryBooster>,
    similarity_floor: f64,
    keyword_boost_factor: usize,
    probe_result_limit: usize,
}

impl HybridRetriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        vectors: Arc<dyn VectorSearch>,
        keywords: Arc<dyn KeywordSearch>,
        booster: Arc<QueryBooster>,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            vectors,
            keywords,
            booster,
            similarity_floor: config.similarity_floor,
            keyword_boost_factor: config.keyword_boost_factor.max(1),
            probe_result_limit: config.probe_result_limit,
        }
    }

    /// Hybrid search returning merged fragments only
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<DocumentFragment>> {
        Ok(self.search_detailed(query, top_k).await?.fragments)
    }

    /// Hybrid search, falling back to semantic-only and then keyword-only
    ///
    /// Errors only when neither source can answer.
    pub async fn search_detailed(&self, query: &str, top_k: usize) -> Result<HybridResults> {
        match self.hybrid(query, top_k).await {
            Ok(results) => Ok(results),
            Err(hybrid_err) => {
                tracing::warn!("Hybrid search failed for '{}': {}, falling back to semantic search", query, hybrid_err);

                let fragments = match self.semantic_search(query, top_k).await {
                    Ok(fragments) => fragments,
                    Err(semantic_err) => {
                        tracing::warn!("Semantic fallback failed: {}, trying keyword search", semantic_err);
                        self.keyword_search(query, top_k).await.map_err(|keyword_err| {
                            CampusRagError::Retrieval(format!(
                                "semantic search: {}; keyword search: {}",
                                semantic_err, keyword_err
                            ))
                        })?
                    }
                };

                Ok(HybridResults {
                    fragments,
                    plan: BoostPlan::default(),
                    weights: MergeWeights::SEMANTIC_DOMINANT,
                    probes_issued: 0,
                    degraded: true,
                })
            }
        }
    }

    /// Semantic search only, with the similarity floor applied
    ///
    /// Fee questions naming a program embed an enriched query instead of the
    /// raw text.
    pub async fn semantic_search(&self, query: &str, top_k: usize) -> Result<Vec<DocumentFragment>> {
        let plan = self.booster.plan(query);
        let semantic_text = self.booster.semantic_query(query, &plan);
        if semantic_text != query {
            tracing::debug!("Semantic search embeds enriched query: {}", semantic_text);
        }
        self.semantic_with_floor(&semantic_text, self.similarity_floor, top_k)
            .await
    }

    pub(crate) async fn semantic_with_floor(
        &self,
        text: &str,
        floor: f64,
        top_k: usize,
    ) -> Result<Vec<DocumentFragment>> {
        let vector = self.embedder.embed(text).await?;
        let fragments = self.vectors.vector_search(&vector, floor, top_k).await?;
        Ok(fragments
            .into_iter()
            .map(|f| {
                let score = clamp_unit(f.relevance_score);
                f.with_score(score).with_origin(SearchSource::Semantic)
            })
            .collect())
    }

    /// Keyword search only, scores clamped into [0, 1]
    pub async fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<DocumentFragment>> {
        let fragments = self.keywords.keyword_search(query, limit).await?;
        Ok(fragments
            .into_iter()
            .map(|f| {
                let score = clamp_unit(f.relevance_score);
                f.with_score(score).with_origin(SearchSource::Keyword)
            })
            .collect())
    }

    async fn hybrid(&self, query: &str, top_k: usize) -> Result<HybridResults> {
        let plan = self.booster.plan(query);
        let weights = MergeWeights::for_plan(&plan);

        let keyword_limit = if plan.is_boosted() {
            top_k.saturating_mul(self.keyword_boost_factor)
        } else {
            top_k
        };

        let probes = try_join_all(plan.probes.iter().map(|probe| {
            tracing::debug!("Issuing keyword probe: {}", probe);
            self.keyword_search(probe, self.probe_result_limit)
        }));

        let (semantic, mut keyword, probe_results) = tokio::try_join!(
            self.semantic_search(query, top_k),
            self.keyword_search(query, keyword_limit),
            probes,
        )?;

        let probes_issued = probe_results.len();
        keyword.extend(probe_results.into_iter().flatten());

        tracing::info!(
            "Hybrid search '{}': {} semantic, {} keyword ({} probes), weights {:.1}/{:.1}",
            query,
            semantic.len(),
            keyword.len(),
            probes_issued,
            weights.semantic,
            weights.keyword
        );

        let fragments = combine_search_results(semantic, keyword, weights);

        Ok(HybridResults {
            fragments,
            plan,
            weights,
            probes_issued,
            degraded: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoostConfig;
    use crate::llm::testing::HashingEmbedder;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Store that answers every search after a fixed delay
    struct SlowStore {
        delay: Duration,
        keyword_limits: Mutex<Vec<usize>>,
    }

    impl SlowStore {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                keyword_limits: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl VectorSearch for SlowStore {
        async fn vector_search(
            &self,
            _query_vector: &[f32],
            _similarity_floor: f64,
            _limit: usize,
        ) -> Result<Vec<DocumentFragment>> {
            tokio::time::sleep(self.delay).await;
            Ok(vec![frag("v1", "semantic match").with_score(0.8)])
        }
    }

    #[async_trait]
    impl KeywordSearch for SlowStore {
        async fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<DocumentFragment>> {
            self.keyword_limits.lock().unwrap().push(limit);
            tokio::time::sleep(self.delay).await;
            Ok(vec![frag(query, &format!("keyword match for {}", query)).with_score(0.5)])
        }
    }

    /// Embedder that remembers the texts it was asked to embed
    #[derive(Default)]
    struct RecordingEmbedder {
        texts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Embedder for RecordingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.texts.lock().unwrap().push(text.to_string());
            HashingEmbedder.embed(text).await
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            HashingEmbedder.embed_batch(texts).await
        }

        fn dimensions(&self) -> usize {
            16
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    fn retriever(embedder: Arc<dyn Embedder>, store: Arc<SlowStore>) -> HybridRetriever {
        let config = RetrievalConfig::default();
        let booster = QueryBooster::new(&BoostConfig::default(), config.max_probes).unwrap();
        HybridRetriever::new(embedder, store.clone(), store, Arc::new(booster), &config)
    }

    #[tokio::test(start_paused = true)]
    async fn test_semantic_and_keyword_branches_run_concurrently() {
        let store = SlowStore::new(Duration::from_secs(1));
        let retriever = retriever(Arc::new(HashingEmbedder), store);

        let start = Instant::now();
        let fragments = retriever.search("tell me about campus life", 5).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(fragments.len(), 2);
        assert!(elapsed < Duration::from_secs(2), "branches took {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probes_run_concurrently_with_branches() {
        let store = SlowStore::new(Duration::from_secs(1));
        let retriever = retriever(Arc::new(HashingEmbedder), store.clone());

        let start = Instant::now();
        let results = retriever
            .search_detailed("NET Series-4 schedule Karachi", 5)
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert!(results.probes_issued >= 1);
        assert!(!results.degraded);
        assert_eq!(store.keyword_limits.lock().unwrap().len(), 1 + results.probes_issued);
        assert!(elapsed < Duration::from_secs(2), "search took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_huge_top_k_saturates_keyword_limit() {
        let store = SlowStore::new(Duration::ZERO);
        let retriever = retriever(Arc::new(HashingEmbedder), store.clone());

        let results = retriever.search_detailed("BSCS fee", usize::MAX).await.unwrap();

        assert!(results.plan.is_boosted());
        assert!(!results.fragments.is_empty());
        assert!(store.keyword_limits.lock().unwrap().contains(&usize::MAX));
    }

    #[tokio::test]
    async fn test_semantic_search_embeds_enriched_fee_query() {
        let embedder = Arc::new(RecordingEmbedder::default());
        let retriever = retriever(embedder.clone(), SlowStore::new(Duration::ZERO));

        retriever.semantic_search("BSCS fee", 5).await.unwrap();
        retriever.semantic_search("campus life", 5).await.unwrap();

        let texts = embedder.texts.lock().unwrap();
        assert!(texts[0].contains("fee structure"), "embedded {:?}", texts[0]);
        assert_eq!(texts[1], "campus life");
    }

    fn frag(id: &str, content: &str) -> DocumentFragment {
        DocumentFragment::new(id, content, "test")
    }

    #[test]
    fn test_rank_scores_and_sum_for_overlap() {
        let semantic = vec![frag("s1", "shared text"), frag("s2", "semantic only")];
        let keyword = vec![frag("k1", "Shared   TEXT"), frag("k2", "keyword only")];

        let merged = combine_search_results(semantic, keyword, MergeWeights::SEMANTIC_DOMINANT);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].id, "s1");
        assert!((merged[0].relevance_score - 1.0).abs() < 1e-9);
        assert_eq!(merged[0].origin, SearchSource::Hybrid);

        let semantic_only = merged.iter().find(|f| f.id == "s2").unwrap();
        assert!((semantic_only.relevance_score - 0.3).abs() < 1e-9);

        let keyword_only = merged.iter().find(|f| f.id == "k2").unwrap();
        assert!((keyword_only.relevance_score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_keyword_dominant_ordering() {
        let semantic = vec![frag("s", "semantic hit")];
        let keyword = vec![frag("k", "keyword hit")];
        let merged = combine_search_results(semantic, keyword, MergeWeights::KEYWORD_DOMINANT);
        assert_eq!(merged[0].id, "k");
        assert!((merged[0].relevance_score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_repeats_within_one_list_count_once() {
        let keyword = vec![frag("a", "fee table"), frag("b", "other"), frag("c", "fee table")];
        let merged = combine_search_results(Vec::new(), keyword, MergeWeights::KEYWORD_DOMINANT);
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|f| f.relevance_score <= 1.0));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(combine_search_results(Vec::new(), Vec::new(), MergeWeights::SEMANTIC_DOMINANT).is_empty());
    }

    #[test]
    fn test_weights_for_plan() {
        let boosted = BoostPlan {
            categories: vec!["schedule".to_string()],
            probes: Vec::new(),
        };
        assert!(MergeWeights::for_plan(&boosted).keyword >= 0.7);
        assert_eq!(MergeWeights::for_plan(&BoostPlan::default()), MergeWeights::SEMANTIC_DOMINANT);
    }
}
