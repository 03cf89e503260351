//! Retrieval pipeline benchmarks
//!
//! Measures performance of:
//! - Rank fusion of semantic and keyword lists
//! - Fingerprint deduplication
//! - MMR diversity selection
//! - FTS5 keyword search and brute-force vector search

use campusrag_core::db::vectors::cosine_similarity;
use campusrag_core::search::{combine_search_results, dedupe, select_diverse, MergeWeights};
use campusrag_core::{DocumentFragment, KnowledgeBase, NewFragment};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tempfile::TempDir;

const TOPICS: &[&str] = &[
    "Fee structure for BSCS PKR 171,350 per semester national students",
    "NET TEST SCHEDULE TABLE Series-3 Islamabad April Series-4 Karachi June",
    "Eligibility criteria 60% marks in FSc Pre-Engineering or ICS",
    "Hostel accommodation for outstation students on merit",
    "Deficiency mathematics course for Pre-Medical candidates, 8 weeks",
    "Result NET-2026 Series-3 uploaded on the candidate login account",
];

const DIMENSIONS: usize = 64;

fn fragments(count: usize) -> Vec<DocumentFragment> {
    (0..count)
        .map(|i| {
            let content = format!("{} (section {})", TOPICS[i % TOPICS.len()], i / 3);
            DocumentFragment::new(format!("f{}", i), content, "bench")
                .with_score(1.0 - i as f64 / count as f64)
        })
        .collect()
}

fn vector_for(seed: usize) -> Vec<f32> {
    (0..DIMENSIONS)
        .map(|d| (((seed * 31 + d * 17) % 97) as f32 / 97.0) - 0.5)
        .collect()
}

fn setup_knowledge_base(count: usize) -> (KnowledgeBase, TempDir) {
    let temp = TempDir::new().unwrap();
    let kb = KnowledgeBase::open(temp.path().join("bench.sqlite")).unwrap();
    kb.initialize().unwrap();

    for (i, fragment) in fragments(count).into_iter().enumerate() {
        kb.insert_fragment(
            NewFragment::new(fragment.content, "bench"),
            Some(vector_for(i).as_slice()),
        )
        .unwrap();
    }

    (kb, temp)
}

fn bench_rank_fusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_fusion");

    for size in [10, 50, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let semantic = fragments(size);
            let keyword: Vec<DocumentFragment> = fragments(size).into_iter().rev().collect();
            b.iter(|| {
                combine_search_results(
                    black_box(semantic.clone()),
                    black_box(keyword.clone()),
                    MergeWeights::KEYWORD_DOMINANT,
                )
            });
        });
    }

    group.finish();
}

fn bench_dedupe(c: &mut Criterion) {
    let mut group = c.benchmark_group("dedupe");

    for size in [30, 120, 480] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut input = fragments(size);
            input.extend(fragments(size / 2));
            b.iter(|| dedupe(black_box(input.clone())));
        });
    }

    group.finish();
}

fn bench_select_diverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_diverse");

    for k in [5, 10, 20] {
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |b, &k| {
            let candidates = fragments(40);
            b.iter(|| select_diverse(black_box(candidates.clone()), black_box(k), 0.5));
        });
    }

    group.finish();
}

fn bench_knowledge_base_search(c: &mut Criterion) {
    let (kb, _temp) = setup_knowledge_base(300);
    let query_vector = vector_for(7);

    c.bench_function("keyword_search", |b| {
        b.iter(|| kb.search_fts(black_box("NET Series-4 Karachi"), 10).unwrap());
    });

    c.bench_function("vector_search", |b| {
        b.iter(|| kb.search_vectors(black_box(&query_vector), 0.3, 10).unwrap());
    });

    c.bench_function("cosine_similarity", |b| {
        let other = vector_for(11);
        b.iter(|| cosine_similarity(black_box(&query_vector), black_box(&other)));
    });
}

criterion_group!(
    benches,
    bench_rank_fusion,
    bench_dedupe,
    bench_select_diverse,
    bench_knowledge_base_search
);
criterion_main!(benches);
