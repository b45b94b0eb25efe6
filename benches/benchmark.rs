use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use doc_consistency::{
    AnalyzerConfig, BasicTokenizer, ContradictionBand, CorpusStatistics, Document, DocumentAnalyzer, IdfMode,
    SimilarityEngine, Thresholds, Vectorizer,
};

const TOPICS: &[&str] = &[
    "cache", "timeout", "deployment", "signing", "retries", "logging", "storage", "network",
];
const WORDS: &[&str] = &[
    "entries", "expire", "seconds", "required", "optional", "client", "server", "release", "builds",
    "nightly", "memory", "disk", "limit", "window", "policy", "token", "session", "queue",
];

/// Deterministic synthetic corpus, roughly paragraph-sized documents
fn synthetic_corpus(n: usize) -> Vec<(String, String)> {
    (0..n)
        .map(|i| {
            let mut text = String::new();
            for k in 0..40 {
                let w = if k % 5 == 0 {
                    TOPICS[(i + k) % TOPICS.len()]
                } else {
                    WORDS[(i * 7 + k * 3) % WORDS.len()]
                };
                text.push_str(w);
                text.push(if k % 10 == 9 { '.' } else { ' ' });
            }
            text.push_str(&format!(" Limit is {} seconds.", i % 13));
            (text, format!("doc{}.md", i % (n / 2).max(1)))
        })
        .collect()
}

fn similarity_sweep_benchmark(c: &mut Criterion) {
    let thresholds = Thresholds {
        duplicate: 0.75,
        contradiction_band: ContradictionBand { low: 0.3, high: 0.7 },
    };
    let mut group = c.benchmark_group("compare_all");
    for n in [100usize, 400] {
        let docs = Document::from_inputs(synthetic_corpus(n), &BasicTokenizer::new());
        let stats = Arc::new(CorpusStatistics::build(&docs, IdfMode::Standard).expect("non-empty corpus"));
        let vectors = Vectorizer::<f64>::new(stats).vectorize_all(&docs);
        let engine = SimilarityEngine::new(thresholds);
        group.bench_with_input(BenchmarkId::from_parameter(n), &vectors, |b, v| {
            b.iter(|| engine.compare_all(v).expect("same snapshot"))
        });
    }
    group.finish();
}

fn full_pipeline_benchmark(c: &mut Criterion) {
    let inputs = synthetic_corpus(200);
    let analyzer = DocumentAnalyzer::new(AnalyzerConfig::default()).expect("default config is valid");
    c.bench_function("analyze_200", |b| {
        b.iter(|| analyzer.analyze(inputs.iter().cloned()).expect("non-empty corpus"))
    });
}

criterion_group!(benches, similarity_sweep_benchmark, full_pipeline_benchmark);
criterion_main!(benches);
