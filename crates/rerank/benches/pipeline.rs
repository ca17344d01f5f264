//! Latency benchmark for the full rerank pipeline.
//!
//! Run with: `cargo bench -p docrank-rerank --bench pipeline`
//!
//! A full request at the intake cap (100 candidates) should stay well under
//! 10ms on a single core.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use docrank_rerank::pipeline::{RawCandidate, RawRerankRequest};
use docrank_rerank::{rerank, EngineConfig};
use std::collections::HashMap;

const TOPICS: [&str; 8] = [
    "solar panel efficiency and photovoltaic cell degradation",
    "offshore wind farms and turbine maintenance schedules",
    "grid scale battery storage and peak load balancing",
    "hydroelectric dams and seasonal reservoir management",
    "geothermal heat pumps for residential heating systems",
    "carbon pricing policies and emissions trading markets",
    "electric vehicle charging infrastructure in cities",
    "green hydrogen production through electrolysis",
];

/// Passage of roughly production chunk size; every fifth one repeats an
/// earlier passage so dedup has real work to do.
fn passage(i: usize) -> String {
    let n = if i % 5 == 4 { i - 1 } else { i };
    let topic = TOPICS[n % TOPICS.len()];
    format!(
        "Report section {n} covers {topic}. Analysts compared installations across \
         regions, measured output against forecasts, and summarized the costs, \
         risks and benefits observed during the study period for planners."
    )
}

fn request(size: usize) -> RawRerankRequest {
    RawRerankRequest {
        query: "renewable energy storage benefits for grid planners".to_string(),
        candidates: (0..size)
            .map(|i| RawCandidate {
                id: format!("chunk-{i:03}"),
                text: passage(i),
                similarity_score: 0.70 + (i % 30) as f64 / 100.0,
                metadata: None,
            })
            .collect(),
        limit: Some(10),
        threshold: Some(0.7),
        idf_map: Some(HashMap::from([
            ("storage".to_string(), 2.4),
            ("grid".to_string(), 1.8),
            ("renewable".to_string(), 1.2),
        ])),
    }
}

fn bench_pipeline(c: &mut Criterion) {
    let config = EngineConfig::default();
    let mut group = c.benchmark_group("rerank");

    for size in [10usize, 50, 100] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("candidates", size), &size, |b, &size| {
            b.iter_batched(
                || request(size),
                |raw| black_box(rerank(raw, &config)),
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
