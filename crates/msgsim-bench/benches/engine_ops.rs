//! Criterion benchmarks for end-to-end runs in both modes.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use msgsim_bench::{coloring_profile, election_profile};
use msgsim_core::Mode;
use msgsim_engine::Simulation;

/// Benchmark: elect a leader on a 16-node ring, lock-step.
fn bench_election_sync_16(c: &mut Criterion) {
    c.bench_function("election_sync_16", |b| {
        b.iter(|| {
            let report = Simulation::run(election_profile(16, Mode::Sync, 1)).unwrap();
            black_box(report.metrics.rounds);
        });
    });
}

/// Benchmark: elect a leader on a 16-node ring, randomized delivery.
fn bench_election_async_16(c: &mut Criterion) {
    c.bench_function("election_async_16", |b| {
        b.iter(|| {
            let report = Simulation::run(election_profile(16, Mode::Async, 1)).unwrap();
            black_box(report.metrics.passes);
        });
    });
}

/// Benchmark: greedy coloring on a 32-node circulant graph, lock-step.
fn bench_coloring_sync_32(c: &mut Criterion) {
    c.bench_function("coloring_sync_32", |b| {
        b.iter(|| {
            let report = Simulation::run(coloring_profile(32, Mode::Sync, 1)).unwrap();
            black_box(report.metrics.delivered);
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench_election_sync_16, bench_election_async_16, bench_coloring_sync_32
}
criterion_main!(benches);
