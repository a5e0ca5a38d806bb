//! Criterion micro-benchmarks for topology construction.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use msgsim_test_utils::{complete_edges, ring_edges};
use msgsim_topology::Topology;

/// Benchmark: build a 10K-node ring.
fn bench_from_edges_ring_10k(c: &mut Criterion) {
    let edges = ring_edges(10_000);
    c.bench_function("from_edges_ring_10k", |b| {
        b.iter(|| black_box(Topology::from_edges(10_000, &edges).unwrap()));
    });
}

/// Benchmark: build a complete graph on 200 nodes (~20K edges).
fn bench_from_edges_complete_200(c: &mut Criterion) {
    let edges = complete_edges(200);
    c.bench_function("from_edges_complete_200", |b| {
        b.iter(|| black_box(Topology::from_edges(200, &edges).unwrap()));
    });
}

/// Benchmark: connectivity check on a 10K-node ring.
fn bench_is_connected_ring_10k(c: &mut Criterion) {
    let topology = Topology::from_edges(10_000, &ring_edges(10_000)).unwrap();
    c.bench_function("is_connected_ring_10k", |b| {
        b.iter(|| black_box(topology.is_connected()));
    });
}

criterion_group!(
    benches,
    bench_from_edges_ring_10k,
    bench_from_edges_complete_200,
    bench_is_connected_ring_10k
);
criterion_main!(benches);
