//! Criterion micro-benchmarks for namespace interning and resolution.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fluxgraph_core::SignalNamespace;

fn make_namespace(n: usize) -> SignalNamespace {
    let mut ns = SignalNamespace::new();
    for i in 0..n {
        ns.intern(&format!("device_{}/channel_{}/value", i / 16, i % 16));
    }
    ns
}

/// Benchmark: re-intern an existing path (the idempotent fast path).
fn bench_intern_existing(c: &mut Criterion) {
    let mut ns = make_namespace(1024);

    c.bench_function("namespace_intern_existing_1k", |b| {
        b.iter(|| black_box(ns.intern(black_box("device_31/channel_7/value"))));
    });
}

/// Benchmark: resolve a known path without mutation.
fn bench_resolve(c: &mut Criterion) {
    let ns = make_namespace(1024);

    c.bench_function("namespace_resolve_1k", |b| {
        b.iter(|| black_box(ns.resolve(black_box("device_31/channel_7/value"))));
    });
}

/// Benchmark: reverse lookup by ID.
fn bench_lookup(c: &mut Criterion) {
    let ns = make_namespace(1024);
    let id = ns.resolve("device_31/channel_7/value");

    c.bench_function("namespace_lookup_1k", |b| {
        b.iter(|| black_box(ns.lookup(black_box(id))));
    });
}

criterion_group!(benches, bench_intern_existing, bench_resolve, bench_lookup);
criterion_main!(benches);
