//! Benchmarks for draining a discovery stack
//!
//! Run with: cargo bench --package discovery
//!
//! Swipes through an in-memory catalog end to end, refills included.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use discovery::{DecideOutcome, DiscoveryStack, LocalBackend};
use profiles::{Candidate, Catalog, CatalogEntry, ViewerId};
use std::sync::Arc;
use tokio::runtime::Runtime;

fn build_catalog(size: usize) -> Catalog {
    let entries = (0..size)
        .map(|i| {
            CatalogEntry::new(
                Candidate::new(format!("artist-{}", i), format!("Artist {}", i))
                    .with_genres(["rock", "indie"]),
            )
        })
        .collect();
    Catalog::from_entries(entries).expect("Failed to build catalog")
}

async fn drain(backend: Arc<LocalBackend>) -> usize {
    let stack = DiscoveryStack::builder(backend.clone(), backend)
        .with_viewer(ViewerId::new("bench"))
        .build();
    stack.load_stack().await;

    let mut decided = 0;
    while let DecideOutcome::Recorded { .. } = stack.decide(decided % 3 == 0).await {
        decided += 1;
        stack.settle().await;
    }
    decided
}

fn bench_drain_catalog(c: &mut Criterion) {
    let runtime = Runtime::new().expect("Failed to build runtime");
    let catalog = build_catalog(200);

    c.bench_function("drain_200_artists_batch_20", |b| {
        b.iter(|| {
            let backend = Arc::new(LocalBackend::new(catalog.clone()).with_batch_size(20));
            let decided = runtime.block_on(drain(black_box(backend)));
            black_box(decided)
        })
    });
}

fn bench_load_stack(c: &mut Criterion) {
    let runtime = Runtime::new().expect("Failed to build runtime");
    let backend = Arc::new(LocalBackend::new(build_catalog(1000)).with_batch_size(50));
    let stack = DiscoveryStack::builder(backend.clone(), backend)
        .with_viewer(ViewerId::new("bench"))
        .build();

    c.bench_function("load_stack_batch_50", |b| {
        b.iter(|| black_box(runtime.block_on(stack.load_stack())))
    });
}

criterion_group!(benches, bench_drain_catalog, bench_load_stack);
criterion_main!(benches);
