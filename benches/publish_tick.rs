//! Benchmarks for the per-tick publish path
//!
//! A tick runs on the tracker's hot loop, so it has to stay well under a
//! microsecond. Covers:
//! - Steady-state ticks (freshness counter increment)
//! - Identity-change ticks (calibration lookup, table store, acknowledgment)
//! - Consumer-side reads of the full record
//!
//! Platform: Cross-platform (in-process region, CI-safe)

use criterion::{Criterion, criterion_group, criterion_main};
use posewire::calibration::{CalibrationProvider, GameRegistry};
use posewire::channel::Publisher;
use posewire::region::{LocalRegion, SharedRegion};
use posewire::{CalibrationEntry, ConsumerView, Pose};
use std::hint::black_box;
use std::sync::Arc;

fn publisher(region: &LocalRegion) -> Publisher {
    let games: Arc<dyn CalibrationProvider> = Arc::new(GameRegistry::from_entries(
        (0..64).map(|id| (id, CalibrationEntry::new([id as u8; 8], format!("Game {id}")))),
    ));
    let mut publisher = Publisher::new(games);
    publisher.initialize(region.heap());
    publisher
}

fn bench_steady_tick(c: &mut Criterion) {
    let region = LocalRegion::new();
    let mut publisher = publisher(&region);
    let pose = Pose::new(12.5, -4.0, 1.5, 0.3, -0.2, 1.1);
    publisher.publish(region.heap(), &pose, &pose);

    c.bench_function("publish_steady_tick", |b| {
        b.iter(|| black_box(publisher.publish(region.heap(), black_box(&pose), black_box(&pose))))
    });
}

fn bench_identity_change(c: &mut Criterion) {
    let region = LocalRegion::new();
    let mut publisher = publisher(&region);
    let pose = Pose::default();
    let mut id = 0;

    c.bench_function("publish_identity_change", |b| {
        b.iter(|| {
            id = (id + 1) % 64;
            region.heap().game_id.store(id);
            black_box(publisher.publish(region.heap(), &pose, &pose))
        })
    });
}

fn bench_consumer_read(c: &mut Criterion) {
    let region = LocalRegion::new();
    let _publisher = publisher(&region);
    let consumer = ConsumerView::new(region.clone());

    c.bench_function("consumer_read_record", |b| b.iter(|| black_box(consumer.read())));
}

criterion_group!(benches, bench_steady_tick, bench_identity_change, bench_consumer_read);
criterion_main!(benches);
