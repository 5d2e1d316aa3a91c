//! Benchmark for streaming tick performance.
//!
//! TARGET: a full tick (difficulty, spawn, populate, reclaim) stays in
//! the microsecond range regardless of how far the traveler has gone.
//!
//! Run with: cargo bench --package slipstream_corridor --bench streamer_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use slipstream_corridor::{CorridorStreamer, EventBus, HeadlessWorld, LevelConfig, StreamSeed};

fn fresh_streamer(seed: u64) -> (CorridorStreamer, HeadlessWorld, slipstream_corridor::EventReceiver) {
    let bus = EventBus::new(4096);
    let receiver = bus.receiver();
    let mut world = HeadlessWorld::new();
    let mut streamer =
        CorridorStreamer::new(LevelConfig::production(), StreamSeed::new(seed), bus.sender())
            .expect("production config");
    streamer.start(&mut world);
    (streamer, world, receiver)
}

fn benchmark_steady_state_tick(c: &mut Criterion) {
    let (mut streamer, mut world, receiver) = fresh_streamer(42);
    // Warm past the bootstrap so the window is saturated.
    let mut distance = 0.0f32;
    while distance < 1_000.0 {
        distance += 2.0;
        streamer.update(distance, &mut world);
    }
    let _ = receiver.drain();

    c.bench_function("steady_state_tick", |b| {
        b.iter(|| {
            distance += 2.0;
            streamer.update(black_box(distance), &mut world);
            let _ = receiver.drain();
        });
    });
}

fn benchmark_long_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("long_run");
    group.sample_size(10);

    // 5,000 ticks = 10km of corridor per iteration.
    group.throughput(Throughput::Elements(5_000));
    group.bench_function("10km_walk", |b| {
        b.iter(|| {
            let (mut streamer, mut world, receiver) = fresh_streamer(7);
            let mut distance = 0.0f32;
            for _ in 0..5_000 {
                distance += 2.0;
                streamer.update(distance, &mut world);
                let _ = receiver.drain();
            }
            black_box(streamer.stats())
        });
    });

    group.finish();
}

fn benchmark_proximity_query(c: &mut Criterion) {
    let (mut streamer, mut world, receiver) = fresh_streamer(21);
    let mut distance = 0.0f32;
    while distance < 2_000.0 {
        distance += 2.0;
        streamer.update(distance, &mut world);
    }
    let _ = receiver.drain();

    c.bench_function("obstacles_in_radius", |b| {
        b.iter(|| {
            black_box(streamer.obstacles_in_radius(
                black_box(slipstream_shared::Vec3::forward(distance)),
                50.0,
            ))
        });
    });
}

criterion_group!(
    benches,
    benchmark_steady_state_tick,
    benchmark_long_run,
    benchmark_proximity_query
);
criterion_main!(benches);
