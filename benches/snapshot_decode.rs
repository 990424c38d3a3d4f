//! Benchmarks for record decoding
//!
//! Decode sits on every polling iteration, three threads deep, so it should
//! stay well under the shortest sampling interval (16ms for physics).
//!
//! Platform: Cross-platform (decodes synthetic buffers, CI-safe)

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use trackside::records::{GraphicsSnapshot, PhysicsSnapshot, StaticInfoSnapshot, TelemetryRecord};

fn bench_physics_decode(c: &mut Criterion) {
    let bytes = vec![0u8; PhysicsSnapshot::SIZE];

    let mut group = c.benchmark_group("snapshot_decode");
    group.throughput(Throughput::Bytes(PhysicsSnapshot::SIZE as u64));
    group.bench_function("physics", |b| {
        b.iter(|| {
            let snapshot = PhysicsSnapshot::decode(black_box(&bytes)).unwrap();
            black_box(snapshot)
        })
    });
    group.finish();
}

fn bench_graphics_decode(c: &mut Criterion) {
    let bytes = vec![0u8; GraphicsSnapshot::SIZE];

    let mut group = c.benchmark_group("snapshot_decode");
    group.throughput(Throughput::Bytes(GraphicsSnapshot::SIZE as u64));
    group.bench_function("graphics", |b| {
        b.iter(|| {
            let snapshot = GraphicsSnapshot::decode(black_box(&bytes)).unwrap();
            black_box(snapshot)
        })
    });
    group.finish();
}

fn bench_static_info_decode_and_strings(c: &mut Criterion) {
    let bytes = vec![0u8; StaticInfoSnapshot::SIZE];
    let snapshot = StaticInfoSnapshot::decode(&bytes).unwrap();

    let mut group = c.benchmark_group("snapshot_decode");
    group.throughput(Throughput::Bytes(StaticInfoSnapshot::SIZE as u64));
    group.bench_function("static_info", |b| {
        b.iter(|| {
            let snapshot = StaticInfoSnapshot::decode(black_box(&bytes)).unwrap();
            black_box(snapshot)
        })
    });
    group.bench_function("static_info_car_model_string", |b| {
        b.iter(|| black_box(black_box(&snapshot).car_model()))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_physics_decode,
    bench_graphics_decode,
    bench_static_info_decode_and_strings
);
criterion_main!(benches);
