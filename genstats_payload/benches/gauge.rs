//! Benchmarks for gauge line encoding.

use std::{
    hint::black_box,
    num::{NonZeroU32, NonZeroUsize},
    time::Duration,
};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use genstats_payload::{KeyGenerator, KeyPool, gauge};
use rand::{SeedableRng, rngs::SmallRng};

const WORDS: [&str; 16] = [
    "cache", "cpu", "disk", "drop", "heap", "io", "lag", "load", "mem", "net", "pool", "queue",
    "rate", "shard", "swap", "wal",
];

fn key_pool() -> KeyPool {
    let mut rng = SmallRng::seed_from_u64(19690716);
    let words = WORDS.iter().map(ToString::to_string).collect();
    let mut generator = KeyGenerator::new(words, NonZeroU32::new(10_000).expect("non-zero"))
        .expect("failed to create KeyGenerator");
    generator
        .pool(&mut rng, NonZeroUsize::new(100).expect("non-zero"))
        .expect("failed to build key pool")
}

fn gauge_encode(c: &mut Criterion) {
    let pool = key_pool();
    let key = pool.cycle(0);
    let mut buf = Vec::with_capacity(gauge::max_encoded_len(key));

    c.bench_function("gauge_encode", |b| {
        b.iter(|| {
            buf.clear();
            black_box(gauge::encode(&mut buf, black_box(key), black_box(u64::MAX)));
        })
    });
}

fn gauge_cycle(c: &mut Criterion) {
    let pool = key_pool();
    let capacity = pool
        .keys()
        .iter()
        .map(|key| gauge::max_encoded_len(key))
        .max()
        .unwrap_or_default();

    let mut group = c.benchmark_group("gauge_cycle");
    for lines in &[1_000_u64, 10_000, 100_000] {
        group.throughput(Throughput::Elements(*lines));
        group.bench_with_input(BenchmarkId::from_parameter(lines), lines, |b, &lines| {
            let mut buf = Vec::with_capacity(capacity);
            b.iter(|| {
                for idx in 0..lines {
                    buf.clear();
                    black_box(gauge::encode(&mut buf, pool.cycle(idx), idx));
                }
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = gauge_encode, gauge_cycle
);
criterion_main!(benches);
