//! # Gated Collection Benchmarks
//!
//! ```bash
//! cargo bench --package gated-collections --bench gated_collections
//! ```
//!
//! - Flat: add, gated contains hit and miss
//! - Nested: add with bucket routing, contains, candidates
//! - Filter: build from proto, merge, distance

use std::collections::HashSet;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gated_collections::{
    BloomFilterGated, FilterConfig, FlatBucketFactory, GatedCollection, GatedNestedCollection,
    NestedConfig, ProtoFilter,
};
use rand::Rng;

fn generate_values(count: usize) -> Vec<(ProtoFilter, String)> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let value = format!("value_{:016x}", rng.gen::<u64>());
            (ProtoFilter::of(&value), value)
        })
        .collect()
}

fn flat_with(values: &[(ProtoFilter, String)]) -> GatedCollection<String, HashSet<String>> {
    let mut c = GatedCollection::with_config(
        FilterConfig::new(values.len().max(1), 100).expect("valid config"),
    )
    .expect("valid collection");
    for (proto, value) in values {
        c.add(proto, value.clone());
    }
    c
}

fn nested_with(values: &[(ProtoFilter, String)], bucket_items: usize) -> GatedNestedCollection<String> {
    let factory = FlatBucketFactory::<String, HashSet<String>>::new(
        FilterConfig::new(bucket_items, 100).expect("valid config"),
    )
    .expect("valid factory");
    let mut c = GatedNestedCollection::new(
        FilterConfig::new(values.len().max(1), 100).expect("valid config"),
        factory,
        NestedConfig::new(2).expect("valid nested config"),
    )
    .expect("valid collection");
    for (proto, value) in values {
        c.add(proto, value.clone());
    }
    c
}

fn bench_flat(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat");
    group.measurement_time(Duration::from_secs(5));

    let values = generate_values(1_000);
    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("add_1000", |b| {
        b.iter(|| black_box(flat_with(&values).count()))
    });

    let filled = flat_with(&values);
    let (hit_proto, hit) = &values[500];
    group.throughput(Throughput::Elements(1));
    group.bench_function("contains_hit", |b| {
        b.iter(|| black_box(filled.contains(black_box(hit_proto), black_box(hit))))
    });

    let misses = generate_values(1);
    let (miss_proto, miss) = &misses[0];
    group.bench_function("contains_miss", |b| {
        b.iter(|| black_box(filled.contains(black_box(miss_proto), black_box(miss))))
    });

    group.finish();
}

fn bench_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested");
    group.measurement_time(Duration::from_secs(5));

    let values = generate_values(1_000);
    for bucket_items in [16, 64, 256] {
        group.throughput(Throughput::Elements(values.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("add_1000", bucket_items),
            &bucket_items,
            |b, &bucket_items| b.iter(|| black_box(nested_with(&values, bucket_items).count())),
        );
    }

    let filled = nested_with(&values, 64);
    let (proto, value) = &values[500];
    group.throughput(Throughput::Elements(1));
    group.bench_function("contains_hit", |b| {
        b.iter(|| black_box(filled.contains(black_box(proto), black_box(value))))
    });
    group.bench_function("candidates", |b| {
        b.iter(|| black_box(filled.candidates_proto(black_box(proto)).count()))
    });

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    let config = FilterConfig::new(1_000, 100).expect("valid config");
    let values = generate_values(2);

    group.bench_function("from_proto", |b| {
        b.iter(|| black_box(values[0].0.to_filter(black_box(&config))))
    });

    let left = values[0].0.to_filter(&config);
    let right = values[1].0.to_filter(&config);
    group.bench_function("merge", |b| b.iter(|| black_box(left.merge(black_box(&right)))));
    group.bench_function("distance", |b| {
        b.iter(|| black_box(left.distance(black_box(&right))))
    });

    group.finish();
}

criterion_group!(benches, bench_flat, bench_nested, bench_filter);
criterion_main!(benches);
