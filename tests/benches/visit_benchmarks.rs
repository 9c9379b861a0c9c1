//! # Warden Visit Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | visit, existing key | < 1µs |
//! | visit, new key | < 5µs |
//! | sweep, 10k clients | < 10ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;
use warden_admission::{AdmissionConfig, ClientRegistry, TokenBucketLimiter};

fn bench_limiter(c: &mut Criterion) {
    let mut group = c.benchmark_group("limiter");

    group.bench_function("try_consume", |b| {
        let mut limiter = TokenBucketLimiter::new(Duration::from_millis(1), 1_000);
        b.iter(|| black_box(limiter.try_consume()))
    });

    group.finish();
}

fn bench_visit(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry-visit");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("existing_key_ordinary", |b| {
        let registry = ClientRegistry::new(AdmissionConfig::default()).unwrap();
        registry.visit("10.0.0.1", false);
        b.iter(|| black_box(registry.visit(black_box("10.0.0.1"), false)))
    });

    group.bench_function("existing_key_sensitive", |b| {
        // A high ban threshold keeps the score climbing without tripping the ban
        let config = AdmissionConfig {
            ban_threshold: u32::MAX,
            ..Default::default()
        };
        let registry = ClientRegistry::new(config).unwrap();
        b.iter(|| black_box(registry.visit(black_box("10.0.0.1"), true)))
    });

    group.bench_function("new_key", |b| {
        let registry = ClientRegistry::new(AdmissionConfig::default()).unwrap();
        let mut n: u64 = 0;
        b.iter(|| {
            n += 1;
            black_box(registry.visit(&n.to_string(), false))
        })
    });

    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry-sweep");

    for clients in [1_000usize, 10_000] {
        let registry = Arc::new(ClientRegistry::new(AdmissionConfig::default()).unwrap());
        for i in 0..clients {
            registry.visit(&format!("client-{i}"), true);
        }

        group.throughput(Throughput::Elements(clients as u64));
        group.bench_with_input(BenchmarkId::new("sweep", clients), &registry, |b, registry| {
            b.iter(|| black_box(registry.sweep()))
        });
    }

    group.finish();
}

fn bench_contended_visits(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry-contention");

    for threads in [2usize, 8] {
        group.bench_with_input(BenchmarkId::new("shared_key", threads), &threads, |b, &threads| {
            let registry = Arc::new(ClientRegistry::new(AdmissionConfig::default()).unwrap());
            b.iter(|| {
                std::thread::scope(|s| {
                    for _ in 0..threads {
                        let registry = Arc::clone(&registry);
                        s.spawn(move || {
                            for _ in 0..100 {
                                black_box(registry.visit("10.0.0.1", false));
                            }
                        });
                    }
                });
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_limiter,
    bench_visit,
    bench_sweep,
    bench_contended_visits
);
criterion_main!(benches);
