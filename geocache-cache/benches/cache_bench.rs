//! Criterion benchmarks for the expiring cache: hit path, miss path, coalesced loads.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use futures::future::join_all;
use geocache_cache::ExpiringCache;
use geocache_core::GeocodeError;

type BenchCache = ExpiringCache<u64, String, GeocodeError>;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
}

fn bench_hit(c: &mut Criterion) {
    let rt = runtime();
    let cache = BenchCache::with_ttl(Duration::from_secs(3600)).unwrap();
    rt.block_on(cache.get_or_load(7, |k| async move { Ok(k.to_string()) }))
        .unwrap();

    let mut g = c.benchmark_group("hit");
    g.throughput(Throughput::Elements(1));
    g.bench_function("get_or_load", |b| {
        b.iter(|| {
            let value = rt.block_on(cache.get_or_load(black_box(7), |k| async move { Ok(k.to_string()) }));
            black_box(value).unwrap()
        });
    });
    g.bench_function("get", |b| {
        b.iter(|| black_box(cache.get(&black_box(7))));
    });
    g.finish();
}

fn bench_miss(c: &mut Criterion) {
    let rt = runtime();
    let cache = BenchCache::with_ttl(Duration::from_secs(3600)).unwrap();

    let mut g = c.benchmark_group("miss");
    g.throughput(Throughput::Elements(1));
    g.bench_function("load_and_store", |b| {
        b.iter(|| {
            cache.invalidate(&1);
            let value = rt.block_on(cache.get_or_load(1, |k| async move { Ok(k.to_string()) }));
            black_box(value).unwrap()
        });
    });
    g.finish();
}

fn bench_coalesced(c: &mut Criterion) {
    let rt = runtime();
    let mut g = c.benchmark_group("coalesced");

    for callers in [8usize, 64] {
        g.throughput(Throughput::Elements(callers as u64));
        g.bench_with_input(BenchmarkId::from_parameter(callers), &callers, |b, &callers| {
            b.iter(|| {
                let cache = BenchCache::with_ttl(Duration::from_secs(3600)).unwrap();
                let results = rt.block_on(join_all((0..callers).map(|_| {
                    cache.get_or_load(1, |k| async move {
                        tokio::task::yield_now().await;
                        Ok(k.to_string())
                    })
                })));
                black_box(results)
            });
        });
    }
    g.finish();
}

criterion_group!(benches, bench_hit, bench_miss, bench_coalesced);
criterion_main!(benches);
