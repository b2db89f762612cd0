//! Push and binned-query throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sigscope::series::sparse::SparseSeries;
use sigscope::{ChunkedArena, DenseSeries, TsSample};

fn bench_arena_push(c: &mut Criterion) {
    c.bench_function("arena_push_100k", |b| {
        b.iter(|| {
            let mut arena = ChunkedArena::new(16384);
            for i in 0..100_000 {
                arena.push(black_box(i as f64));
            }
            arena
        })
    });
}

fn bench_dense_query(c: &mut Criterion) {
    let series = DenseSeries::new(0.0, 1.0 / 48000.0).unwrap();
    let values: Vec<f64> = (0..1_000_000).map(|i| (i as f64 * 0.01).sin()).collect();
    series.push_samples(&values);
    let (start, end) = series.get_span();

    let mut group = c.benchmark_group("dense_get_samples");
    for bins in [100usize, 1000, 4000] {
        let mut out = vec![TsSample::default(); bins];
        group.bench_with_input(BenchmarkId::from_parameter(bins), &bins, |b, &bins| {
            b.iter(|| {
                series.get_samples(
                    &mut out,
                    black_box(start),
                    (end - start) / bins as f64,
                    bins,
                )
            })
        });
    }
    group.finish();
}

fn bench_sparse_query(c: &mut Criterion) {
    let series = SparseSeries::new();
    for i in 0..100_000 {
        let _ = series.push_value(i as f64 * 0.1, (i % 100) as f64);
    }

    c.bench_function("sparse_get_interpolated", |b| {
        b.iter(|| series.get(black_box(4321.05)))
    });
    c.bench_function("sparse_mean_bins_1000", |b| {
        b.iter(|| series.mean_bins(0.0, black_box(10.0), 1000))
    });
}

criterion_group!(benches, bench_arena_push, bench_dense_query, bench_sparse_query);
criterion_main!(benches);
