//! Benchmark k-NN smoothing on randomly placed hexes
//!
//! Run with: cargo bench --bench knn_smoothing

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hex_scorer_rust::{knn_smooth, SmoothingParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_hexes(n: usize) -> (Vec<(Option<f64>, Option<f64>)>, Vec<Option<f64>>) {
    let mut rng = StdRng::seed_from_u64(42);
    let coords = (0..n)
        .map(|_| (Some(rng.gen_range(25.0..50.0)), Some(rng.gen_range(-125.0..-65.0))))
        .collect();
    let values = (0..n).map(|_| Some(rng.gen_range(0.3..0.9))).collect();
    (coords, values)
}

fn bench_knn_smooth(c: &mut Criterion) {
    let mut group = c.benchmark_group("knn_smooth");
    group.sample_size(10);

    for &n in &[500usize, 2_000, 5_000] {
        let (coords, values) = random_hexes(n);
        let params = SmoothingParams {
            k: 20,
            self_weight: 0.25,
            block_rows: 1024,
        };

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| knn_smooth(black_box(&coords), black_box(&values), params))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_knn_smooth);
criterion_main!(benches);
