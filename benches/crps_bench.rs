//! Benchmarks for CRPS scoring and the neighbourhood-forecast hot path.
//!
//! Run with: `cargo bench --bench crps_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use coastval::grid::{CurvilinearGrid, GriddedField, NeighbourhoodSpec};
use coastval::obs::ObservationSeries;
use coastval::stats::{crps, Cdf, CdfKind};
use coastval::verify::SonfScorer;

/// Deterministic pseudo-random sample in [-1, 1].
fn synthetic_sample(n: usize) -> Vec<f64> {
    (0..n)
        .map(|k| ((k as f64 * 12.9898).sin() * 43758.5453).fract())
        .collect()
}

/// A coastal-scale synthetic field with a tidal oscillation.
fn synthetic_field(nx: usize, ny: usize, nt: usize) -> GriddedField {
    let lon_axis: Vec<f64> = (0..nx).map(|i| 5.0 + 0.05 * i as f64).collect();
    let lat_axis: Vec<f64> = (0..ny).map(|j| 60.0 + 0.05 * j as f64).collect();
    let grid = CurvilinearGrid::rectilinear(&lon_axis, &lat_axis).unwrap();
    let times: Vec<f64> = (0..nt).map(|t| 3600.0 * t as f64).collect();

    let mut values = Vec::with_capacity(nt * ny * nx);
    for &t in &times {
        let tide = 0.4 * (2.0 * std::f64::consts::PI * t / (12.42 * 3600.0)).cos();
        for j in 0..ny {
            for i in 0..nx {
                values.push(tide + 0.01 * j as f64 - 0.005 * i as f64);
            }
        }
    }
    GriddedField::new("ssh", grid, times, values).unwrap()
}

fn synthetic_track(n_obs: usize) -> ObservationSeries {
    ObservationSeries::new(
        "ssh",
        (0..n_obs).map(|k| 5.1 + 0.013 * (k % 50) as f64).collect(),
        (0..n_obs).map(|k| 60.1 + 0.011 * (k % 50) as f64).collect(),
        (0..n_obs).map(|k| 600.0 * k as f64).collect(),
        synthetic_sample(n_obs),
    )
    .unwrap()
}

fn bench_crps_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("crps");
    let obs_cdf = Cdf::new(&[0.3], CdfKind::Empirical).unwrap();

    for &n in &[8usize, 64, 512] {
        let sample = synthetic_sample(n);
        let empirical = Cdf::new(&sample, CdfKind::Empirical).unwrap();
        let theoretical = Cdf::new(&sample, CdfKind::Theoretical).unwrap();

        group.bench_with_input(BenchmarkId::new("empirical", n), &empirical, |b, cdf| {
            b.iter(|| crps(black_box(cdf), black_box(&obs_cdf)))
        });
        group.bench_with_input(BenchmarkId::new("theoretical", n), &theoretical, |b, cdf| {
            b.iter(|| crps(black_box(cdf), black_box(&obs_cdf)))
        });
    }
    group.finish();
}

fn bench_cdf_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("cdf_build");
    for &n in &[64usize, 1024] {
        let sample = synthetic_sample(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &sample, |b, sample| {
            b.iter(|| Cdf::new(black_box(sample), CdfKind::Empirical).unwrap())
        });
    }
    group.finish();
}

fn bench_score_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_series");
    group.sample_size(20);

    let field = synthetic_field(40, 40, 24);
    let scorer = SonfScorer::new(NeighbourhoodSpec::Radius { km: 10.0 });

    for &n_obs in &[10usize, 100] {
        let track = synthetic_track(n_obs);
        group.bench_with_input(BenchmarkId::from_parameter(n_obs), &track, |b, track| {
            b.iter(|| scorer.score_series(black_box(&field), black_box(track)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_crps_score,
    bench_cdf_construction,
    bench_score_series
);
criterion_main!(benches);
