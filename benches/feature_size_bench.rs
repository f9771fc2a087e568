//! Benchmarks for the feature-size criterion.
//!
//! Run with: `cargo bench --bench feature_size_bench`
//!
//! Covers medial-axis extraction and per-node nearest-medial-point queries
//! for a straight channel polygon at increasing resolution.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sizefield_rs::criteria::feature_size::medial_candidates;
use sizefield_rs::criteria::{feature_size_layer, signed_distance_field};
use sizefield_rs::{DistanceEvaluator, FeatureSizeParams, Grid, GridField, PolygonBoundary};

/// Channel 0.02° wide and 0.2° long.
fn setup_problem(h0: f64) -> (Grid, GridField) {
    let boundary = PolygonBoundary::from_ring(
        &[(0.0, 0.0), (0.2, 0.0), (0.2, 0.02), (0.0, 0.02), (0.0, 0.0)],
        &[],
    );
    let grid = Grid::from_bbox(&boundary.bbox(), None, h0).expect("valid grid");
    let distance = signed_distance_field(&grid, &boundary);
    (grid, distance)
}

/// Benchmark medial-axis candidate detection.
fn bench_medial_candidates(c: &mut Criterion) {
    let mut group = c.benchmark_group("medial_candidates");

    for h0 in [200.0, 100.0, 50.0] {
        let (grid, distance) = setup_problem(h0);

        group.bench_with_input(
            BenchmarkId::new("channel", format!("{}_nodes", grid.len())),
            &h0,
            |b, _| {
                b.iter(|| medial_candidates(black_box(&grid), black_box(&distance)));
            },
        );
    }

    group.finish();
}

/// Benchmark the full feature-size layer.
fn bench_feature_size_layer(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_size_layer");
    let params = FeatureSizeParams::new(3.0);

    for h0 in [200.0, 100.0, 50.0] {
        let (grid, distance) = setup_problem(h0);

        group.bench_with_input(
            BenchmarkId::new("channel", format!("{}_nodes", grid.len())),
            &h0,
            |b, &h0| {
                b.iter(|| feature_size_layer(black_box(&grid), black_box(&distance), h0, &params));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_medial_candidates, bench_feature_size_layer);
criterion_main!(benches);
