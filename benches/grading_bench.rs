//! Benchmarks for gradient limiting.
//!
//! Run with: `cargo bench --bench grading_bench`
//!
//! Measures the min-plus relaxation on square grids seeded with a few
//! small-size spots in an otherwise coarse field.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sizefield_rs::sizing::limit_gradient;
use sizefield_rs::{Grid, GridField, GridShape};

/// ~100 m grid at 50°N with small sizes at a handful of spots.
fn setup_problem(n: usize) -> (Grid, GridField) {
    let dy = 100.0 / 111_000.0;
    let dx = dy / 50f64.to_radians().cos();
    let grid = Grid::new(0.0, 50.0, dx, dy, GridShape::new(n, n));
    let sizes = grid.sample_nodes(|idx, _, _| if idx % (n * 7 + 3) == 0 { 100.0 } else { 5000.0 });
    (grid, sizes)
}

/// Benchmark limiting an ungraded field.
fn bench_limit_gradient(c: &mut Criterion) {
    let mut group = c.benchmark_group("limit_gradient");
    group.sample_size(20);

    for n in [64, 128, 256] {
        let (grid, sizes) = setup_problem(n);

        group.bench_with_input(BenchmarkId::new("spots", format!("{}x{}", n, n)), &n, |b, _| {
            b.iter(|| {
                let mut work = sizes.clone();
                limit_gradient(black_box(&grid), black_box(&mut work), 0.2, grid.len() + 1)
            });
        });
    }

    group.finish();
}

/// Benchmark a single sweep over an already graded field.
fn bench_graded_noop(c: &mut Criterion) {
    let mut group = c.benchmark_group("limit_gradient_graded");

    for n in [128, 256] {
        let (grid, mut sizes) = setup_problem(n);
        let _ = limit_gradient(&grid, &mut sizes, 0.2, grid.len() + 1);

        group.bench_with_input(BenchmarkId::new("graded", format!("{}x{}", n, n)), &n, |b, _| {
            b.iter(|| {
                let mut work = sizes.clone();
                limit_gradient(black_box(&grid), black_box(&mut work), 0.2, 1)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_limit_gradient, bench_graded_noop);
criterion_main!(benches);
