//! Gradient limiter, layer combination and unit conversion properties.

use sizefield_rs::sizing::{combine_layers, grade_violations, limit_gradient};
use sizefield_rs::{Grid, GridField, GridShape};

use approx::assert_relative_eq;

/// ~100 m grid near 45°N.
fn grid(nx: usize, ny: usize) -> Grid {
    let dy = 100.0 / 111_000.0;
    let dx = dy / 45f64.to_radians().cos();
    Grid::new(-4.0, 45.0, dx, dy, GridShape::new(nx, ny))
}

#[test]
fn test_step_function_smoothed_inward() {
    let grid = grid(60, 20);
    // h = 10 on the western half, 1000 on the eastern half
    let mut sizes = grid.sample_nodes(|idx, _, _| if idx % 60 < 30 { 10.0 } else { 1000.0 });
    let report = limit_gradient(&grid, &mut sizes, 0.2, grid.len() + 1).unwrap();

    assert!(report.converged);
    assert_eq!(grade_violations(&grid, &sizes, 0.2, 1e-6), 0);

    for j in 0..20 {
        // Small half untouched
        for i in 0..30 {
            assert_eq!(sizes.get(i, j), 10.0);
        }
        // Monotone non-decreasing moving away from the step, never above the input
        for i in 30..59 {
            assert!(sizes.get(i + 1, j) >= sizes.get(i, j));
            assert!(sizes.get(i, j) <= 1000.0);
        }
        // Growth of g · dx per column next to the step
        let (dx, _) = grid.spacing_m(j);
        assert_relative_eq!(sizes.get(30, j), 10.0 + 0.2 * dx, max_relative = 1e-9);
    }
}

#[test]
fn test_grading_twice_is_identity() {
    let grid = grid(30, 30);
    let mut sizes = grid.sample_nodes(|idx, _, _| 50.0 + ((idx * 7919) % 97) as f64 * 40.0);
    limit_gradient(&grid, &mut sizes, 0.15, grid.len() + 1).unwrap();
    let graded = sizes.clone();

    let report = limit_gradient(&grid, &mut sizes, 0.15, grid.len() + 1).unwrap();
    assert_eq!(report.iterations, 1);
    for (a, b) in sizes.values().iter().zip(graded.values()) {
        assert_relative_eq!(a, b, epsilon = 1e-9);
    }
}

#[test]
fn test_graded_field_respects_floor() {
    let grid = grid(25, 25);
    let h0 = 75.0;
    let mut sizes = grid.sample_nodes(|idx, _, _| if idx % 11 == 0 { h0 } else { 4000.0 });
    limit_gradient(&grid, &mut sizes, 0.3, grid.len() + 1).unwrap();
    assert!(sizes.values().iter().all(|&h| h >= h0));
}

#[test]
fn test_combine_disjoint_nan_regions() {
    let shape = GridShape::new(4, 2);
    let nan = f64::NAN;
    let a = GridField::from_vec(shape, vec![1.0, nan, 3.0, nan, 5.0, nan, 0.5, nan]);
    let b = GridField::from_vec(shape, vec![nan, 2.0, 1.0, nan, 6.0, nan, nan, 9.0]);

    let combined = combine_layers(&[&a, &b], f64::NAN);
    let v = combined.field.values();

    assert_eq!(v[0], 1.0);
    assert_eq!(v[1], 2.0);
    assert_eq!(v[2], 1.0);
    assert_eq!(v[4], 5.0);
    assert_eq!(v[6], 0.5);
    assert_eq!(v[7], 9.0);
    // NaN only where both inputs are NaN
    assert!(v[3].is_nan());
    assert!(v[5].is_nan());
    assert_eq!(combined.filled, 2);
}

#[test]
fn test_degrees_meters_round_trip() {
    let grid = grid(12, 9);
    let degrees = grid.sample_nodes(|idx, _, _| 1e-3 * (1.0 + idx as f64));
    let back = grid.to_degrees(&grid.to_meters(&degrees));
    for (a, b) in degrees.values().iter().zip(back.values()) {
        assert_relative_eq!(a, b, max_relative = 1e-12);
    }
}
