//! Finite-difference gradients on the structured grid.

use super::builder::Grid;
use super::field::GridField;

/// Units of the spacing used for differencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientSpacing {
    /// Grid spacing in degrees (for degree-valued fields such as distance)
    Degrees,
    /// Per-row haversine spacing in metres (for depth)
    Meters,
}

/// Gradient components `(∂f/∂lon, ∂f/∂lat)`.
///
/// Central differences in the interior, one-sided differences on the edges.
/// A single row or column yields a zero component along that axis.
pub fn gradient(field: &GridField, grid: &Grid, spacing: GradientSpacing) -> (GridField, GridField) {
    let shape = field.shape();
    let (nx, ny) = shape.as_tuple();
    let mut gx = GridField::filled(shape, 0.0);
    let mut gy = GridField::filled(shape, 0.0);

    for j in 0..ny {
        let (hx, hy) = match spacing {
            GradientSpacing::Degrees => (grid.dx(), grid.dy()),
            GradientSpacing::Meters => grid.spacing_m(j),
        };

        for i in 0..nx {
            if nx > 1 {
                let (a, b, span) = stencil(i, nx);
                gx.set(i, j, (field.get(b, j) - field.get(a, j)) / (span * hx));
            }
            if ny > 1 {
                let (a, b, span) = stencil(j, ny);
                gy.set(i, j, (field.get(i, b) - field.get(i, a)) / (span * hy));
            }
        }
    }

    (gx, gy)
}

/// Euclidean norm of [`gradient`].
pub fn gradient_magnitude(field: &GridField, grid: &Grid, spacing: GradientSpacing) -> GridField {
    let (mut gx, gy) = gradient(field, grid, spacing);
    for (x, y) in gx.values_mut().iter_mut().zip(gy.values()) {
        *x = x.hypot(*y);
    }
    gx
}

/// Neighbour indices and cell span for differencing at `k` of `n`.
#[inline]
fn stencil(k: usize, n: usize) -> (usize, usize, f64) {
    if k == 0 {
        (0, 1, 1.0)
    } else if k == n - 1 {
        (n - 2, n - 1, 1.0)
    } else {
        (k - 1, k + 1, 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GridShape;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_field_exact() {
        let grid = Grid::new(0.0, 0.0, 0.5, 0.25, GridShape::new(5, 4));
        let f = grid.sample(|lon, lat| 3.0 * lon - 2.0 * lat);
        let (gx, gy) = gradient(&f, &grid, GradientSpacing::Degrees);
        for (&a, &b) in gx.values().iter().zip(gy.values()) {
            assert_relative_eq!(a, 3.0, epsilon = 1e-12);
            assert_relative_eq!(b, -2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_diagonal_plane_magnitude() {
        let grid = Grid::new(-1.0, -1.0, 0.1, 0.1, GridShape::new(21, 21));
        let f = grid.sample(|lon, lat| 0.6 * lon + 0.8 * lat);
        let mag = gradient_magnitude(&f, &grid, GradientSpacing::Degrees);
        assert!(mag.values().iter().all(|&m| (m - 1.0).abs() < 1e-9));
    }
}
