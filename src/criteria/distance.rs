//! Distance-to-boundary criterion.
//!
//! The signed distance field computed here is also the input of the
//! feature-size criterion, the nearshore cap and channel filtering.

use crate::config::DistanceParams;
use crate::geometry::DistanceEvaluator;
use crate::grid::{Grid, GridField};
use crate::io::METERS_PER_DEGREE;

/// Signed distance (degrees) from every grid node to the boundary.
pub fn signed_distance_field(grid: &Grid, boundary: &dyn DistanceEvaluator) -> GridField {
    let field = grid.sample(|lon, lat| boundary.signed_distance(lon, lat));
    if let Some((lo, hi)) = field.min_max() {
        log::debug!("Signed distance range [{:.5}, {:.5}]°", lo, hi);
    }
    field
}

/// Size (degrees) growing linearly away from the boundary:
/// `h0/111 000 + rate · |d|`.
pub fn distance_layer(distance: &GridField, h0: f64, params: &DistanceParams) -> GridField {
    let h0_deg = h0 / METERS_PER_DEGREE;
    let mut layer = distance.clone();
    layer.map_inplace(|d| h0_deg + params.rate * d.abs());
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FnDistance;
    use crate::io::GeoBoundingBox;
    use crate::types::GridShape;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_growth() {
        let grid = Grid::new(0.0, 0.0, 0.01, 0.01, GridShape::new(11, 3));
        let coast = FnDistance::new(GeoBoundingBox::new(0.0, 0.0, 0.1, 0.02), |lon, _| -lon);
        let d = signed_distance_field(&grid, &coast);
        let layer = distance_layer(&d, 111.0, &DistanceParams::new(0.5));

        assert_relative_eq!(layer.get(0, 1), 0.001, epsilon = 1e-12);
        assert_relative_eq!(layer.get(10, 1), 0.001 + 0.05, epsilon = 1e-12);
        // Constant increment per column
        let step = layer.get(5, 0) - layer.get(4, 0);
        assert_relative_eq!(step, 0.005, epsilon = 1e-12);
    }
}
