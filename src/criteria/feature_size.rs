//! Feature-size criterion from the medial axis of the signed distance.
//!
//! The distance field has unit gradient everywhere except on the medial
//! axis, where the nearest boundary point jumps between opposite shores.
//! Medial points found there (plus pinch points in channels too narrow for
//! the gradient test) give the local half-width `d_MA + |d|`, so
//!
//! ```text
//! fs = 2 · (d_MA + |d|) / R
//! ```
//!
//! resolves a channel of that width with `R` elements.

use crate::config::FeatureSizeParams;
use crate::geometry::{NearestNeighbor, PointIndex};
use crate::grid::{GradientSpacing, Grid, GridField, gradient_magnitude};
use crate::io::METERS_PER_DEGREE;

/// Gradient magnitude below which a node is a medial-axis candidate.
pub const MEDIAL_GRADIENT_THRESHOLD: f64 = 0.9;

/// Candidates must lie at least this many grid cells inside the domain.
pub const MEDIAL_INTERIOR_CELLS: f64 = 0.5;

/// Neighbours a medial point needs within the pruning cutoff.
pub const MEDIAL_MIN_NEIGHBORS: usize = 3;

/// Pruning cutoff multipliers of `√2 · dx`, tried in order.
const PRUNE_MULTIPLIERS: [f64; 3] = [1.0, 2.0, 3.0];

/// Feature-size layer plus the medial points it was built from.
#[derive(Debug, Clone)]
pub struct FeatureSizeLayer {
    /// Size in degrees
    pub layer: GridField,
    /// Surviving medial points (lon, lat)
    pub medial_points: Vec<(f64, f64)>,
}

/// Compute the feature-size layer (degrees) from the signed distance field.
///
/// Returns an all-`NaN` layer when no medial point survives.
pub fn feature_size_layer(
    grid: &Grid,
    distance: &GridField,
    h0: f64,
    params: &FeatureSizeParams,
) -> FeatureSizeLayer {
    let candidates = medial_candidates(grid, distance);
    let medial_points = prune_isolated(&candidates, grid.dx());

    if medial_points.is_empty() {
        log::warn!("No medial-axis points found; feature-size layer left undefined");
        return FeatureSizeLayer {
            layer: GridField::nan(grid.shape()),
            medial_points,
        };
    }

    log::debug!(
        "Medial axis: {} candidates, {} after pruning",
        candidates.len(),
        medial_points.len()
    );

    let index = PointIndex::new(&medial_points);
    let h0_deg = h0 / METERS_PER_DEGREE;
    let r = params.elements_per_feature;

    let layer = grid.sample_nodes(|idx, lon, lat| {
        let d = distance[idx];
        let d_ma = index.nearest(lon, lat).map_or(0.0, |(_, dist)| dist);
        (2.0 * (d_ma + d.abs()) / r).max(h0_deg)
    });

    FeatureSizeLayer {
        layer,
        medial_points,
    }
}

/// Nodes flagged by the gradient test or as pinch points.
pub fn medial_candidates(grid: &Grid, distance: &GridField) -> Vec<(f64, f64)> {
    let grad = gradient_magnitude(distance, grid, GradientSpacing::Degrees);
    let interior = -MEDIAL_INTERIOR_CELLS * grid.dx();
    let (nx, ny) = grid.shape().as_tuple();

    let mut points = Vec::new();
    for j in 0..ny {
        for i in 0..nx {
            let d = distance.get(i, j);
            let singular = grad.get(i, j) < MEDIAL_GRADIENT_THRESHOLD && d < interior;
            if singular || is_pinch(distance, i, j) {
                points.push((grid.lon(i), grid.lat(j)));
            }
        }
    }
    points
}

/// Interior node whose opposite neighbours along a row or column are both outside.
fn is_pinch(distance: &GridField, i: usize, j: usize) -> bool {
    let (nx, ny) = distance.shape().as_tuple();
    if distance.get(i, j) >= 0.0 {
        return false;
    }
    let across_row = i > 0 && i + 1 < nx && distance.get(i - 1, j) > 0.0 && distance.get(i + 1, j) > 0.0;
    let across_col = j > 0 && j + 1 < ny && distance.get(i, j - 1) > 0.0 && distance.get(i, j + 1) > 0.0;
    across_row || across_col
}

/// Drop medial points without enough close neighbours.
///
/// Each point is tested on its own: it survives at the first cutoff in
/// `PRUNE_MULTIPLIERS` that holds `MEDIAL_MIN_NEIGHBORS` other points,
/// and is dropped if none does.
pub fn prune_isolated(points: &[(f64, f64)], dx: f64) -> Vec<(f64, f64)> {
    if points.len() <= MEDIAL_MIN_NEIGHBORS {
        return Vec::new();
    }

    let index = PointIndex::new(points);
    let cutoffs = PRUNE_MULTIPLIERS.map(|m| m * std::f64::consts::SQRT_2 * dx * (1.0 + 1e-9));

    points
        .iter()
        .copied()
        .filter(|&(x, y)| {
            // Distance to the k-th neighbour, skipping the point itself
            let kth = index
                .k_nearest_distances(x, y, MEDIAL_MIN_NEIGHBORS + 1)
                .get(MEDIAL_MIN_NEIGHBORS)
                .copied()
                .unwrap_or(f64::INFINITY);
            cutoffs.iter().any(|&c| kth <= c)
        })
        .collect()
}
