//! Bathymetric slope criterion.
//!
//! Steep bathymetry needs short elements: the size is proportional to
//! `|d| / |∇d|`, the horizontal length over which the depth changes by its
//! own magnitude. Depth may be smoothed first, either with fixed length
//! bands or with a filter that follows the local Rossby radius of
//! deformation.

use std::f64::consts::PI;

use super::filter::{apply_bands, lowpass};
use super::{EARTH_ROTATION, GRAVITY, SIZE_CEILING, assign_banded};
use crate::config::{FilterMode, SlopeParams};
use crate::grid::{GradientSpacing, Grid, GridField, gradient_magnitude};

/// Depths above this elevation (m) are clipped before differentiation.
pub const LAND_CLIP: f64 = 10.0;

/// Number of radius bins used by the Rossby-adaptive filter.
pub const ROSSBY_BINS: usize = 10;

const SLOPE_EPSILON: f64 = 1e-12;

/// Slope-resolving size (degrees) within each configured depth band.
pub fn slope_layer(grid: &Grid, depth: &GridField, h0: f64, params: &SlopeParams) -> GridField {
    let mut clipped = depth.clone();
    clipped.map_inplace(|d| d.min(LAND_CLIP));

    let spacing = grid.mean_spacing_m();
    let filtered = match &params.filter {
        FilterMode::Off => clipped.clone(),
        FilterMode::Bands(bands) => apply_bands(&clipped, bands, spacing),
        FilterMode::Rossby { factor } => rossby_filter(grid, &clipped, *factor),
    };

    let slope = gradient_magnitude(&filtered, grid, GradientSpacing::Meters);
    if let Some((lo, hi)) = slope.min_max() {
        log::debug!("Slope range [{:.2e}, {:.2e}]", lo, hi);
    }

    assign_banded(
        grid,
        &clipped,
        params.bands.iter().map(|b| (b.band(), b.divisor)),
        h0,
        |idx, d| 2.0 * PI * d.abs() / slope[idx].max(SLOPE_EPSILON),
    )
}

/// Barotropic Rossby radius of deformation (m), `√(g|d|) / |2Ω sin φ|`,
/// capped at [`SIZE_CEILING`].
pub fn rossby_radius(depth: f64, lat: f64) -> f64 {
    let coriolis = (2.0 * EARTH_ROTATION * lat.to_radians().sin()).abs();
    let radius = (GRAVITY * depth.abs()).sqrt() / coriolis;
    if radius.is_finite() {
        radius.min(SIZE_CEILING)
    } else {
        SIZE_CEILING
    }
}

/// Low-pass filter each node at `factor` times its binned Rossby radius.
fn rossby_filter(grid: &Grid, depth: &GridField, factor: f64) -> GridField {
    let radius = grid.sample_nodes(|idx, _, lat| rossby_radius(depth[idx], lat));
    filter_by_radius(depth, &radius, factor, grid.mean_spacing_m())
}

/// Nodes are grouped into [`ROSSBY_BINS`] equal-width radius bins. Bins are
/// visited from small to large radius, each filtering the previous bin's
/// result, so the kernel only ever widens. Bins whose length does not exceed
/// twice the current width keep the current field.
fn filter_by_radius(depth: &GridField, radius: &GridField, factor: f64, spacing_m: f64) -> GridField {
    let Some((r_min, r_max)) = radius.min_max() else {
        return depth.clone();
    };

    let bin_width = (r_max - r_min) / ROSSBY_BINS as f64;
    let bin_of = |r: f64| {
        if bin_width > 0.0 {
            (((r - r_min) / bin_width) as usize).min(ROSSBY_BINS - 1)
        } else {
            0
        }
    };

    let mut width = spacing_m;
    let mut current = depth.clone();
    let mut result = depth.clone();

    for bin in 0..ROSSBY_BINS {
        let centre = r_min + (bin as f64 + 0.5) * bin_width;
        let length = factor * centre;
        if length > 2.0 * width {
            current = lowpass(&current, length, spacing_m);
            width = length;
            log::trace!("Rossby bin {}: filtering at {:.0} m", bin, length);
        }
        for (idx, &r) in radius.values().iter().enumerate() {
            if bin_of(r) == bin {
                result[idx] = current[idx];
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FilterBand, ResolutionBand};
    use crate::io::degrees_to_meters;
    use crate::types::{DepthBand, GridShape};
    use approx::assert_relative_eq;

    /// Depth falling linearly eastward: `d = -10 - s·x`.
    fn ramp(slope: f64) -> (Grid, GridField) {
        let grid = Grid::new(0.0, 30.0, 0.01, 0.01, GridShape::new(60, 6));
        let depth = grid.sample_nodes(|idx, _, _| {
            let i = idx % 60;
            let (sx, _) = grid.spacing_m(idx / 60);
            -10.0 - slope * sx * i as f64
        });
        (grid, depth)
    }

    #[test]
    fn test_uniform_slope_size() {
        let (grid, depth) = ramp(0.01);
        let layer = slope_layer(&grid, &depth, 1.0, &SlopeParams::new(10.0));

        let (i, j) = (30, 3);
        let d = depth.get(i, j).abs();
        let expected = 2.0 * PI * d / 0.01 / 10.0;
        assert_relative_eq!(
            degrees_to_meters(layer.get(i, j), grid.lat(j)),
            expected,
            max_relative = 1e-3
        );
    }

    #[test]
    fn test_flat_bottom_hits_ceiling() {
        let grid = Grid::new(0.0, 30.0, 0.01, 0.01, GridShape::new(5, 5));
        let depth = GridField::filled(grid.shape(), -50.0);
        let layer = slope_layer(&grid, &depth, 1.0, &SlopeParams::new(10.0));
        assert_relative_eq!(
            degrees_to_meters(layer.get(2, 2), grid.lat(2)),
            SIZE_CEILING,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_land_is_clipped() {
        let grid = Grid::new(0.0, 30.0, 0.01, 0.01, GridShape::new(5, 1));
        let depth = GridField::from_vec(grid.shape(), vec![500.0, 500.0, 500.0, 500.0, 500.0]);
        let layer = slope_layer(&grid, &depth, 1.0, &SlopeParams::new(10.0));
        // |d| is the clipped 10 m over a zero slope
        assert_relative_eq!(
            degrees_to_meters(layer[2], grid.lat(0)),
            SIZE_CEILING,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_band_restricts_assignment() {
        let (grid, depth) = ramp(0.01);
        let params = SlopeParams::new(10.0)
            .with_bands(vec![ResolutionBand::within(10.0, DepthBand::new(-10.0, -50.0))]);
        let layer = slope_layer(&grid, &depth, 1.0, &params);

        for (idx, &d) in depth.values().iter().enumerate() {
            assert_eq!(layer[idx].is_nan(), !(d > -50.0 && d <= -10.0));
        }
    }

    #[test]
    fn test_lowpass_filter_keeps_linear_ramp_interior() {
        let (grid, depth) = ramp(0.01);
        let params = SlopeParams::new(10.0)
            .with_filter(FilterMode::Bands(vec![FilterBand::LowPass { length: 20_000.0 }]));
        let filtered = slope_layer(&grid, &depth, 1.0, &params);
        let raw = slope_layer(&grid, &depth, 1.0, &SlopeParams::new(10.0));
        assert_relative_eq!(filtered.get(30, 3), raw.get(30, 3), max_relative = 1e-2);
    }

    #[test]
    fn test_rossby_radius() {
        let r = rossby_radius(-100.0, 45.0);
        let f = 2.0 * EARTH_ROTATION * 45f64.to_radians().sin();
        assert_relative_eq!(r, (GRAVITY * 100.0f64).sqrt() / f, max_relative = 1e-12);
        assert_eq!(rossby_radius(-100.0, 0.0), SIZE_CEILING);
    }

    #[test]
    fn test_rossby_filter_runs() {
        let (grid, depth) = ramp(0.01);
        let params = SlopeParams::new(10.0).with_filter(FilterMode::Rossby { factor: 0.01 });
        let layer = slope_layer(&grid, &depth, 1.0, &params);
        assert_eq!(layer.count_nan(), 0);
    }

    /// Shallow west half (radius 0) against a deep east half (radius 10 km).
    fn two_regimes() -> (GridField, GridField) {
        let shape = GridShape::new(40, 8);
        let west = |idx: usize| idx % 40 < 20;
        let depth = (0..320).map(|idx| if west(idx) { -1.0 } else { -4000.0 }).collect();
        let radius = (0..320).map(|idx| if west(idx) { 0.0 } else { 10_000.0 }).collect();
        (GridField::from_vec(shape, depth), GridField::from_vec(shape, radius))
    }

    #[test]
    fn test_small_radius_keeps_raw_depth() {
        let (depth, radius) = two_regimes();
        let filtered = filter_by_radius(&depth, &radius, 0.3, 100.0);
        // Bin 0 asks for 150 m, below twice the 100 m spacing
        for j in 0..8 {
            for i in 0..20 {
                assert_eq!(filtered.get(i, j), -1.0);
            }
        }
    }

    #[test]
    fn test_large_radius_reuses_widening_filters() {
        let (depth, radius) = two_regimes();
        let filtered = filter_by_radius(&depth, &radius, 0.3, 100.0);

        // Bin lengths 150, 450, ..., 2850 m: only 450, 1050 and 2250 exceed
        // twice the width reached so far
        let (l1, l3, l7) = (0.3 * 1500.0, 0.3 * 3500.0, 0.3 * 7500.0);
        let chained = lowpass(&lowpass(&lowpass(&depth, l1, 100.0), l3, 100.0), l7, 100.0);
        let single = lowpass(&depth, l7, 100.0);

        for j in 0..8 {
            for i in 20..40 {
                assert_relative_eq!(filtered.get(i, j), chained.get(i, j), max_relative = 1e-12);
            }
        }
        assert!(filtered.get(23, 4) > -4000.0);
        assert!((filtered.get(23, 4) - single.get(23, 4)).abs() > 10.0);
    }

    #[test]
    fn test_highpass_band_still_sizes() {
        let (grid, depth) = ramp(0.01);
        let params = SlopeParams::new(10.0)
            .with_filter(FilterMode::Bands(vec![FilterBand::HighPass { length: 20_000.0 }]));
        let filtered = slope_layer(&grid, &depth, 1.0, &params);
        let raw = slope_layer(&grid, &depth, 1.0, &SlopeParams::new(10.0));

        assert_eq!(filtered.count_nan(), 0);
        assert!(filtered.values().iter().all(|v| v.is_finite() && *v > 0.0));
        // The ramp itself is long-wave, so removing it flattens the slope
        assert!(filtered.get(30, 3) > raw.get(30, 3));
    }
}
