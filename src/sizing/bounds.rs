//! Upper and lower size bounds.

use crate::config::SizingConfig;
use crate::grid::{Grid, GridField};
use crate::io::degrees_to_meters;

/// Nodes closer than this to the boundary (m) count as nearshore.
pub const NEARSHORE_DISTANCE_M: f64 = 1000.0;

/// Clamp a metre-valued size field to the configured bounds.
///
/// Order: nearshore cap (needs `distance`, degrees), h0 floor, global
/// max_el, then each depth-banded max_el (needs `depth`). Missing inputs
/// skip the corresponding step; the pipeline checks their presence.
pub fn apply_bounds(
    grid: &Grid,
    sizes: &mut GridField,
    config: &SizingConfig,
    distance: Option<&GridField>,
    depth: Option<&GridField>,
) {
    if let (Some(max_ns), Some(distance)) = (config.max_el_ns, distance) {
        let mut capped = 0usize;
        for (idx, h) in sizes.values_mut().iter_mut().enumerate() {
            let (_, lat) = grid.node(idx);
            if degrees_to_meters(distance[idx].abs(), lat) <= NEARSHORE_DISTANCE_M && *h > max_ns {
                *h = max_ns;
                capped += 1;
            }
        }
        log::debug!("Nearshore cap {} m applied at {} nodes", max_ns, capped);
    }

    sizes.map_inplace(|h| h.max(config.h0).min(config.max_el));

    if let Some(depth) = depth {
        for band in &config.max_el_bands {
            let range = band.band();
            for (h, &d) in sizes.values_mut().iter_mut().zip(depth.values()) {
                if range.contains(d) {
                    *h = h.min(band.max_el);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaxElementBand;
    use crate::types::{DepthBand, GridShape};

    fn grid() -> Grid {
        Grid::new(0.0, 0.0, 0.01, 0.01, GridShape::new(4, 1))
    }

    #[test]
    fn test_floor_and_ceiling() {
        let config = SizingConfig::new(50.0, 1000.0, 0.2);
        let mut sizes = GridField::from_vec(grid().shape(), vec![10.0, 500.0, 5000.0, 50.0]);
        apply_bounds(&grid(), &mut sizes, &config, None, None);
        assert_eq!(sizes.values(), &[50.0, 500.0, 1000.0, 50.0]);
    }

    #[test]
    fn test_nearshore_cap() {
        let config = SizingConfig::new(50.0, 1000.0, 0.2).with_max_el_ns(200.0);
        let mut sizes = GridField::filled(grid().shape(), 800.0);
        // 0.005° ≈ 555 m, 0.05° ≈ 5.5 km
        let distance = GridField::from_vec(grid().shape(), vec![-0.005, -0.05, 0.005, -0.0]);
        apply_bounds(&grid(), &mut sizes, &config, Some(&distance), None);
        assert_eq!(sizes.values(), &[200.0, 800.0, 200.0, 200.0]);
    }

    #[test]
    fn test_depth_bands() {
        let config = SizingConfig::new(50.0, 1000.0, 0.2)
            .with_max_el_band(MaxElementBand::new(300.0, DepthBand::new(0.0, -100.0)))
            .with_max_el_band(MaxElementBand::new(600.0, DepthBand::new(-100.0, -1000.0)));
        let mut sizes = GridField::filled(grid().shape(), 900.0);
        let depth = GridField::from_vec(grid().shape(), vec![-10.0, -100.0, -500.0, -5000.0]);
        apply_bounds(&grid(), &mut sizes, &config, None, Some(&depth));
        assert_eq!(sizes.values(), &[300.0, 600.0, 600.0, 900.0]);
    }
}
