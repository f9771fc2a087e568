//! Tidal wavelength criterion.
//!
//! Size needed to resolve the M2 wavelength `T·√(g|d|)` with a given number
//! of elements per wavelength.

use super::{GRAVITY, M2_PERIOD, assign_banded};
use crate::config::WavelengthParams;
use crate::grid::{Grid, GridField};

/// Wavelength-resolving size (degrees) within each configured depth band.
///
/// Bands are applied in order; where two bands overlap the later one wins.
pub fn wavelength_layer(grid: &Grid, depth: &GridField, h0: f64, params: &WavelengthParams) -> GridField {
    let layer = assign_banded(
        grid,
        depth,
        params.bands.iter().map(|b| (b.band(), b.divisor)),
        h0,
        |_, d| M2_PERIOD * (GRAVITY * d.abs()).sqrt(),
    );
    log::debug!(
        "Wavelength layer: {} of {} nodes assigned",
        layer.count_defined(),
        layer.shape().len()
    );
    layer
}
