//! Physically motivated size criteria.
//!
//! Each criterion is a pure function from shared read-only inputs (grid,
//! signed distance, sampled depth) to a layer in geographic degrees, with
//! `NaN` where the criterion does not apply:
//!
//! | Criterion | Module | Needs |
//! |-----------|--------|-------|
//! | Distance to boundary | [`distance`] | boundary |
//! | Feature size (medial axis) | [`feature_size`] | boundary |
//! | Tidal wavelength | [`wavelength`] | bathymetry |
//! | Bathymetric slope | [`slope`] | bathymetry |
//! | Channel imprinting | [`channel`] | bathymetry, centrelines |

pub mod channel;
pub mod distance;
pub mod feature_size;
pub mod filter;
pub mod slope;
pub mod wavelength;

pub use channel::{Channel, ChannelLayer, SkippedChannelPoint, channel_layer};
pub use distance::{distance_layer, signed_distance_field};
pub use feature_size::{FeatureSizeLayer, feature_size_layer};
pub use slope::slope_layer;
pub use wavelength::wavelength_layer;

use crate::grid::{Grid, GridField};
use crate::io::meters_to_degrees;
use crate::types::DepthBand;

/// Gravitational acceleration (m/s²)
pub const GRAVITY: f64 = 9.81;

/// Period of the principal lunar semidiurnal tide M2 (s)
pub const M2_PERIOD: f64 = 12.42 * 3600.0;

/// Earth rotation rate (rad/s)
pub const EARTH_ROTATION: f64 = 7.292e-5;

/// Ceiling (m) on wavelength and slope sizes, keeping degree conversion finite
pub const SIZE_CEILING: f64 = 1.0e6;

/// Assign metre sizes within each band, in order, converting to degrees.
///
/// Later bands overwrite earlier ones where their depth ranges overlap.
/// Sizes are clamped to `[h0, SIZE_CEILING]`.
pub(crate) fn assign_banded<F>(
    grid: &Grid,
    depth: &GridField,
    bands: impl IntoIterator<Item = (DepthBand, f64)>,
    h0: f64,
    size_m: F,
) -> GridField
where
    F: Fn(usize, f64) -> f64,
{
    let mut layer = GridField::nan(grid.shape());

    for (band, divisor) in bands {
        for (idx, &d) in depth.values().iter().enumerate() {
            if !band.contains(d) {
                continue;
            }
            let (_, lat) = grid.node(idx);
            let meters = (size_m(idx, d) / divisor).clamp(h0, SIZE_CEILING);
            layer[idx] = meters_to_degrees(meters, lat);
        }
    }

    layer
}
