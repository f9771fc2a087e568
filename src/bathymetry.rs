//! Bathymetry collaborator.
//!
//! Any continuous depth source can drive the wavelength, slope, channel and
//! CFL criteria by implementing [`Bathymetry`]. Depth is signed: negative
//! below sea level, positive on land.
//!
//! # Example
//!
//! ```
//! use sizefield_rs::bathymetry::{Bathymetry, FnBathymetry};
//!
//! // Shelf deepening eastward by 100 m per degree
//! let shelf = FnBathymetry::new(|lon, _lat| -100.0 * lon);
//! assert_eq!(shelf.depth(2.0, 60.0), -200.0);
//! ```

use crate::io::GeoBoundingBox;

/// Depth interpolant over geographic coordinates.
pub trait Bathymetry: Sync {
    /// Signed depth (m) at `(lon, lat)`; negative below sea level.
    fn depth(&self, lon: f64, lat: f64) -> f64;

    /// Extent covered by the data, if known.
    fn bbox(&self) -> Option<GeoBoundingBox> {
        None
    }
}

/// Bathymetry given by a function `B(lon, lat)`.
pub struct FnBathymetry<F> {
    f: F,
}

impl<F> FnBathymetry<F>
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    /// Wrap a depth function.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Bathymetry for FnBathymetry<F>
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    fn depth(&self, lon: f64, lat: f64) -> f64 {
        (self.f)(lon, lat)
    }
}

/// Uniform depth everywhere.
#[derive(Debug, Clone, Copy)]
pub struct ConstantBathymetry(pub f64);

impl Bathymetry for ConstantBathymetry {
    fn depth(&self, _lon: f64, _lat: f64) -> f64 {
        self.0
    }
}
