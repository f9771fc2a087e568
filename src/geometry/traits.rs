//! Boundary distance capability.

use crate::io::GeoBoundingBox;

/// Signed distance to the domain boundary.
///
/// Distances are in degrees, negative inside the domain (water) and
/// positive outside. Implementations must return finite values for any
/// point in or near [`bbox`](Self::bbox).
pub trait DistanceEvaluator: Sync {
    /// Signed distance (degrees) from `(lon, lat)` to the boundary.
    fn signed_distance(&self, lon: f64, lat: f64) -> f64;

    /// Extent of the domain.
    fn bbox(&self) -> GeoBoundingBox;

    /// Check whether a point lies inside the domain.
    fn is_inside(&self, lon: f64, lat: f64) -> bool {
        self.signed_distance(lon, lat) < 0.0
    }
}

/// Distance evaluator backed by a closure.
///
/// # Example
///
/// ```
/// use sizefield_rs::geometry::{DistanceEvaluator, FnDistance};
/// use sizefield_rs::io::GeoBoundingBox;
///
/// // Straight coastline along lon = 0, water to the east
/// let bbox = GeoBoundingBox::new(0.0, 0.0, 1.0, 1.0);
/// let coast = FnDistance::new(bbox, |lon, _lat| -lon);
/// assert!(coast.is_inside(0.5, 0.5));
/// ```
pub struct FnDistance<F> {
    bbox: GeoBoundingBox,
    f: F,
}

impl<F> FnDistance<F>
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    /// Wrap a `(lon, lat) -> signed distance` function.
    pub fn new(bbox: GeoBoundingBox, f: F) -> Self {
        Self { bbox, f }
    }
}

impl<F> DistanceEvaluator for FnDistance<F>
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    fn signed_distance(&self, lon: f64, lat: f64) -> f64 {
        (self.f)(lon, lat)
    }

    fn bbox(&self) -> GeoBoundingBox {
        self.bbox
    }
}
