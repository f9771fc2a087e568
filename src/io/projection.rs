//! Geographic bounding boxes and degree/metre conversions.
//!
//! All sizing layers are stored in geographic degrees, but gradient limiting,
//! bound enforcement and the CFL check work in planar metres. The conversion
//! used everywhere is the local spherical approximation
//!
//! ```text
//! metres = degrees · 111 000 · cos(lat)
//! ```
//!
//! which is what the downstream mesh generator assumes as well.
//!
//! # Example
//!
//! ```
//! use sizefield_rs::io::{degrees_to_meters, meters_to_degrees};
//!
//! let deg = meters_to_degrees(500.0, 60.0);
//! assert!((degrees_to_meters(deg, 60.0) - 500.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

/// Metres per degree of arc used by the sizing conversions.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Mean Earth radius (m) used for haversine distances.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBoundingBox {
    /// Minimum longitude (western edge) in degrees
    pub min_lon: f64,
    /// Minimum latitude (southern edge) in degrees
    pub min_lat: f64,
    /// Maximum longitude (eastern edge) in degrees
    pub max_lon: f64,
    /// Maximum latitude (northern edge) in degrees
    pub max_lat: f64,
}

impl GeoBoundingBox {
    /// Create a new bounding box.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Check if a point is within this bounding box.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Get the center of the bounding box as (lon, lat).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// Mean latitude of the box, used as the representative latitude
    /// for metre/degree conversion of the grid spacing.
    pub fn mean_lat(&self) -> f64 {
        (self.min_lat + self.max_lat) / 2.0
    }

    /// True when both extents are strictly positive and finite.
    pub fn is_valid(&self) -> bool {
        self.max_lon > self.min_lon
            && self.max_lat > self.min_lat
            && [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
                .iter()
                .all(|v| v.is_finite())
    }

    /// Expand the bounding box by a factor (1.1 = 10% expansion).
    pub fn expand(&self, factor: f64) -> Self {
        let lat_range = self.max_lat - self.min_lat;
        let lon_range = self.max_lon - self.min_lon;
        let lat_margin = lat_range * (factor - 1.0) / 2.0;
        let lon_margin = lon_range * (factor - 1.0) / 2.0;

        Self {
            min_lon: self.min_lon - lon_margin,
            min_lat: self.min_lat - lat_margin,
            max_lon: self.max_lon + lon_margin,
            max_lat: self.max_lat + lat_margin,
        }
    }

    /// Check whether two boxes overlap (touching counts).
    pub fn intersects(&self, other: &GeoBoundingBox) -> bool {
        self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
            && self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
    }
}

/// Metres per degree at the given latitude.
#[inline]
pub fn meters_per_degree(lat: f64) -> f64 {
    METERS_PER_DEGREE * lat.to_radians().cos()
}

/// Convert a length in degrees to metres at latitude `lat`.
#[inline]
pub fn degrees_to_meters(value: f64, lat: f64) -> f64 {
    value * meters_per_degree(lat)
}

/// Convert a length in metres to degrees at latitude `lat`.
#[inline]
pub fn meters_to_degrees(value: f64, lat: f64) -> f64 {
    value / meters_per_degree(lat)
}

/// Great-circle distance in metres between two (lon, lat) points.
pub fn haversine_m(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = phi2 - phi1;
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bbox_contains_and_center() {
        let bbox = GeoBoundingBox::new(8.0, 63.5, 9.5, 64.0);
        assert!(bbox.contains(8.9, 63.8));
        assert!(!bbox.contains(10.0, 63.8));
        let (lon, lat) = bbox.center();
        assert_relative_eq!(lon, 8.75);
        assert_relative_eq!(lat, 63.75);
        assert!(bbox.is_valid());
    }

    #[test]
    fn test_bbox_intersects() {
        let a = GeoBoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = GeoBoundingBox::new(0.5, 0.5, 2.0, 2.0);
        let c = GeoBoundingBox::new(3.0, 3.0, 4.0, 4.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_degree_conversion_at_equator() {
        assert_relative_eq!(degrees_to_meters(1.0, 0.0), METERS_PER_DEGREE);
        assert_relative_eq!(meters_to_degrees(111.0, 0.0), 0.001, epsilon = 1e-15);
    }

    #[test]
    fn test_degree_conversion_shrinks_with_latitude() {
        assert_relative_eq!(degrees_to_meters(1.0, 60.0), 55_500.0, epsilon = 1e-6);
    }

    #[test]
    fn test_haversine_one_degree_meridian() {
        // One degree of latitude on a 6371 km sphere
        let d = haversine_m(5.0, 60.0, 5.0, 61.0);
        assert_relative_eq!(d, 111_194.9, epsilon = 1.0);
    }
}
