//! Depth intervals.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Depth interval `lower < depth <= upper`.
///
/// Depths follow the bathymetry convention used throughout the crate:
/// negative below sea level. A band of shelf water 10–200 m deep is
/// therefore `DepthBand::new(-10.0, -200.0)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepthBand {
    /// Shallow (upper) limit, inclusive
    #[serde(default = "pos_inf", skip_serializing_if = "is_open")]
    pub upper: f64,
    /// Deep (lower) limit, exclusive
    #[serde(default = "neg_inf", skip_serializing_if = "is_open")]
    pub lower: f64,
}

fn pos_inf() -> f64 {
    f64::INFINITY
}

fn neg_inf() -> f64 {
    f64::NEG_INFINITY
}

fn is_open(limit: &f64) -> bool {
    limit.is_infinite()
}

impl DepthBand {
    /// Create a band from its shallow and deep limits.
    pub fn new(upper: f64, lower: f64) -> Self {
        Self { upper, lower }
    }

    /// Band covering every depth.
    pub fn everywhere() -> Self {
        Self::new(f64::INFINITY, f64::NEG_INFINITY)
    }

    /// Check whether a depth falls inside the band.
    #[inline]
    pub fn contains(&self, depth: f64) -> bool {
        depth > self.lower && depth <= self.upper
    }

    /// True when the band is the unbounded default.
    pub fn is_everywhere(&self) -> bool {
        self.upper == f64::INFINITY && self.lower == f64::NEG_INFINITY
    }
}

impl Default for DepthBand {
    fn default() -> Self {
        Self::everywhere()
    }
}

impl fmt::Display for DepthBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}] m", self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_everywhere_json() {
        let json = serde_json::to_string(&DepthBand::everywhere()).unwrap();
        assert_eq!(json, "{}");
        let back: DepthBand = serde_json::from_str(&json).unwrap();
        assert!(back.is_everywhere());
    }

    #[test]
    fn test_band_edges() {
        let band = DepthBand::new(-10.0, -200.0);
        assert!(band.contains(-10.0));
        assert!(!band.contains(-200.0));
        assert!(band.contains(-199.9));
        assert!(!band.contains(0.0));
    }

    #[test]
    fn test_everywhere() {
        let band = DepthBand::default();
        assert!(band.is_everywhere());
        assert!(band.contains(-5000.0));
        assert!(band.contains(50.0));
    }
}
