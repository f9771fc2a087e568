//! GeoTIFF bathymetry reader.
//!
//! Loads a depth raster from a GeoTIFF file and exposes it through the
//! [`Bathymetry`] trait. Uses the pure Rust `tiff` crate, so no GDAL is
//! required.
//!
//! # Example
//!
//! ```ignore
//! use sizefield_rs::bathymetry::Bathymetry;
//! use sizefield_rs::io::GeoTiffBathymetry;
//!
//! let bathy = GeoTiffBathymetry::load("data/bathymetry.tif")?;
//! let depth = bathy.depth(8.9, 63.8);
//! ```

use std::fmt;
use std::fs::File;
use std::path::Path;

use thiserror::Error;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use super::projection::GeoBoundingBox;
use crate::bathymetry::Bathymetry;

/// GeoTIFF ModelPixelScale tag
const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
/// GeoTIFF ModelTiepoint tag
const TAG_MODEL_TIEPOINT: u16 = 33922;

/// Error type for GeoTIFF operations.
#[derive(Debug, Error)]
pub enum GeoTiffError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF decoding error
    #[error("TIFF error: {0}")]
    Tiff(String),

    /// Missing or invalid geotransform tags
    #[error("Missing geotransform: {0}")]
    MissingGeotransform(String),

    /// Raster size does not match its declared dimensions
    #[error("Raster has {actual} samples, expected {expected}")]
    SizeMismatch {
        /// Samples implied by width × height
        expected: usize,
        /// Samples actually decoded
        actual: usize,
    },
}

impl From<tiff::TiffError> for GeoTiffError {
    fn from(e: tiff::TiffError) -> Self {
        GeoTiffError::Tiff(e.to_string())
    }
}

/// GeoTIFF-based bathymetry provider.
///
/// Row 0 is the northern edge. Depth values are negative below sea level;
/// positive values are land elevations and are kept as-is so the slope
/// criterion can clip them itself.
pub struct GeoTiffBathymetry {
    /// Row-major depth samples, stored as f32 for memory efficiency
    depths: Vec<f32>,
    /// Geographic bounding box
    bbox: GeoBoundingBox,
    /// Width in pixels
    width: usize,
    /// Height in pixels
    height: usize,
    /// No data value
    nodata: f32,
    /// Value returned for nodata samples and points outside the raster
    fill: f64,
}

impl GeoTiffBathymetry {
    /// Load bathymetry from a GeoTIFF file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GeoTiffError> {
        Self::load_with_bbox(path, None)
    }

    /// Load bathymetry with an optional bounding box hint.
    ///
    /// If the GeoTIFF lacks ModelPixelScale/ModelTiepoint tags, the hint is used.
    pub fn load_with_bbox<P: AsRef<Path>>(
        path: P,
        bbox_hint: Option<GeoBoundingBox>,
    ) -> Result<Self, GeoTiffError> {
        let file = File::open(&path)?;
        let mut decoder = Decoder::new(file)?;

        let (width, height) = decoder.dimensions()?;

        let pixel_scale = decoder.get_tag_f64_vec(Tag::Unknown(TAG_MODEL_PIXEL_SCALE)).ok();
        let model_tiepoint = decoder.get_tag_f64_vec(Tag::Unknown(TAG_MODEL_TIEPOINT)).ok();

        let bbox = match (pixel_scale, model_tiepoint) {
            // ModelTiepoint: [I, J, K, X, Y, Z], ModelPixelScale: [ScaleX, ScaleY, ScaleZ]
            (Some(scale), Some(tiepoint)) if tiepoint.len() >= 6 && scale.len() >= 2 => {
                let origin_lon = tiepoint[3];
                let origin_lat = tiepoint[4];
                GeoBoundingBox::new(
                    origin_lon,
                    origin_lat - height as f64 * scale[1],
                    origin_lon + width as f64 * scale[0],
                    origin_lat,
                )
            }
            _ => bbox_hint.ok_or_else(|| {
                GeoTiffError::MissingGeotransform(
                    "No GeoTIFF geotransform found and no bbox hint provided".to_string(),
                )
            })?,
        };

        let depths: Vec<f32> = match decoder.read_image()? {
            DecodingResult::U8(data) => data.into_iter().map(|v| v as f32).collect(),
            DecodingResult::U16(data) => data.into_iter().map(|v| v as f32).collect(),
            DecodingResult::U32(data) => data.into_iter().map(|v| v as f32).collect(),
            DecodingResult::U64(data) => data.into_iter().map(|v| v as f32).collect(),
            DecodingResult::F32(data) => data,
            DecodingResult::F64(data) => data.into_iter().map(|v| v as f32).collect(),
            DecodingResult::I8(data) => data.into_iter().map(|v| v as f32).collect(),
            DecodingResult::I16(data) => data.into_iter().map(|v| v as f32).collect(),
            DecodingResult::I32(data) => data.into_iter().map(|v| v as f32).collect(),
            DecodingResult::I64(data) => data.into_iter().map(|v| v as f32).collect(),
        };

        Self::from_raster(depths, width as usize, height as usize, bbox)
    }

    /// Build from an in-memory row-major raster (row 0 = north).
    pub fn from_raster(
        depths: Vec<f32>,
        width: usize,
        height: usize,
        bbox: GeoBoundingBox,
    ) -> Result<Self, GeoTiffError> {
        if depths.len() != width * height || width == 0 || height == 0 {
            return Err(GeoTiffError::SizeMismatch {
                expected: width * height,
                actual: depths.len(),
            });
        }

        Ok(Self {
            depths,
            bbox,
            width,
            height,
            nodata: -9999.0,
            fill: 0.0,
        })
    }

    /// Set the no-data value.
    pub fn with_nodata(mut self, nodata: f32) -> Self {
        self.nodata = nodata;
        self
    }

    /// Set the value returned for nodata samples and points off the raster.
    pub fn with_fill(mut self, fill: f64) -> Self {
        self.fill = fill;
        self
    }

    /// Get the dimensions (width, height) in pixels.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Pixel-centre fractional coordinates (col, row), clamped to the raster.
    fn pixel_frac(&self, lon: f64, lat: f64) -> (f64, f64) {
        let col = (lon - self.bbox.min_lon) / (self.bbox.max_lon - self.bbox.min_lon)
            * self.width as f64
            - 0.5;
        let row = (self.bbox.max_lat - lat) / (self.bbox.max_lat - self.bbox.min_lat)
            * self.height as f64
            - 0.5;
        (
            col.clamp(0.0, (self.width - 1) as f64),
            row.clamp(0.0, (self.height - 1) as f64),
        )
    }

    fn sample(&self, row: usize, col: usize) -> Option<f64> {
        let v = self.depths[row * self.width + col];
        if v.is_finite() && (v - self.nodata).abs() > 0.01 {
            Some(v as f64)
        } else {
            None
        }
    }

    /// Depth by bilinear interpolation, or `None` off the raster or next to nodata.
    pub fn get_depth_bilinear(&self, lon: f64, lat: f64) -> Option<f64> {
        if !self.bbox.contains(lon, lat) {
            return None;
        }
        let (col_frac, row_frac) = self.pixel_frac(lon, lat);

        let row0 = row_frac.floor() as usize;
        let col0 = col_frac.floor() as usize;
        let row1 = (row0 + 1).min(self.height - 1);
        let col1 = (col0 + 1).min(self.width - 1);

        let d00 = self.sample(row0, col0)?;
        let d01 = self.sample(row0, col1)?;
        let d10 = self.sample(row1, col0)?;
        let d11 = self.sample(row1, col1)?;

        let t = row_frac - row0 as f64;
        let s = col_frac - col0 as f64;

        Some(
            (1.0 - t) * (1.0 - s) * d00
                + (1.0 - t) * s * d01
                + t * (1.0 - s) * d10
                + t * s * d11,
        )
    }

    /// Get statistics about the bathymetry data.
    pub fn statistics(&self) -> BathymetryStatistics {
        let mut valid_count = 0usize;
        let mut land_count = 0usize;
        let mut sum = 0.0f64;
        let mut min_depth = f64::INFINITY;
        let mut max_depth = f64::NEG_INFINITY;

        for row in 0..self.height {
            for col in 0..self.width {
                match self.sample(row, col) {
                    Some(d) if d > 0.0 => land_count += 1,
                    Some(d) => {
                        valid_count += 1;
                        sum += d;
                        min_depth = min_depth.min(d);
                        max_depth = max_depth.max(d);
                    }
                    None => {}
                }
            }
        }

        BathymetryStatistics {
            width: self.width,
            height: self.height,
            valid_count,
            nodata_count: self.width * self.height - valid_count - land_count,
            land_count,
            min_depth: if min_depth.is_finite() { min_depth } else { 0.0 },
            max_depth: if max_depth.is_finite() { max_depth } else { 0.0 },
            mean_depth: if valid_count > 0 {
                sum / valid_count as f64
            } else {
                0.0
            },
            bbox: self.bbox,
        }
    }
}

impl Bathymetry for GeoTiffBathymetry {
    fn depth(&self, lon: f64, lat: f64) -> f64 {
        self.get_depth_bilinear(lon, lat).unwrap_or(self.fill)
    }

    fn bbox(&self) -> Option<GeoBoundingBox> {
        Some(self.bbox)
    }
}

/// Statistics about a bathymetry dataset.
#[derive(Debug, Clone)]
pub struct BathymetryStatistics {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
    /// Number of valid water cells
    pub valid_count: usize,
    /// Number of nodata cells
    pub nodata_count: usize,
    /// Number of land cells (positive elevation)
    pub land_count: usize,
    /// Minimum depth (most negative, deepest)
    pub min_depth: f64,
    /// Maximum depth (least negative, shallowest water)
    pub max_depth: f64,
    /// Mean depth
    pub mean_depth: f64,
    /// Geographic bounding box
    pub bbox: GeoBoundingBox,
}

impl fmt::Display for BathymetryStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bathymetry Statistics:")?;
        writeln!(f, "  Dimensions: {}x{} pixels", self.width, self.height)?;
        writeln!(f, "  Valid water cells: {}", self.valid_count)?;
        writeln!(f, "  Land cells: {}", self.land_count)?;
        writeln!(f, "  NoData cells: {}", self.nodata_count)?;
        writeln!(
            f,
            "  Depth range: {:.1} to {:.1} m",
            self.min_depth, self.max_depth
        )?;
        writeln!(f, "  Mean depth: {:.1} m", self.mean_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp() -> GeoTiffBathymetry {
        // 2x2 raster over [0, 2] x [0, 2], row 0 is north
        let bbox = GeoBoundingBox::new(0.0, 0.0, 2.0, 2.0);
        GeoTiffBathymetry::from_raster(vec![-10.0, -20.0, -10.0, -20.0], 2, 2, bbox).unwrap()
    }

    #[test]
    fn test_bilinear_between_pixel_centres() {
        let bathy = ramp();
        // Pixel centres at lon 0.5 and 1.5
        assert_relative_eq!(bathy.depth(0.5, 1.0), -10.0);
        assert_relative_eq!(bathy.depth(1.0, 1.0), -15.0);
        assert_relative_eq!(bathy.depth(1.5, 1.0), -20.0);
    }

    #[test]
    fn test_outside_returns_fill() {
        let bathy = ramp().with_fill(5.0);
        assert_relative_eq!(bathy.depth(10.0, 10.0), 5.0);
    }

    #[test]
    fn test_nodata_returns_fill() {
        let bbox = GeoBoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let bathy = GeoTiffBathymetry::from_raster(vec![-9999.0], 1, 1, bbox).unwrap();
        assert_relative_eq!(bathy.depth(0.5, 0.5), 0.0);
        assert_eq!(bathy.statistics().nodata_count, 1);
    }

    #[test]
    fn test_size_mismatch() {
        let bbox = GeoBoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert!(GeoTiffBathymetry::from_raster(vec![0.0; 3], 2, 2, bbox).is_err());
    }
}
