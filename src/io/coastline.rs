//! GSHHS coastline reader.
//!
//! Loads land polygons from GSHHS (Global Self-consistent Hierarchical
//! High-resolution Geography) shapefiles. The loaded polygons become the
//! land part of a [`PolygonBoundary`], whose signed distance drives the
//! distance and feature-size criteria.
//!
//! # Example
//!
//! ```ignore
//! use sizefield_rs::io::{CoastlineData, GeoBoundingBox};
//!
//! let bbox = GeoBoundingBox::new(8.0, 63.5, 9.5, 64.0);
//! let coastline = CoastlineData::load("data/GSHHS_f_L1.shp", &bbox)?;
//! let boundary = coastline.to_boundary();
//! ```

use std::fmt;
use std::path::Path;

use geo::{Contains, Coord, LineString, MultiPolygon, Point, Polygon};
use shapefile::{Reader, Shape};
use thiserror::Error;

use super::projection::GeoBoundingBox;
use crate::geometry::PolygonBoundary;

/// Error type for coastline operations.
#[derive(Debug, Error)]
pub enum CoastlineError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shapefile parsing error
    #[error("Shapefile error: {0}")]
    Shapefile(String),
}

impl From<shapefile::Error> for CoastlineError {
    fn from(e: shapefile::Error) -> Self {
        CoastlineError::Shapefile(e.to_string())
    }
}

/// Land polygons clipped to a region of interest.
pub struct CoastlineData {
    /// Land mass polygons (GSHHS level 1 = ocean/land boundary)
    land_polygons: MultiPolygon<f64>,
    /// Region the polygons were selected for
    bbox: GeoBoundingBox,
}

impl CoastlineData {
    /// Load coastline data from a GSHHS shapefile.
    ///
    /// Only rings with at least one vertex inside `bbox` are kept.
    pub fn load<P: AsRef<Path>>(path: P, bbox: &GeoBoundingBox) -> Result<Self, CoastlineError> {
        let mut reader = Reader::from_path(path)?;
        let mut rings = Vec::new();

        for result in reader.iter_shapes_and_records() {
            let (shape, _record) = result?;

            if let Shape::Polygon(polygon) = shape {
                for ring in polygon.rings() {
                    let coords: Vec<Coord<f64>> = ring
                        .points()
                        .iter()
                        .map(|p| Coord { x: p.x, y: p.y })
                        .collect();
                    rings.push(coords);
                }
            }
        }

        let data = Self::from_rings(rings, bbox);
        log::info!(
            "Loaded {} coastline polygons inside lon [{:.3}, {:.3}], lat [{:.3}, {:.3}]",
            data.polygon_count(),
            bbox.min_lon,
            bbox.max_lon,
            bbox.min_lat,
            bbox.max_lat
        );
        Ok(data)
    }

    /// Build coastline data from in-memory land rings, keeping those that touch `bbox`.
    pub fn from_rings(rings: Vec<Vec<Coord<f64>>>, bbox: &GeoBoundingBox) -> Self {
        let polygons = rings
            .into_iter()
            .filter(|coords| coords.len() >= 3 && coords_intersect_bbox(coords, bbox))
            .map(|coords| Polygon::new(LineString::from(coords), vec![]))
            .collect();

        Self {
            land_polygons: MultiPolygon(polygons),
            bbox: *bbox,
        }
    }

    /// Check if a point lies on land.
    pub fn is_land(&self, lon: f64, lat: f64) -> bool {
        self.land_polygons.contains(&Point::new(lon, lat))
    }

    /// Land polygons.
    pub fn land_polygons(&self) -> &MultiPolygon<f64> {
        &self.land_polygons
    }

    /// Get the bounding box of this coastline data.
    pub fn bbox(&self) -> &GeoBoundingBox {
        &self.bbox
    }

    /// Get the number of polygons loaded.
    pub fn polygon_count(&self) -> usize {
        self.land_polygons.0.len()
    }

    /// Water domain: the bounding box minus the land polygons.
    pub fn to_boundary(&self) -> PolygonBoundary {
        PolygonBoundary::from_bbox_and_land(self.bbox, self.land_polygons.clone())
    }

    /// Get statistics about the coastline data.
    pub fn statistics(&self) -> CoastlineStatistics {
        let total_vertices = self
            .land_polygons
            .0
            .iter()
            .map(|p| p.exterior().0.len() + p.interiors().iter().map(|r| r.0.len()).sum::<usize>())
            .sum();

        CoastlineStatistics {
            polygon_count: self.polygon_count(),
            total_vertices,
            bbox: self.bbox,
        }
    }
}

/// Statistics about coastline data.
#[derive(Debug, Clone)]
pub struct CoastlineStatistics {
    /// Number of land polygons
    pub polygon_count: usize,
    /// Total number of vertices
    pub total_vertices: usize,
    /// Geographic bounding box
    pub bbox: GeoBoundingBox,
}

impl fmt::Display for CoastlineStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Coastline Statistics:")?;
        writeln!(f, "  Polygons: {}", self.polygon_count)?;
        writeln!(f, "  Total vertices: {}", self.total_vertices)?;
        writeln!(
            f,
            "  Bounding box: lon [{:.4}, {:.4}], lat [{:.4}, {:.4}]",
            self.bbox.min_lon, self.bbox.max_lon, self.bbox.min_lat, self.bbox.max_lat
        )
    }
}

/// Check if any coordinates intersect the bounding box.
fn coords_intersect_bbox(coords: &[Coord<f64>], bbox: &GeoBoundingBox) -> bool {
    coords.iter().any(|c| bbox.contains(c.x, c.y))
}
