//! Grid construction and node geometry.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::field::GridField;
use crate::error::{Result, SizingError};
use crate::io::{GeoBoundingBox, haversine_m, meters_per_degree};
use crate::types::GridShape;

/// Upper bound on grid nodes, guarding against h0 given in degrees by mistake.
const MAX_GRID_NODES: usize = 400_000_000;

/// Uniform lon/lat grid.
///
/// Node `(i, j)` sits at `(lon0 + i·dx, lat0 + j·dy)`. The spacing is fixed
/// for the lifetime of a sizing field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    lon0: f64,
    lat0: f64,
    dx: f64,
    dy: f64,
    shape: GridShape,
}

impl Grid {
    /// Create a grid from its origin, spacing (degrees) and shape.
    pub fn new(lon0: f64, lat0: f64, dx: f64, dy: f64, shape: GridShape) -> Self {
        assert!(dx > 0.0 && dy > 0.0, "grid spacing must be positive");
        Self {
            lon0,
            lat0,
            dx,
            dy,
            shape,
        }
    }

    /// Build the evaluation grid covering `bbox`.
    ///
    /// The spacing satisfies `spacing · 111 000 · cos(lat_mean) = h0`, with
    /// `lat_mean` the mean latitude of the box. `origin` defaults to the
    /// south-west corner.
    pub fn from_bbox(bbox: &GeoBoundingBox, origin: Option<(f64, f64)>, h0: f64) -> Result<Self> {
        if !bbox.is_valid() {
            return Err(SizingError::config(format!(
                "invalid bounding box: lon [{}, {}], lat [{}, {}]",
                bbox.min_lon, bbox.max_lon, bbox.min_lat, bbox.max_lat
            )));
        }
        if !(h0 > 0.0 && h0.is_finite()) {
            return Err(SizingError::config(format!("h0 must be positive, got {}", h0)));
        }

        let (lon0, lat0) = origin.unwrap_or((bbox.min_lon, bbox.min_lat));
        if lon0 > bbox.max_lon || lat0 > bbox.max_lat {
            return Err(SizingError::config(format!(
                "grid origin ({}, {}) lies beyond the bounding box",
                lon0, lat0
            )));
        }

        let spacing = h0 / meters_per_degree(bbox.mean_lat());
        let nx = node_count(bbox.max_lon - lon0, spacing);
        let ny = node_count(bbox.max_lat - lat0, spacing);

        if nx.saturating_mul(ny) > MAX_GRID_NODES {
            return Err(SizingError::config(format!(
                "grid of {}×{} nodes is too large; is h0 ({}) in metres?",
                nx, ny, h0
            )));
        }

        let grid = Self::new(lon0, lat0, spacing, spacing, GridShape::new(nx, ny));
        log::info!(
            "Evaluation grid {} nodes, spacing {:.6}° from origin ({:.4}, {:.4})",
            grid.shape,
            spacing,
            lon0,
            lat0
        );
        Ok(grid)
    }

    /// Grid shape.
    #[inline]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Nodes along longitude.
    #[inline]
    pub fn nx(&self) -> usize {
        self.shape.nx()
    }

    /// Nodes along latitude.
    #[inline]
    pub fn ny(&self) -> usize {
        self.shape.ny()
    }

    /// Total node count.
    #[inline]
    pub fn len(&self) -> usize {
        self.shape.len()
    }

    /// Always false.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Longitude spacing (degrees).
    #[inline]
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Latitude spacing (degrees).
    #[inline]
    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Origin (lon0, lat0).
    pub fn origin(&self) -> (f64, f64) {
        (self.lon0, self.lat0)
    }

    /// Longitude of column `i`.
    #[inline]
    pub fn lon(&self, i: usize) -> f64 {
        self.lon0 + i as f64 * self.dx
    }

    /// Latitude of row `j`.
    #[inline]
    pub fn lat(&self, j: usize) -> f64 {
        self.lat0 + j as f64 * self.dy
    }

    /// Coordinates of the node at flat index `idx`.
    #[inline]
    pub fn node(&self, idx: usize) -> (f64, f64) {
        let (i, j) = self.shape.unflatten(idx);
        (self.lon(i), self.lat(j))
    }

    /// Extent actually covered by the nodes.
    pub fn bbox(&self) -> GeoBoundingBox {
        GeoBoundingBox::new(
            self.lon0,
            self.lat0,
            self.lon(self.nx() - 1),
            self.lat(self.ny() - 1),
        )
    }

    /// Fractional (column, row) position of a point, unclamped.
    #[inline]
    pub fn fractional_index(&self, lon: f64, lat: f64) -> (f64, f64) {
        ((lon - self.lon0) / self.dx, (lat - self.lat0) / self.dy)
    }

    /// Nearest node (column, row), clamped to the grid.
    pub fn nearest_index(&self, lon: f64, lat: f64) -> (usize, usize) {
        let (fi, fj) = self.fractional_index(lon, lat);
        let i = fi.round().clamp(0.0, (self.nx() - 1) as f64) as usize;
        let j = fj.round().clamp(0.0, (self.ny() - 1) as f64) as usize;
        (i, j)
    }

    /// Evaluate `f(lon, lat)` at every node.
    pub fn sample<F>(&self, f: F) -> GridField
    where
        F: Fn(f64, f64) -> f64 + Sync,
    {
        self.sample_nodes(|_, lon, lat| f(lon, lat))
    }

    /// Evaluate `f(flat_index, lon, lat)` at every node.
    pub fn sample_nodes<F>(&self, f: F) -> GridField
    where
        F: Fn(usize, f64, f64) -> f64 + Sync,
    {
        let eval = |idx: usize| {
            let (lon, lat) = self.node(idx);
            f(idx, lon, lat)
        };

        #[cfg(feature = "parallel")]
        let values: Vec<f64> = (0..self.len()).into_par_iter().map(eval).collect();
        #[cfg(not(feature = "parallel"))]
        let values: Vec<f64> = (0..self.len()).map(eval).collect();

        GridField::from_vec(self.shape, values)
    }

    /// Latitude of every node, row-major.
    pub fn latitudes(&self) -> GridField {
        self.sample(|_, lat| lat)
    }

    /// Planar spacing (m) of row `j`: haversine length of one cell along
    /// longitude and along latitude.
    pub fn spacing_m(&self, j: usize) -> (f64, f64) {
        let lat = self.lat(j);
        (
            haversine_m(self.lon0, lat, self.lon0 + self.dx, lat),
            haversine_m(self.lon0, lat, self.lon0, lat + self.dy),
        )
    }

    /// Mean planar spacing (m) over the grid, used to size filter kernels.
    pub fn mean_spacing_m(&self) -> f64 {
        let total: f64 = (0..self.ny())
            .map(|j| {
                let (sx, sy) = self.spacing_m(j);
                0.5 * (sx + sy)
            })
            .sum();
        total / self.ny() as f64
    }

    /// Convert a degree-valued field to metres using each node's latitude.
    pub fn to_meters(&self, field: &GridField) -> GridField {
        self.convert(field, |v, lat| v * meters_per_degree(lat))
    }

    /// Convert a metre-valued field to degrees using each node's latitude.
    pub fn to_degrees(&self, field: &GridField) -> GridField {
        self.convert(field, |v, lat| v / meters_per_degree(lat))
    }

    fn convert(&self, field: &GridField, op: impl Fn(f64, f64) -> f64) -> GridField {
        debug_assert_eq!(field.shape(), self.shape);
        let values = field
            .values()
            .iter()
            .enumerate()
            .map(|(idx, &v)| {
                let j = idx / self.nx();
                op(v, self.lat(j))
            })
            .collect();
        GridField::from_vec(self.shape, values)
    }
}

/// Nodes needed to span `extent` with `spacing`, including both ends.
fn node_count(extent: f64, spacing: f64) -> usize {
    let cells = (extent / spacing - 1e-9).ceil().max(0.0) as usize;
    cells + 1
}
