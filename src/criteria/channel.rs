//! Channel imprinting criterion.
//!
//! Supplied thalweg polylines are imprinted onto the grid: around each
//! vertex a square neighbourhood, sized from a width estimated with the
//! angle of repose, receives `|depth| / divisor`.

use serde::{Deserialize, Serialize};

use crate::bathymetry::Bathymetry;
use crate::config::ChannelParams;
use crate::geometry::DistanceEvaluator;
use crate::grid::{Grid, GridField};

/// Neighbourhoods wider than this many cells per side are skipped.
pub const MAX_STENCIL_SIDE: usize = 100;

/// A channel centreline: ordered `(lon, lat)` vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Vertices
    pub points: Vec<(f64, f64)>,
}

impl Channel {
    /// Create a channel from its vertices.
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the channel has no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A channel vertex whose neighbourhood exceeded [`MAX_STENCIL_SIDE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkippedChannelPoint {
    /// Index of the channel in the input list
    pub channel: usize,
    /// Index of the vertex within the channel
    pub vertex: usize,
    /// Vertex longitude
    pub lon: f64,
    /// Vertex latitude
    pub lat: f64,
    /// Requested stencil side (cells)
    pub stencil_side: usize,
}

/// Channel layer plus the vertices that were skipped.
#[derive(Debug, Clone)]
pub struct ChannelLayer {
    /// Size (degrees), `NaN` away from channels
    pub layer: GridField,
    /// Vertices skipped for oversized neighbourhoods
    pub skipped: Vec<SkippedChannelPoint>,
}

/// Estimated channel half-width (m) for a depth and side-slope angle.
pub fn half_width(depth: f64, repose_angle_deg: f64) -> f64 {
    depth.abs() / repose_angle_deg.to_radians().tan()
}

/// Imprint channels onto the grid.
///
/// Channels with no vertex inside the domain are dropped, as are individual
/// vertices outside it. Overlapping neighbourhoods keep the smaller size.
/// Sizes below `floor` (m) are raised to it.
pub fn channel_layer(
    grid: &Grid,
    boundary: &dyn DistanceEvaluator,
    bathymetry: &dyn Bathymetry,
    channels: &[Channel],
    h0: f64,
    floor: f64,
    params: &ChannelParams,
) -> ChannelLayer {
    let mut meters = GridField::nan(grid.shape());
    let mut skipped = Vec::new();
    let mut imprinted = 0usize;

    for (c, channel) in channels.iter().enumerate() {
        let inside: Vec<bool> = channel
            .points
            .iter()
            .map(|&(lon, lat)| boundary.is_inside(lon, lat))
            .collect();
        if !inside.iter().any(|&b| b) {
            log::debug!("Channel {} lies outside the domain, dropped", c);
            continue;
        }

        for (v, &(lon, lat)) in channel.points.iter().enumerate() {
            if !inside[v] {
                continue;
            }

            let depth = bathymetry.depth(lon, lat);
            let width = 2.0 * half_width(depth, params.repose_angle_deg);
            let radius = (width / h0).ceil() as usize;
            let side = 2 * radius + 1;
            if side > MAX_STENCIL_SIDE {
                log::warn!(
                    "Channel {} vertex {} at ({:.4}, {:.4}): stencil of {} cells exceeds {}, skipped",
                    c,
                    v,
                    lon,
                    lat,
                    side,
                    MAX_STENCIL_SIDE
                );
                skipped.push(SkippedChannelPoint {
                    channel: c,
                    vertex: v,
                    lon,
                    lat,
                    stencil_side: side,
                });
                continue;
            }

            // One size for the whole stencil, from the depth at the vertex
            let size = depth.abs() / params.divisor;
            let (ci, cj) = grid.nearest_index(lon, lat);
            let (i0, i1) = (ci.saturating_sub(radius), (ci + radius).min(grid.nx() - 1));
            let (j0, j1) = (cj.saturating_sub(radius), (cj + radius).min(grid.ny() - 1));

            for j in j0..=j1 {
                for i in i0..=i1 {
                    let current = meters.get(i, j);
                    if current.is_nan() || size < current {
                        meters.set(i, j, size);
                    }
                }
            }
            imprinted += 1;
        }
    }

    meters.map_inplace(|h| if h.is_nan() { h } else { h.max(floor) });
    let layer = grid.to_degrees(&meters);

    log::debug!(
        "Channel layer: {} vertices imprinted, {} skipped, {} nodes assigned",
        imprinted,
        skipped.len(),
        layer.count_defined()
    );

    ChannelLayer { layer, skipped }
}
