//! Boundary geometry and spatial search.
//!
//! - [`DistanceEvaluator`]: signed distance to the domain boundary
//! - [`PolygonBoundary`]: polygon-backed evaluator (water extent minus land)
//! - [`NearestNeighbor`]: point search used by the medial-axis and channel criteria

mod polygon;
mod spatial_index;
mod traits;

pub use polygon::PolygonBoundary;
pub use spatial_index::{NearestNeighbor, PointIndex};
pub use traits::{DistanceEvaluator, FnDistance};
