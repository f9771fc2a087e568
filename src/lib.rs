//! # sizefield-rs
//!
//! Mesh sizing fields for coastal ocean mesh generation.
//!
//! A sizing field gives the target element size at every point of a
//! geographic domain. It is built on a structured evaluation grid from
//! independent physical criteria:
//! - Distance to the coastline
//! - Feature size (channel width from the medial axis)
//! - Tidal wavelength
//! - Bathymetric slope, optionally filtered
//! - Imprinted channel centrelines
//!
//! The layers are combined by minimum, bounded, made CFL-compliant for a
//! target timestep, gradient limited, and wrapped as a bilinear interpolant.
//!
//! Coordinates are `(lon, lat)` in degrees throughout. Depth is negative
//! below sea level.

pub mod bathymetry;
pub mod config;
pub mod criteria;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod io;
pub mod sizing;
pub mod types;

// Re-export main types for convenience
pub use bathymetry::{Bathymetry, ConstantBathymetry, FnBathymetry};
pub use config::{
    ChannelParams, Criterion, CriterionKind, DistanceParams, FeatureSizeParams, FilterBand,
    FilterMode, MaxElementBand, ResolutionBand, SizingConfig, SlopeParams, WavelengthParams,
};
pub use criteria::Channel;
pub use error::{Result, SizingError};
pub use geometry::{DistanceEvaluator, FnDistance, NearestNeighbor, PointIndex, PolygonBoundary};
pub use grid::{Grid, GridField};
pub use io::{CoastlineData, GeoBoundingBox, GeoTiffBathymetry, read_channel_shapefile};
pub use sizing::{
    EnabledCriteria, GradingReport, SizingDiagnostics, SizingField, SizingInputs,
    SizingStatistics, build_sizing_field,
};
pub use types::{DepthBand, GridShape};
