//! I/O utilities for the geographic inputs of the sizing pipeline.
//!
//! This module provides:
//! - **Coastline data**: Land polygons from GSHHS shapefiles
//! - **GeoTIFF bathymetry**: Depth rasters usable as a [`Bathymetry`](crate::bathymetry::Bathymetry)
//! - **Channel polylines**: Thalweg centrelines from polyline shapefiles
//! - **Projection helpers**: Bounding boxes and degree/metre conversions
//!
//! # Conventions
//!
//! Coordinates are always passed as `(lon, lat)` in degrees. Depths are
//! negative below sea level.

mod channels;
mod coastline;
mod geotiff;
mod projection;

pub use channels::{ChannelFileError, read_channel_shapefile};
pub use coastline::{CoastlineData, CoastlineError, CoastlineStatistics};
pub use geotiff::{BathymetryStatistics, GeoTiffBathymetry, GeoTiffError};
pub use projection::{
    EARTH_RADIUS, GeoBoundingBox, METERS_PER_DEGREE, degrees_to_meters, haversine_m,
    meters_per_degree, meters_to_degrees,
};
