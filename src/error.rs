//! Error types for sizing-field construction.

use thiserror::Error;

use crate::io::{ChannelFileError, CoastlineError, GeoTiffError};

/// Errors that abort construction of a sizing field.
///
/// Per-node anomalies (oversized channel stencils, nodes without any
/// defined criterion) are not errors: they are handled locally and
/// reported through [`SizingDiagnostics`](crate::sizing::SizingDiagnostics).
#[derive(Debug, Error)]
pub enum SizingError {
    /// Invalid parameters or a criterion missing its collaborator data
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Automatic CFL timestep requested without a reference size layer
    #[error("Automatic timestep requires the distance or feature-size criterion to be enabled")]
    MissingCriterion,

    /// Gradient limiter exhausted its iteration budget
    #[error(
        "Gradient limiting did not converge after {iterations} iterations (max change {residual:.3e} m)"
    )]
    Convergence {
        /// Iterations performed
        iterations: usize,
        /// Largest size change in the final iteration (m)
        residual: f64,
    },

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialisation error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Coastline loading error
    #[error(transparent)]
    Coastline(#[from] CoastlineError),

    /// Bathymetry loading error
    #[error(transparent)]
    GeoTiff(#[from] GeoTiffError),

    /// Channel loading error
    #[error(transparent)]
    ChannelFile(#[from] ChannelFileError),
}

impl SizingError {
    /// Shorthand for a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        SizingError::Configuration(msg.into())
    }
}

/// Result alias for sizing operations.
pub type Result<T> = std::result::Result<T, SizingError>;
