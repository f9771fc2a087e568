//! Combination, bounding, CFL, grading and interpolation of criterion layers.
//!
//! [`build_sizing_field`] runs the whole pipeline; the individual stages are
//! public for callers assembling their own.
//!
//! # Example
//!
//! ```
//! use sizefield_rs::config::{Criterion, DistanceParams, SizingConfig};
//! use sizefield_rs::geometry::FnDistance;
//! use sizefield_rs::io::GeoBoundingBox;
//! use sizefield_rs::sizing::{SizingInputs, build_sizing_field};
//!
//! // Straight coastline along lon = 0, water to the east
//! let coast = FnDistance::new(GeoBoundingBox::new(0.0, 0.0, 0.1, 0.05), |lon, _| -lon);
//! let config = SizingConfig::new(200.0, 2000.0, 0.2)
//!     .with_criterion(Criterion::Distance(DistanceParams::new(0.1)));
//!
//! let field = build_sizing_field(&config, &SizingInputs::new(&coast)).unwrap();
//! assert!(field.eval_meters(0.0, 0.02) < field.eval_meters(0.1, 0.02));
//! ```

pub mod bounds;
pub mod cfl;
pub mod combine;
mod diagnostics;
pub mod grading;
mod interpolant;
mod pipeline;

pub use bounds::{NEARSHORE_DISTANCE_M, apply_bounds};
pub use cfl::{STABILITY_FRACTION, auto_timestep, enforce_cfl, wave_speed};
pub use combine::{Combined, combine_layers};
pub use diagnostics::{EnabledCriteria, SizingDiagnostics};
pub use grading::{GradingReport, grade_violations, limit_gradient};
pub use interpolant::{SizingField, SizingStatistics};
pub use pipeline::{SizingInputs, build_sizing_field};
