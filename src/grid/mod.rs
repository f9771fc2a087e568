//! Structured lon/lat evaluation grid.
//!
//! Every criterion layer is sampled on the same [`Grid`] and stored as a
//! [`GridField`]; layers are never resampled onto one another.
//!
//! # Example
//!
//! ```
//! use sizefield_rs::grid::Grid;
//! use sizefield_rs::io::GeoBoundingBox;
//!
//! let bbox = GeoBoundingBox::new(5.0, 60.0, 5.5, 60.2);
//! let grid = Grid::from_bbox(&bbox, None, 500.0).unwrap();
//!
//! // Spacing resolves h0 at the mean latitude
//! let lat = bbox.mean_lat().to_radians();
//! assert!((grid.dx() * 111_000.0 * lat.cos() - 500.0).abs() < 1e-6);
//! ```

mod builder;
mod field;
mod gradient;

pub use builder::Grid;
pub use field::GridField;
pub use gradient::{GradientSpacing, gradient, gradient_magnitude};
