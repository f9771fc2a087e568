//! Strongly-typed value types shared across the sizing pipeline.
//!
//! - **GridShape**: node counts of the structured evaluation grid
//! - **DepthBand**: half-open depth interval used by banded criteria and caps
//!
//! # Example
//!
//! ```
//! use sizefield_rs::types::{DepthBand, GridShape};
//!
//! let shape = GridShape::new(120, 80);
//! assert_eq!(shape.len(), 9600);
//!
//! // Shelf waters between 200 m and 10 m deep
//! let band = DepthBand::new(-10.0, -200.0);
//! assert!(band.contains(-50.0));
//! assert!(!band.contains(-5.0));
//! ```

mod depth_band;
mod shape;

pub use depth_band::DepthBand;
pub use shape::GridShape;
