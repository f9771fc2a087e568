//! Structured grid shape.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of nodes of a structured grid in each direction.
///
/// Nodes are stored row-major: node `(i, j)` (column `i`, row `j`) lives at
/// flat index `j * nx + i`.
///
/// # Example
///
/// ```
/// use sizefield_rs::types::GridShape;
///
/// let shape = GridShape::new(4, 3);
/// assert_eq!(shape.flat_index(1, 2), 9);
/// assert_eq!(shape.unflatten(9), (1, 2));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    /// Number of nodes along longitude
    nx: usize,
    /// Number of nodes along latitude
    ny: usize,
}

impl GridShape {
    /// Create a new grid shape.
    ///
    /// # Panics
    ///
    /// Panics if either `nx` or `ny` is zero.
    pub fn new(nx: usize, ny: usize) -> Self {
        assert!(nx > 0, "nx must be positive, got {}", nx);
        assert!(ny > 0, "ny must be positive, got {}", ny);
        Self { nx, ny }
    }

    /// Number of nodes along longitude.
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of nodes along latitude.
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Total number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    /// Always false: a shape has at least one node.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Row-major flat index of node `(i, j)`.
    #[inline]
    pub fn flat_index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.nx && j < self.ny);
        j * self.nx + i
    }

    /// Inverse of [`flat_index`](Self::flat_index).
    #[inline]
    pub fn unflatten(&self, idx: usize) -> (usize, usize) {
        (idx % self.nx, idx / self.nx)
    }

    /// Return as tuple (nx, ny).
    #[inline]
    pub fn as_tuple(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.nx, self.ny)
    }
}

impl From<(usize, usize)> for GridShape {
    fn from((nx, ny): (usize, usize)) -> Self {
        Self::new(nx, ny)
    }
}
