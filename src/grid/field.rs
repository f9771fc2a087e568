//! Scalar layers over the evaluation grid.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::types::GridShape;

/// Row-major scalar values, one per grid node.
///
/// `NaN` marks nodes where a criterion does not apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridField {
    shape: GridShape,
    values: Vec<f64>,
}

impl GridField {
    /// Field with every node set to `value`.
    pub fn filled(shape: GridShape, value: f64) -> Self {
        Self {
            shape,
            values: vec![value; shape.len()],
        }
    }

    /// Field with every node undefined.
    pub fn nan(shape: GridShape) -> Self {
        Self::filled(shape, f64::NAN)
    }

    /// Wrap existing row-major values.
    ///
    /// # Panics
    ///
    /// Panics if `values.len()` does not match the shape.
    pub fn from_vec(shape: GridShape, values: Vec<f64>) -> Self {
        assert_eq!(
            values.len(),
            shape.len(),
            "field has {} values for a {} grid",
            values.len(),
            shape
        );
        Self { shape, values }
    }

    /// Shape of the field.
    #[inline]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Row-major values.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Mutable row-major values.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Consume into the raw values.
    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }

    /// Value at column `i`, row `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[self.shape.flat_index(i, j)]
    }

    /// Set the value at column `i`, row `j`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        let idx = self.shape.flat_index(i, j);
        self.values[idx] = value;
    }

    /// Apply `op` to every value in place.
    pub fn map_inplace(&mut self, op: impl Fn(f64) -> f64) {
        for v in self.values.iter_mut() {
            *v = op(*v);
        }
    }

    /// Minimum and maximum over defined values, `None` when all are `NaN`.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Number of undefined nodes.
    pub fn count_nan(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// Number of defined nodes.
    pub fn count_defined(&self) -> usize {
        self.values.len() - self.count_nan()
    }
}

impl Index<usize> for GridField {
    type Output = f64;

    #[inline]
    fn index(&self, idx: usize) -> &f64 {
        &self.values[idx]
    }
}

impl IndexMut<usize> for GridField {
    #[inline]
    fn index_mut(&mut self, idx: usize) -> &mut f64 {
        &mut self.values[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut f = GridField::filled(GridShape::new(3, 2), 1.0);
        f.set(2, 1, 5.0);
        assert_eq!(f.get(2, 1), 5.0);
        assert_eq!(f[5], 5.0);
    }

    #[test]
    fn test_min_max_skips_nan() {
        let f = GridField::from_vec(GridShape::new(2, 2), vec![f64::NAN, 3.0, -1.0, f64::NAN]);
        assert_eq!(f.min_max(), Some((-1.0, 3.0)));
        assert_eq!(f.count_nan(), 2);
        assert_eq!(GridField::nan(GridShape::new(2, 2)).min_max(), None);
    }

    #[test]
    #[should_panic(expected = "field has 3 values")]
    fn test_shape_mismatch() {
        GridField::from_vec(GridShape::new(2, 2), vec![0.0; 3]);
    }
}
