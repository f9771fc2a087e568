//! Combination of criterion layers.

use crate::grid::GridField;

/// Result of combining layers.
#[derive(Debug, Clone)]
pub struct Combined {
    /// Elementwise minimum (degrees)
    pub field: GridField,
    /// Nodes where every layer was `NaN`, filled with the fill value
    pub filled: usize,
}

/// Elementwise minimum over `layers`, ignoring `NaN`.
///
/// Nodes where every layer is `NaN` receive `fill` and are counted.
///
/// # Panics
///
/// Panics if `layers` is empty or the shapes differ.
pub fn combine_layers(layers: &[&GridField], fill: f64) -> Combined {
    assert!(!layers.is_empty(), "no layers to combine");
    let shape = layers[0].shape();

    let mut field = GridField::nan(shape);
    for layer in layers {
        assert_eq!(layer.shape(), shape, "layer shape mismatch");
        for (out, &v) in field.values_mut().iter_mut().zip(layer.values()) {
            // f64::min returns the non-NaN operand
            *out = out.min(v);
        }
    }

    let mut filled = 0;
    for v in field.values_mut() {
        if v.is_nan() {
            *v = fill;
            filled += 1;
        }
    }
    if filled > 0 {
        log::warn!("{} nodes undefined in every layer, filled with the maximum size", filled);
    }

    Combined { field, filled }
}
