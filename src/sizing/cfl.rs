//! CFL (Courant) constraint.
//!
//! An explicit shallow-water solver with timestep `dt` is stable where
//! `dt · u / h ≤ 0.5`, with wave speed `u = √(g|d|) + √(g/|d|)`. Sizes that
//! violate this are raised to `dt · u / 0.5`.

use crate::criteria::GRAVITY;
use crate::error::{Result, SizingError};
use crate::grid::GridField;

/// Maximum admissible Courant number.
pub const STABILITY_FRACTION: f64 = 0.5;

/// Characteristic wave speed (m/s) at depth `d`: shallow-water celerity
/// plus an orbital-velocity correction.
pub fn wave_speed(depth: f64) -> f64 {
    let h = depth.abs();
    (GRAVITY * h).sqrt() + (GRAVITY / h).sqrt()
}

/// Courant number of a size `h` (m) at depth `d` for timestep `dt`.
pub fn courant(dt: f64, depth: f64, h: f64) -> f64 {
    dt * wave_speed(depth) / h
}

fn is_wet(depth: f64) -> bool {
    depth < 0.0
}

/// Largest timestep (s) stable for every wet node of `reference` (m).
///
/// `reference` is the distance or feature-size layer converted to metres;
/// `None` means neither criterion is enabled.
pub fn auto_timestep(reference: Option<&GridField>, depth: &GridField) -> Result<f64> {
    let reference = reference.ok_or(SizingError::MissingCriterion)?;

    let dt = depth
        .values()
        .iter()
        .zip(reference.values())
        .filter(|(d, h)| is_wet(**d) && h.is_finite())
        .map(|(&d, &h)| STABILITY_FRACTION * h / wave_speed(d))
        .fold(f64::INFINITY, f64::min);

    if !dt.is_finite() {
        return Err(SizingError::config(
            "automatic timestep needs at least one wet node with a reference size",
        ));
    }
    log::info!("Automatic CFL timestep: {:.3} s", dt);
    Ok(dt)
}

/// Raise sizes (m) at wet nodes whose Courant number exceeds the limit.
///
/// Returns the number of nodes changed.
pub fn enforce_cfl(sizes: &mut GridField, depth: &GridField, dt: f64) -> usize {
    let mut adjusted = 0;
    for (h, &d) in sizes.values_mut().iter_mut().zip(depth.values()) {
        if !is_wet(d) {
            continue;
        }
        if courant(dt, d, *h) > STABILITY_FRACTION {
            *h = dt * wave_speed(d) / STABILITY_FRACTION;
            adjusted += 1;
        }
    }
    adjusted
}

/// Largest Courant number over wet nodes.
pub fn max_courant(sizes: &GridField, depth: &GridField, dt: f64) -> f64 {
    sizes
        .values()
        .iter()
        .zip(depth.values())
        .filter(|(_, d)| is_wet(**d))
        .map(|(&h, &d)| courant(dt, d, h))
        .fold(0.0, f64::max)
}
