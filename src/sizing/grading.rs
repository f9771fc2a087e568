//! Gradient limiting.
//!
//! Enforces `|h(a) − h(b)| ≤ g · dist(a, b)` between 8-connected grid
//! neighbours by min-plus relaxation: every node is repeatedly lowered to
//! `min(h, h_nb + g · dist)`. Sizes only ever decrease, so a field bounded
//! below by h0 stays bounded below by h0, and the result is the largest
//! graded field not exceeding the input.
//!
//! Sweeps are Jacobi-style (each reads the previous iterate) and parallel
//! over rows.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Result, SizingError};
use crate::grid::{Grid, GridField};

/// Largest per-iteration decrease (m) considered converged.
pub const GRADING_TOLERANCE: f64 = 1e-9;

/// Outcome of [`limit_gradient`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradingReport {
    /// Sweeps performed
    pub iterations: usize,
    /// Whether a fixed point was reached
    pub converged: bool,
    /// Largest decrease (m) in the last sweep
    pub residual: f64,
}

/// Planar distances (m) between a node and its neighbours.
///
/// East-west spacing varies per row; north-south spacing is constant.
/// Diagonals between rows `j` and `j + 1` use the mean of the two row
/// spacings so that every edge has one length whichever end it is seen
/// from.
#[derive(Debug, Clone)]
pub struct NeighbourDistances {
    dx: Vec<f64>,
    dy: f64,
}

impl NeighbourDistances {
    /// Precompute spacings for `grid`.
    pub fn new(grid: &Grid) -> Self {
        let dx = (0..grid.ny()).map(|j| grid.spacing_m(j).0).collect();
        let dy = grid.spacing_m(0).1;
        Self { dx, dy }
    }

    /// Distance (m) from `(i, j)` to `(i + di, j + dj)`, `di, dj ∈ {−1, 0, 1}`.
    pub fn between(&self, j: usize, di: isize, dj: isize) -> f64 {
        match (di, dj) {
            (0, 0) => 0.0,
            (_, 0) => self.dx[j],
            (0, _) => self.dy,
            _ => {
                let other = (j as isize + dj) as usize;
                (0.5 * (self.dx[j] + self.dx[other])).hypot(self.dy)
            }
        }
    }
}

const OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Limit the grade of a metre-valued size field in place.
///
/// Runs at most `max_iterations` sweeps. Exhausting the budget is an error:
/// the partially graded field is left in `sizes` and
/// [`SizingError::Convergence`] is returned.
pub fn limit_gradient(grid: &Grid, sizes: &mut GridField, g: f64, max_iterations: usize) -> Result<GradingReport> {
    let distances = NeighbourDistances::new(grid);
    let nx = grid.nx();
    let mut next = sizes.clone();
    let mut residual = f64::INFINITY;

    for iteration in 1..=max_iterations {
        residual = sweep(sizes, &mut next, nx, g, &distances);
        std::mem::swap(sizes, &mut next);
        log::trace!("Grading iteration {}: max change {:.3e} m", iteration, residual);

        if residual <= GRADING_TOLERANCE {
            log::debug!("Gradient limiting converged after {} iterations", iteration);
            return Ok(GradingReport {
                iterations: iteration,
                converged: true,
                residual,
            });
        }
    }

    Err(SizingError::Convergence {
        iterations: max_iterations,
        residual,
    })
}

/// One Jacobi sweep from `current` into `next`; returns the largest decrease.
fn sweep(current: &GridField, next: &mut GridField, nx: usize, g: f64, distances: &NeighbourDistances) -> f64 {
    let ny = current.shape().ny();
    let relax_row = |(j, row): (usize, &mut [f64])| -> f64 {
        let mut change: f64 = 0.0;
        for (i, out) in row.iter_mut().enumerate() {
            let h = current.get(i, j);
            let mut best = h;
            for &(di, dj) in &OFFSETS {
                let (ni, nj) = (i as isize + di, j as isize + dj);
                if ni < 0 || nj < 0 || ni >= nx as isize || nj >= ny as isize {
                    continue;
                }
                let candidate = current.get(ni as usize, nj as usize) + g * distances.between(j, di, dj);
                best = best.min(candidate);
            }
            change = change.max(h - best);
            *out = best;
        }
        change
    };

    #[cfg(feature = "parallel")]
    let residual = next
        .values_mut()
        .par_chunks_mut(nx)
        .enumerate()
        .map(relax_row)
        .reduce(|| 0.0, f64::max);
    #[cfg(not(feature = "parallel"))]
    let residual = next
        .values_mut()
        .chunks_mut(nx)
        .enumerate()
        .map(relax_row)
        .fold(0.0, f64::max);

    residual
}

/// Number of neighbour pairs whose grade exceeds `g` by more than `tolerance`.
pub fn grade_violations(grid: &Grid, sizes: &GridField, g: f64, tolerance: f64) -> usize {
    let distances = NeighbourDistances::new(grid);
    let (nx, ny) = grid.shape().as_tuple();
    let mut count = 0;

    for j in 0..ny {
        for i in 0..nx {
            // Forward half of the stencil visits each pair once
            for &(di, dj) in &OFFSETS[4..] {
                let (ni, nj) = (i as isize + di, j as isize + dj);
                if ni < 0 || ni >= nx as isize || nj >= ny as isize {
                    continue;
                }
                let diff = (sizes.get(i, j) - sizes.get(ni as usize, nj as usize)).abs();
                if diff > g * distances.between(j, di, dj) + tolerance {
                    count += 1;
                }
            }
        }
    }
    count
}
