//! Low-, high- and band-pass filtering of gridded depth.
//!
//! Filters are separable Gaussians. A cut-off length `λ` maps to a kernel
//! standard deviation of `λ / 2π` (in metres), converted to grid cells with
//! the mean planar spacing. Edges replicate the boundary value.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::FilterBand;
use crate::grid::GridField;

/// Kernels narrower than this many cells leave the field unchanged.
const MIN_SIGMA_CELLS: f64 = 0.5;

/// Gaussian low-pass keeping scales longer than `length` metres.
pub fn lowpass(field: &GridField, length: f64, spacing_m: f64) -> GridField {
    let sigma = length / (2.0 * std::f64::consts::PI * spacing_m);
    if sigma < MIN_SIGMA_CELLS {
        return field.clone();
    }

    let kernel = gaussian_kernel(sigma, field.shape().nx().max(field.shape().ny()));
    let rows = convolve_rows(field, &kernel);
    convolve_cols(&rows, &kernel)
}

/// High-pass: the field minus its low-pass.
pub fn highpass(field: &GridField, length: f64, spacing_m: f64) -> GridField {
    let low = lowpass(field, length, spacing_m);
    difference(field, &low)
}

/// Band-pass keeping scales between `short` and `long` metres.
pub fn bandpass(field: &GridField, short: f64, long: f64, spacing_m: f64) -> GridField {
    let fine = lowpass(field, short, spacing_m);
    let coarse = lowpass(field, long, spacing_m);
    difference(&fine, &coarse)
}

/// Sum of the contributions of every band.
pub fn apply_bands(field: &GridField, bands: &[FilterBand], spacing_m: f64) -> GridField {
    let mut total = GridField::filled(field.shape(), 0.0);

    for band in bands {
        let part = match *band {
            FilterBand::LowPass { length } => lowpass(field, length, spacing_m),
            FilterBand::HighPass { length } => {
                log::warn!(
                    "High-pass filtering bathymetry at {:.0} m removes the mean depth; slopes may be unreliable",
                    length
                );
                highpass(field, length, spacing_m)
            }
            FilterBand::BandPass { short, long } => bandpass(field, short, long, spacing_m),
        };
        for (t, p) in total.values_mut().iter_mut().zip(part.values()) {
            *t += p;
        }
    }

    total
}

fn difference(a: &GridField, b: &GridField) -> GridField {
    let values = a.values().iter().zip(b.values()).map(|(x, y)| x - y).collect();
    GridField::from_vec(a.shape(), values)
}

/// Normalised Gaussian weights over `[-r, r]`, `r = ceil(3σ)` capped at `max_radius`.
fn gaussian_kernel(sigma: f64, max_radius: usize) -> Vec<f64> {
    let radius = ((3.0 * sigma).ceil() as usize).clamp(1, max_radius.max(1));
    let mut weights: Vec<f64> = (0..=2 * radius)
        .map(|k| {
            let x = k as f64 - radius as f64;
            (-0.5 * (x / sigma).powi(2)).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    for w in weights.iter_mut() {
        *w /= sum;
    }
    weights
}

/// Convolve one line with replicate padding.
fn convolve_line(input: &[f64], kernel: &[f64], output: &mut [f64]) {
    let n = input.len() as isize;
    let radius = (kernel.len() / 2) as isize;
    for (i, out) in output.iter_mut().enumerate() {
        let mut acc = 0.0;
        for (k, w) in kernel.iter().enumerate() {
            let src = (i as isize + k as isize - radius).clamp(0, n - 1);
            acc += w * input[src as usize];
        }
        *out = acc;
    }
}

fn convolve_rows(field: &GridField, kernel: &[f64]) -> GridField {
    let nx = field.shape().nx();
    let mut out = GridField::filled(field.shape(), 0.0);
    let input = field.values();

    #[cfg(feature = "parallel")]
    out.values_mut()
        .par_chunks_mut(nx)
        .enumerate()
        .for_each(|(j, row)| convolve_line(&input[j * nx..(j + 1) * nx], kernel, row));
    #[cfg(not(feature = "parallel"))]
    out.values_mut()
        .chunks_mut(nx)
        .enumerate()
        .for_each(|(j, row)| convolve_line(&input[j * nx..(j + 1) * nx], kernel, row));

    out
}

fn convolve_cols(field: &GridField, kernel: &[f64]) -> GridField {
    let (nx, ny) = field.shape().as_tuple();
    let mut out = GridField::filled(field.shape(), 0.0);
    let mut column = vec![0.0; ny];
    let mut filtered = vec![0.0; ny];

    for i in 0..nx {
        for j in 0..ny {
            column[j] = field.get(i, j);
        }
        convolve_line(&column, kernel, &mut filtered);
        for j in 0..ny {
            out.set(i, j, filtered[j]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GridShape;
    use approx::assert_relative_eq;

    fn wavy(nx: usize, wavelength_cells: f64) -> GridField {
        let shape = GridShape::new(nx, 8);
        let values = (0..shape.len())
            .map(|idx| {
                let i = (idx % nx) as f64;
                -100.0 + 10.0 * (2.0 * std::f64::consts::PI * i / wavelength_cells).sin()
            })
            .collect();
        GridField::from_vec(shape, values)
    }

    fn amplitude(field: &GridField, j: usize) -> f64 {
        let nx = field.shape().nx();
        let (lo, hi) = (nx / 4..3 * nx / 4)
            .map(|i| field.get(i, j))
            .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
        (hi - lo) / 2.0
    }

    #[test]
    fn test_lowpass_preserves_constant() {
        let f = GridField::filled(GridShape::new(20, 10), -42.0);
        let out = lowpass(&f, 5000.0, 100.0);
        for &v in out.values() {
            assert_relative_eq!(v, -42.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_lowpass_removes_short_waves() {
        // 4-cell waves, 100 m cells, cut-off 5 km
        let f = wavy(200, 4.0);
        let out = lowpass(&f, 5000.0, 100.0);
        assert!(amplitude(&out, 4) < 0.01);
        assert_relative_eq!(out.get(100, 4), -100.0, epsilon = 0.01);
    }

    #[test]
    fn test_highpass_keeps_short_waves() {
        let f = wavy(200, 4.0);
        let out = highpass(&f, 5000.0, 100.0);
        assert!(amplitude(&out, 4) > 9.9);
    }

    #[test]
    fn test_narrow_kernel_is_identity() {
        let f = wavy(20, 4.0);
        assert_eq!(lowpass(&f, 100.0, 1000.0), f);
    }

    #[test]
    fn test_bands_sum() {
        let f = wavy(200, 50.0);
        let bands = [
            FilterBand::LowPass { length: 20_000.0 },
            FilterBand::BandPass {
                short: 500.0,
                long: 20_000.0,
            },
        ];
        // low(20 km) + [low(500 m) - low(20 km)] = low(500 m)
        let summed = apply_bands(&f, &bands, 100.0);
        let direct = lowpass(&f, 500.0, 100.0);
        for (a, b) in summed.values().iter().zip(direct.values()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }
}
