//! The finished sizing field.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::diagnostics::{EnabledCriteria, SizingDiagnostics};
use crate::error::Result;
use crate::grid::{Grid, GridField};
use crate::io::degrees_to_meters;

/// Bilinear size interpolant over the evaluation grid.
///
/// Values are in degrees. Queries outside the grid take the value of the
/// nearest point on the grid edge.
///
/// # Example
///
/// ```
/// use sizefield_rs::grid::{Grid, GridField};
/// use sizefield_rs::sizing::SizingField;
/// use sizefield_rs::types::GridShape;
///
/// let grid = Grid::new(0.0, 0.0, 1.0, 1.0, GridShape::new(2, 2));
/// let values = GridField::from_vec(grid.shape(), vec![1.0, 2.0, 3.0, 4.0]);
/// let field = SizingField::new(grid, values);
/// assert_eq!(field.eval(0.5, 0.5), 2.5);
/// assert_eq!(field.eval(-10.0, 0.0), 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingField {
    grid: Grid,
    values: GridField,
    enabled: EnabledCriteria,
    dt: Option<f64>,
    diagnostics: SizingDiagnostics,
}

impl SizingField {
    /// Wrap a degree-valued field.
    ///
    /// # Panics
    ///
    /// Panics if the field shape differs from the grid shape.
    pub fn new(grid: Grid, values: GridField) -> Self {
        assert_eq!(grid.shape(), values.shape(), "field does not match grid");
        Self {
            grid,
            values,
            enabled: EnabledCriteria::default(),
            dt: None,
            diagnostics: SizingDiagnostics::default(),
        }
    }

    /// Attach the contributing criteria.
    pub fn with_enabled(mut self, enabled: EnabledCriteria) -> Self {
        self.enabled = enabled;
        self
    }

    /// Attach the CFL timestep the field satisfies.
    pub fn with_dt(mut self, dt: Option<f64>) -> Self {
        self.dt = dt;
        self
    }

    /// Attach build diagnostics.
    pub fn with_diagnostics(mut self, diagnostics: SizingDiagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Size (degrees) at `(lon, lat)`.
    pub fn eval(&self, lon: f64, lat: f64) -> f64 {
        let (fi, fj) = self.grid.fractional_index(lon, lat);
        let fi = fi.clamp(0.0, (self.grid.nx() - 1) as f64);
        let fj = fj.clamp(0.0, (self.grid.ny() - 1) as f64);

        let i0 = (fi.floor() as usize).min(self.grid.nx().saturating_sub(2));
        let j0 = (fj.floor() as usize).min(self.grid.ny().saturating_sub(2));
        let i1 = (i0 + 1).min(self.grid.nx() - 1);
        let j1 = (j0 + 1).min(self.grid.ny() - 1);
        let tx = fi - i0 as f64;
        let ty = fj - j0 as f64;

        let v = &self.values;
        let bottom = v.get(i0, j0) * (1.0 - tx) + v.get(i1, j0) * tx;
        let top = v.get(i0, j1) * (1.0 - tx) + v.get(i1, j1) * tx;
        bottom * (1.0 - ty) + top * ty
    }

    /// Size (m) at `(lon, lat)`, converted at the query latitude.
    pub fn eval_meters(&self, lon: f64, lat: f64) -> f64 {
        degrees_to_meters(self.eval(lon, lat), lat)
    }

    /// Evaluate at many points.
    pub fn eval_many(&self, points: &[(f64, f64)]) -> Vec<f64> {
        points.iter().map(|&(lon, lat)| self.eval(lon, lat)).collect()
    }

    /// Evaluation grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Node values (degrees).
    pub fn values(&self) -> &GridField {
        &self.values
    }

    /// Node values converted to metres.
    pub fn values_meters(&self) -> GridField {
        self.grid.to_meters(&self.values)
    }

    /// Contributing criteria.
    pub fn enabled_criteria(&self) -> &EnabledCriteria {
        &self.enabled
    }

    /// CFL timestep (s), if the constraint was applied.
    pub fn dt(&self) -> Option<f64> {
        self.dt
    }

    /// Build diagnostics.
    pub fn diagnostics(&self) -> &SizingDiagnostics {
        &self.diagnostics
    }

    /// Summary of node sizes in metres.
    pub fn statistics(&self) -> SizingStatistics {
        let meters = self.values_meters();
        let (min, max) = meters.min_max().unwrap_or((f64::NAN, f64::NAN));
        let mean = meters.values().iter().sum::<f64>() / meters.values().len() as f64;
        SizingStatistics {
            nx: self.grid.nx(),
            ny: self.grid.ny(),
            min_m: min,
            max_m: max,
            mean_m: mean,
            enabled: self.enabled.clone(),
            dt: self.dt,
        }
    }

    /// Write the field as JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Read a field written by [`save_json`](Self::save_json).
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Summary statistics of a sizing field.
#[derive(Debug, Clone)]
pub struct SizingStatistics {
    /// Grid columns
    pub nx: usize,
    /// Grid rows
    pub ny: usize,
    /// Smallest node size (m)
    pub min_m: f64,
    /// Largest node size (m)
    pub max_m: f64,
    /// Mean node size (m)
    pub mean_m: f64,
    /// Contributing criteria
    pub enabled: EnabledCriteria,
    /// CFL timestep (s)
    pub dt: Option<f64>,
}

impl fmt::Display for SizingStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sizing Field Statistics:")?;
        writeln!(f, "  Grid: {} x {}", self.nx, self.ny)?;
        writeln!(f, "  Criteria: {}", self.enabled)?;
        writeln!(
            f,
            "  Size range: {:.1} m to {:.1} m (mean {:.1} m)",
            self.min_m, self.max_m, self.mean_m
        )?;
        match self.dt {
            Some(dt) => write!(f, "  CFL timestep: {:.3} s", dt),
            None => write!(f, "  CFL timestep: not applied"),
        }
    }
}
