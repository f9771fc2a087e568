//! End-to-end sizing-field construction.
//!
//! 1. Validate the configuration and check collaborators.
//! 2. Build the evaluation grid and sample shared inputs (signed distance,
//!    depth).
//! 3. Compute every enabled criterion layer independently.
//! 4. Combine, convert to metres, bound, apply CFL.
//! 5. Limit the gradient, re-apply CFL, check for conflicts.
//! 6. Convert back to degrees and wrap as a [`SizingField`].

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::bounds::apply_bounds;
use super::cfl::{auto_timestep, enforce_cfl, max_courant};
use super::combine::combine_layers;
use super::diagnostics::{EnabledCriteria, SizingDiagnostics};
use super::grading::{grade_violations, limit_gradient};
use super::interpolant::SizingField;
use crate::bathymetry::Bathymetry;
use crate::config::{Criterion, CriterionKind, SizingConfig};
use crate::criteria::{
    Channel, SkippedChannelPoint, channel_layer, distance_layer, feature_size_layer,
    signed_distance_field, slope_layer, wavelength_layer,
};
use crate::error::{Result, SizingError};
use crate::geometry::DistanceEvaluator;
use crate::grid::{Grid, GridField};

/// Tolerance (m) when counting post-CFL grade and ceiling conflicts.
const CONFLICT_TOLERANCE: f64 = 1e-6;

/// Collaborator data for one sizing-field construction.
#[derive(Clone, Copy)]
pub struct SizingInputs<'a> {
    /// Domain boundary
    pub boundary: &'a dyn DistanceEvaluator,
    /// Depth source, required by wavelength, slope, channel, CFL and banded max_el
    pub bathymetry: Option<&'a dyn Bathymetry>,
    /// Channel centrelines, required by the channel criterion
    pub channels: &'a [Channel],
    /// Grid origin, defaults to the south-west corner of the boundary box
    pub origin: Option<(f64, f64)>,
}

impl<'a> SizingInputs<'a> {
    /// Inputs with only a boundary.
    pub fn new(boundary: &'a dyn DistanceEvaluator) -> Self {
        Self {
            boundary,
            bathymetry: None,
            channels: &[],
            origin: None,
        }
    }

    /// Attach a depth source.
    pub fn with_bathymetry(mut self, bathymetry: &'a dyn Bathymetry) -> Self {
        self.bathymetry = Some(bathymetry);
        self
    }

    /// Attach channel centrelines.
    pub fn with_channels(mut self, channels: &'a [Channel]) -> Self {
        self.channels = channels;
        self
    }

    /// Override the grid origin.
    pub fn with_origin(mut self, lon: f64, lat: f64) -> Self {
        self.origin = Some((lon, lat));
        self
    }
}

/// One computed criterion layer.
struct LayerOutput {
    kind: CriterionKind,
    layer: GridField,
    skipped: Vec<SkippedChannelPoint>,
}

/// Shared read-only inputs of the criterion functions.
struct LayerContext<'a> {
    grid: &'a Grid,
    config: &'a SizingConfig,
    inputs: &'a SizingInputs<'a>,
    distance: Option<&'a GridField>,
    depth: Option<&'a GridField>,
}

impl LayerContext<'_> {
    fn distance(&self) -> Result<&GridField> {
        self.distance
            .ok_or_else(|| SizingError::config("signed distance field not computed"))
    }

    fn depth(&self, kind: CriterionKind) -> Result<&GridField> {
        self.depth
            .ok_or_else(|| SizingError::config(format!("criterion '{}' requires bathymetry", kind)))
    }

    fn compute(&self, criterion: &Criterion) -> Result<LayerOutput> {
        let kind = criterion.kind();
        let h0 = self.config.h0;
        let mut skipped = Vec::new();

        let layer = match criterion {
            Criterion::Distance(p) => distance_layer(self.distance()?, h0, p),
            Criterion::FeatureSize(p) => feature_size_layer(self.grid, self.distance()?, h0, p).layer,
            Criterion::Wavelength(p) => wavelength_layer(self.grid, self.depth(kind)?, h0, p),
            Criterion::Slope(p) => slope_layer(self.grid, self.depth(kind)?, h0, p),
            Criterion::Channel(p) => {
                let bathymetry = self
                    .inputs
                    .bathymetry
                    .ok_or_else(|| SizingError::config("criterion 'ch' requires bathymetry"))?;
                let out = channel_layer(
                    self.grid,
                    self.inputs.boundary,
                    bathymetry,
                    self.inputs.channels,
                    h0,
                    self.config.channel_floor(),
                    p,
                );
                skipped = out.skipped;
                out.layer
            }
        };

        if let Some((lo, hi)) = layer.min_max() {
            log::debug!(
                "Layer '{}': {} nodes defined, range [{:.3e}, {:.3e}]°",
                kind,
                layer.count_defined(),
                lo,
                hi
            );
        }
        Ok(LayerOutput {
            kind,
            layer,
            skipped,
        })
    }
}

/// Check that every enabled feature has the collaborator data it needs.
fn check_inputs(config: &SizingConfig, inputs: &SizingInputs<'_>) -> Result<()> {
    if inputs.bathymetry.is_none() {
        if let Some(c) = config.criteria.iter().find(|c| c.kind().needs_bathymetry()) {
            return Err(SizingError::config(format!(
                "criterion '{}' requires bathymetry",
                c.kind()
            )));
        }
        if config.dt.is_some() {
            return Err(SizingError::config("CFL enforcement requires bathymetry"));
        }
        if !config.max_el_bands.is_empty() {
            return Err(SizingError::config("depth-banded max_el requires bathymetry"));
        }
    }
    if config.is_enabled(CriterionKind::Channel) && inputs.channels.is_empty() {
        return Err(SizingError::config("criterion 'ch' requires channel centrelines"));
    }
    Ok(())
}

/// Build a sizing field from a configuration and its collaborators.
///
/// # Errors
///
/// - [`SizingError::Configuration`] for invalid parameters or missing
///   collaborator data
/// - [`SizingError::MissingCriterion`] for an automatic timestep without
///   the distance or feature-size criterion
/// - [`SizingError::Convergence`] if gradient limiting does not converge
pub fn build_sizing_field(config: &SizingConfig, inputs: &SizingInputs<'_>) -> Result<SizingField> {
    config.validate()?;
    check_inputs(config, inputs)?;

    let grid = Grid::from_bbox(&inputs.boundary.bbox(), inputs.origin, config.h0)?;

    let needs_distance = config.is_enabled(CriterionKind::Distance)
        || config.is_enabled(CriterionKind::FeatureSize)
        || config.max_el_ns.is_some();
    let distance = needs_distance.then(|| signed_distance_field(&grid, inputs.boundary));
    let depth = inputs
        .bathymetry
        .map(|b| grid.sample(|lon, lat| b.depth(lon, lat)));

    let ctx = LayerContext {
        grid: &grid,
        config,
        inputs,
        distance: distance.as_ref(),
        depth: depth.as_ref(),
    };

    #[cfg(feature = "parallel")]
    let outputs: Vec<LayerOutput> = config
        .criteria
        .par_iter()
        .map(|c| ctx.compute(c))
        .collect::<Result<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let outputs: Vec<LayerOutput> = config
        .criteria
        .iter()
        .map(|c| ctx.compute(c))
        .collect::<Result<_>>()?;

    let enabled = EnabledCriteria::new(outputs.iter().map(|o| o.kind));
    log::info!("Computed criteria: {}", enabled);

    let mut diagnostics = SizingDiagnostics::default();
    for out in &outputs {
        diagnostics.skipped_channel_points.extend_from_slice(&out.skipped);
    }

    // Undefined nodes become +∞ and are capped to max_el by the bounds
    let layers: Vec<&GridField> = outputs.iter().map(|o| &o.layer).collect();
    let combined = combine_layers(&layers, f64::INFINITY);
    diagnostics.nan_filled_nodes = combined.filled;

    let mut sizes = grid.to_meters(&combined.field);
    apply_bounds(&grid, &mut sizes, config, distance.as_ref(), depth.as_ref());

    let dt = match config.dt {
        None => None,
        Some(requested) => {
            let depth = ctx.depth.ok_or_else(|| SizingError::config("CFL enforcement requires bathymetry"))?;
            let dt = if requested == 0.0 {
                let reference = reference_layer(&outputs).map(|layer| grid.to_meters(layer));
                auto_timestep(reference.as_ref(), depth)?
            } else {
                requested
            };
            let adjusted = enforce_cfl(&mut sizes, depth, dt);
            log::debug!("CFL dt = {:.3} s raised {} nodes before grading", dt, adjusted);
            Some(dt)
        }
    };
    drop(outputs);

    let budget = config.grading_max_iterations.unwrap_or(grid.len() + 1);
    let report = limit_gradient(&grid, &mut sizes, config.g, budget)?;
    diagnostics.grading_iterations = report.iterations;

    if let (Some(dt), Some(depth)) = (dt, depth.as_ref()) {
        diagnostics.cfl_adjusted_nodes = enforce_cfl(&mut sizes, depth, dt);
        diagnostics.grade_violations = grade_violations(&grid, &sizes, config.g, CONFLICT_TOLERANCE);
        diagnostics.ceiling_violations =
            ceiling_violations(&grid, &sizes, config, distance.as_ref(), Some(depth));

        if diagnostics.grade_violations > 0 || diagnostics.ceiling_violations > 0 {
            log::warn!(
                "CFL constraint conflicts with bounds after grading: {} grade and {} ceiling violations",
                diagnostics.grade_violations,
                diagnostics.ceiling_violations
            );
        }
        log::debug!("Max Courant number after grading: {:.3}", max_courant(&sizes, depth, dt));
    }

    let field = SizingField::new(grid, grid.to_degrees(&sizes))
        .with_enabled(enabled)
        .with_dt(dt)
        .with_diagnostics(diagnostics);
    log::info!("{}", field.statistics());
    Ok(field)
}

/// Reference size layer (degrees) for the automatic timestep.
fn reference_layer(outputs: &[LayerOutput]) -> Option<&GridField> {
    [CriterionKind::Distance, CriterionKind::FeatureSize]
        .iter()
        .find_map(|kind| outputs.iter().find(|o| o.kind == *kind))
        .map(|o| &o.layer)
}

/// Nodes exceeding the cap the bounds would give them.
fn ceiling_violations(
    grid: &Grid,
    sizes: &GridField,
    config: &SizingConfig,
    distance: Option<&GridField>,
    depth: Option<&GridField>,
) -> usize {
    let mut capped = sizes.clone();
    apply_bounds(grid, &mut capped, config, distance, depth);
    sizes
        .values()
        .iter()
        .zip(capped.values())
        .filter(|(h, c)| **h > **c + CONFLICT_TOLERANCE)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bathymetry::ConstantBathymetry;
    use crate::config::{ChannelParams, DistanceParams, WavelengthParams};
    use crate::geometry::FnDistance;
    use crate::io::GeoBoundingBox;

    fn coast() -> FnDistance<impl Fn(f64, f64) -> f64 + Sync> {
        FnDistance::new(GeoBoundingBox::new(0.0, 0.0, 0.05, 0.02), |lon, _| -lon)
    }

    #[test]
    fn test_wavelength_without_bathymetry() {
        let boundary = coast();
        let config = SizingConfig::new(100.0, 5000.0, 0.2)
            .with_criterion(Criterion::Wavelength(WavelengthParams::default()));
        let err = build_sizing_field(&config, &SizingInputs::new(&boundary)).unwrap_err();
        assert!(matches!(err, SizingError::Configuration(_)));
    }

    #[test]
    fn test_channel_without_centrelines() {
        let boundary = coast();
        let bathy = ConstantBathymetry(-20.0);
        let config = SizingConfig::new(100.0, 5000.0, 0.2)
            .with_criterion(Criterion::Channel(ChannelParams::default()));
        let inputs = SizingInputs::new(&boundary).with_bathymetry(&bathy);
        assert!(build_sizing_field(&config, &inputs).is_err());
    }

    #[test]
    fn test_auto_dt_needs_reference() {
        let boundary = coast();
        let bathy = ConstantBathymetry(-20.0);
        let config = SizingConfig::new(100.0, 5000.0, 0.2)
            .with_criterion(Criterion::Wavelength(WavelengthParams::default()))
            .with_dt(0.0);
        let inputs = SizingInputs::new(&boundary).with_bathymetry(&bathy);
        let err = build_sizing_field(&config, &inputs).unwrap_err();
        assert!(matches!(err, SizingError::MissingCriterion));
    }

    #[test]
    fn test_records_enabled_criteria() {
        let boundary = coast();
        let config = SizingConfig::new(100.0, 5000.0, 0.2)
            .with_criterion(Criterion::Distance(DistanceParams::new(0.1)));
        let field = build_sizing_field(&config, &SizingInputs::new(&boundary)).unwrap();
        assert_eq!(field.enabled_criteria().names(), vec!["dis"]);
        assert!(field.dt().is_none());
        assert!(field.diagnostics().grading_iterations >= 1);
    }
}
