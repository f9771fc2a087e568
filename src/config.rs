//! Sizing-field configuration.
//!
//! A [`SizingConfig`] is an immutable record of global bounds plus the list
//! of enabled [`Criterion`] variants, each carrying its own parameters.
//!
//! # Example
//!
//! ```
//! use sizefield_rs::config::{Criterion, DistanceParams, SizingConfig};
//!
//! let config = SizingConfig::new(100.0, 5000.0, 0.2)
//!     .with_criterion(Criterion::Distance(DistanceParams::new(0.15)))
//!     .with_max_el_ns(1000.0);
//! assert!(config.validate().is_ok());
//! ```
//!
//! # JSON format
//!
//! ```text
//! {
//!   "h0": 100.0, "max_el": 5000.0, "g": 0.2, "dt": 0.0,
//!   "criteria": {
//!     "dis": { "rate": 0.15 },
//!     "fs":  { "elements_per_feature": 3 },
//!     "wl":  { "bands": [ { "divisor": 30 } ] },
//!     "slp": { "bands": [ { "divisor": 10, "upper": -50 } ], "filter": { "rossby": { "factor": 1.0 } } },
//!     "ch":  { "divisor": 0.5 }
//!   }
//! }
//! ```
//!
//! Unknown criterion names are logged and skipped.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SizingError};
use crate::types::DepthBand;

/// Identifies a criterion independently of its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    /// Size grows linearly with distance from the boundary
    Distance,
    /// Channel width from the medial axis
    FeatureSize,
    /// Tidal wavelength resolution
    Wavelength,
    /// Bathymetric slope resolution
    Slope,
    /// Imprinted channel centrelines
    Channel,
}

impl CriterionKind {
    /// All kinds, in pipeline order.
    pub const ALL: [CriterionKind; 5] = [
        CriterionKind::Distance,
        CriterionKind::FeatureSize,
        CriterionKind::Wavelength,
        CriterionKind::Slope,
        CriterionKind::Channel,
    ];

    /// Short configuration key.
    pub fn short_name(self) -> &'static str {
        match self {
            CriterionKind::Distance => "dis",
            CriterionKind::FeatureSize => "fs",
            CriterionKind::Wavelength => "wl",
            CriterionKind::Slope => "slp",
            CriterionKind::Channel => "ch",
        }
    }

    /// Parse a configuration key (short or long form).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dis" | "distance" => Some(CriterionKind::Distance),
            "fs" | "feature_size" => Some(CriterionKind::FeatureSize),
            "wl" | "wavelength" => Some(CriterionKind::Wavelength),
            "slp" | "slope" => Some(CriterionKind::Slope),
            "ch" | "channel" => Some(CriterionKind::Channel),
            _ => None,
        }
    }

    /// Whether the criterion samples the bathymetry.
    pub fn needs_bathymetry(self) -> bool {
        matches!(
            self,
            CriterionKind::Wavelength | CriterionKind::Slope | CriterionKind::Channel
        )
    }
}

impl fmt::Display for CriterionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Distance criterion parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceParams {
    /// Size growth per unit distance from the boundary (dimensionless)
    pub rate: f64,
}

impl DistanceParams {
    /// Create with a growth rate.
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl Default for DistanceParams {
    fn default() -> Self {
        Self::new(0.15)
    }
}

/// Feature-size criterion parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureSizeParams {
    /// Elements across the local feature width (R)
    #[serde(default = "default_elements_per_feature")]
    pub elements_per_feature: f64,
}

fn default_elements_per_feature() -> f64 {
    3.0
}

impl FeatureSizeParams {
    /// Create with the number of elements per feature.
    pub fn new(elements_per_feature: f64) -> Self {
        Self {
            elements_per_feature,
        }
    }
}

impl Default for FeatureSizeParams {
    fn default() -> Self {
        Self::new(default_elements_per_feature())
    }
}

/// A resolution divisor applied within a depth band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolutionBand {
    /// Elements per wavelength, or the slope parameter
    pub divisor: f64,
    /// Shallow limit (inclusive), defaults to +∞
    #[serde(default = "f64_inf", skip_serializing_if = "is_unbounded")]
    pub upper: f64,
    /// Deep limit (exclusive), defaults to −∞
    #[serde(default = "f64_neg_inf", skip_serializing_if = "is_unbounded")]
    pub lower: f64,
}

fn f64_inf() -> f64 {
    f64::INFINITY
}

fn f64_neg_inf() -> f64 {
    f64::NEG_INFINITY
}

// JSON has no infinity; an open band edge is written by omission
fn is_unbounded(limit: &f64) -> bool {
    limit.is_infinite()
}

impl ResolutionBand {
    /// Divisor applied at every depth.
    pub fn everywhere(divisor: f64) -> Self {
        Self {
            divisor,
            upper: f64::INFINITY,
            lower: f64::NEG_INFINITY,
        }
    }

    /// Divisor applied within `band`.
    pub fn within(divisor: f64, band: DepthBand) -> Self {
        Self {
            divisor,
            upper: band.upper,
            lower: band.lower,
        }
    }

    /// Depth band the divisor applies to.
    pub fn band(&self) -> DepthBand {
        DepthBand::new(self.upper, self.lower)
    }
}

/// Wavelength criterion parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavelengthParams {
    /// Bands processed in order; the last matching band wins at a node
    pub bands: Vec<ResolutionBand>,
}

impl WavelengthParams {
    /// Single band covering every depth.
    pub fn new(divisor: f64) -> Self {
        Self {
            bands: vec![ResolutionBand::everywhere(divisor)],
        }
    }

    /// Explicit band list.
    pub fn with_bands(bands: Vec<ResolutionBand>) -> Self {
        Self { bands }
    }
}

impl Default for WavelengthParams {
    fn default() -> Self {
        Self::new(30.0)
    }
}

/// One length-scale band of the fixed bathymetry filter (lengths in metres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterBand {
    /// Keep scales longer than `length`
    LowPass {
        /// Cut-off length (m)
        length: f64,
    },
    /// Keep scales shorter than `length`
    HighPass {
        /// Cut-off length (m)
        length: f64,
    },
    /// Keep scales between `short` and `long`
    BandPass {
        /// Short cut-off (m)
        short: f64,
        /// Long cut-off (m)
        long: f64,
    },
}

/// Bathymetry filtering applied before computing slopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Use raw depth
    #[default]
    Off,
    /// Sum of fixed filter bands
    Bands(Vec<FilterBand>),
    /// Low-pass at a multiple of the local Rossby radius of deformation
    Rossby {
        /// Multiplier on the binned deformation radius
        factor: f64,
    },
}

/// Slope criterion parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlopeParams {
    /// Bands processed in order; the last matching band wins at a node
    pub bands: Vec<ResolutionBand>,
    /// Depth filter
    #[serde(default)]
    pub filter: FilterMode,
}

impl SlopeParams {
    /// Single band, unfiltered depth.
    pub fn new(divisor: f64) -> Self {
        Self {
            bands: vec![ResolutionBand::everywhere(divisor)],
            filter: FilterMode::Off,
        }
    }

    /// Explicit band list.
    pub fn with_bands(mut self, bands: Vec<ResolutionBand>) -> Self {
        self.bands = bands;
        self
    }

    /// Set the depth filter.
    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }
}

impl Default for SlopeParams {
    fn default() -> Self {
        Self::new(10.0)
    }
}

/// Channel criterion parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelParams {
    /// Size = |depth| / divisor
    pub divisor: f64,
    /// Side-slope angle (degrees) used to estimate half-width from depth
    #[serde(default = "default_repose_angle")]
    pub repose_angle_deg: f64,
}

fn default_repose_angle() -> f64 {
    60.0
}

impl ChannelParams {
    /// Create with a depth divisor and the default 60° repose angle.
    pub fn new(divisor: f64) -> Self {
        Self {
            divisor,
            repose_angle_deg: default_repose_angle(),
        }
    }

    /// Override the repose angle.
    pub fn with_repose_angle(mut self, degrees: f64) -> Self {
        self.repose_angle_deg = degrees;
        self
    }
}

impl Default for ChannelParams {
    fn default() -> Self {
        Self::new(0.5)
    }
}

/// An enabled size criterion with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// Distance to boundary
    Distance(DistanceParams),
    /// Medial-axis feature size
    FeatureSize(FeatureSizeParams),
    /// Tidal wavelength
    Wavelength(WavelengthParams),
    /// Bathymetric slope
    Slope(SlopeParams),
    /// Channel imprinting
    Channel(ChannelParams),
}

impl Criterion {
    /// Kind of this criterion.
    pub fn kind(&self) -> CriterionKind {
        match self {
            Criterion::Distance(_) => CriterionKind::Distance,
            Criterion::FeatureSize(_) => CriterionKind::FeatureSize,
            Criterion::Wavelength(_) => CriterionKind::Wavelength,
            Criterion::Slope(_) => CriterionKind::Slope,
            Criterion::Channel(_) => CriterionKind::Channel,
        }
    }

    /// Parse parameters for `kind` from a JSON value.
    fn from_json(kind: CriterionKind, value: serde_json::Value) -> Result<Self> {
        Ok(match kind {
            CriterionKind::Distance => Criterion::Distance(serde_json::from_value(value)?),
            CriterionKind::FeatureSize => Criterion::FeatureSize(serde_json::from_value(value)?),
            CriterionKind::Wavelength => Criterion::Wavelength(serde_json::from_value(value)?),
            CriterionKind::Slope => Criterion::Slope(serde_json::from_value(value)?),
            CriterionKind::Channel => Criterion::Channel(serde_json::from_value(value)?),
        })
    }

    fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| {
            if v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(SizingError::config(format!(
                    "{} must be positive for criterion '{}', got {}",
                    name,
                    self.kind(),
                    v
                )))
            }
        };

        match self {
            Criterion::Distance(p) => positive("rate", p.rate),
            Criterion::FeatureSize(p) => positive("elements_per_feature", p.elements_per_feature),
            Criterion::Wavelength(p) => validate_bands(self.kind(), &p.bands, positive),
            Criterion::Slope(p) => {
                validate_bands(self.kind(), &p.bands, positive)?;
                match &p.filter {
                    FilterMode::Off => Ok(()),
                    FilterMode::Rossby { factor } => positive("filter factor", *factor),
                    FilterMode::Bands(bands) => bands.iter().try_for_each(|b| match *b {
                        FilterBand::LowPass { length } | FilterBand::HighPass { length } => {
                            positive("filter length", length)
                        }
                        FilterBand::BandPass { short, long } => {
                            positive("filter length", short)?;
                            positive("filter length", long)?;
                            if short < long {
                                Ok(())
                            } else {
                                Err(SizingError::config(format!(
                                    "band-pass short length {} must be below long length {}",
                                    short, long
                                )))
                            }
                        }
                    }),
                }
            }
            Criterion::Channel(p) => {
                positive("divisor", p.divisor)?;
                if p.repose_angle_deg > 0.0 && p.repose_angle_deg < 90.0 {
                    Ok(())
                } else {
                    Err(SizingError::config(format!(
                        "repose angle must lie in (0, 90) degrees, got {}",
                        p.repose_angle_deg
                    )))
                }
            }
        }
    }
}

fn validate_bands(
    kind: CriterionKind,
    bands: &[ResolutionBand],
    positive: impl Fn(&str, f64) -> Result<()>,
) -> Result<()> {
    if bands.is_empty() {
        return Err(SizingError::config(format!(
            "criterion '{}' needs at least one band",
            kind
        )));
    }
    bands.iter().try_for_each(|b| positive("divisor", b.divisor))
}

/// Upper size bound within a depth band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxElementBand {
    /// Maximum size (m)
    pub max_el: f64,
    /// Shallow limit (inclusive)
    #[serde(default = "f64_inf", skip_serializing_if = "is_unbounded")]
    pub upper: f64,
    /// Deep limit (exclusive)
    #[serde(default = "f64_neg_inf", skip_serializing_if = "is_unbounded")]
    pub lower: f64,
}

impl MaxElementBand {
    /// Cap `max_el` within `band`.
    pub fn new(max_el: f64, band: DepthBand) -> Self {
        Self {
            max_el,
            upper: band.upper,
            lower: band.lower,
        }
    }

    /// Depth band of the cap.
    pub fn band(&self) -> DepthBand {
        DepthBand::new(self.upper, self.lower)
    }
}

/// Parameters of one sizing-field construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SizingConfig {
    /// Minimum element size h0 (m)
    pub h0: f64,
    /// Global maximum element size (m)
    pub max_el: f64,
    /// Depth-banded maximum sizes (m), at most three
    pub max_el_bands: Vec<MaxElementBand>,
    /// Maximum size near the boundary (m)
    pub max_el_ns: Option<f64>,
    /// Maximum grade between neighbouring nodes
    pub g: f64,
    /// CFL timestep (s): `None` disables, `Some(0.0)` derives it automatically
    pub dt: Option<f64>,
    /// Floor applied to the channel layer (m), defaults to h0
    pub min_channel_res: Option<f64>,
    /// Iteration budget of the gradient limiter, defaults to the node count
    pub grading_max_iterations: Option<usize>,
    /// Enabled criteria
    pub criteria: Vec<Criterion>,
}

/// Maximum number of depth-banded max_el entries.
pub const MAX_EL_BANDS: usize = 3;

impl SizingConfig {
    /// Configuration with bounds and grade but no criteria.
    pub fn new(h0: f64, max_el: f64, g: f64) -> Self {
        Self {
            h0,
            max_el,
            max_el_bands: Vec::new(),
            max_el_ns: None,
            g,
            dt: None,
            min_channel_res: None,
            grading_max_iterations: None,
            criteria: Vec::new(),
        }
    }

    /// Enable a criterion.
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    /// Add a depth-banded max_el.
    pub fn with_max_el_band(mut self, band: MaxElementBand) -> Self {
        self.max_el_bands.push(band);
        self
    }

    /// Set the nearshore maximum.
    pub fn with_max_el_ns(mut self, max_el_ns: f64) -> Self {
        self.max_el_ns = Some(max_el_ns);
        self
    }

    /// Enable CFL enforcement; `0.0` derives the timestep.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    /// Set the channel floor.
    pub fn with_min_channel_res(mut self, min_channel_res: f64) -> Self {
        self.min_channel_res = Some(min_channel_res);
        self
    }

    /// Set the gradient-limiter iteration budget.
    pub fn with_grading_max_iterations(mut self, iterations: usize) -> Self {
        self.grading_max_iterations = Some(iterations);
        self
    }

    /// Parameters of the criterion of `kind`, if enabled.
    pub fn criterion(&self, kind: CriterionKind) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.kind() == kind)
    }

    /// Whether the criterion of `kind` is enabled.
    pub fn is_enabled(&self, kind: CriterionKind) -> bool {
        self.criterion(kind).is_some()
    }

    /// Effective channel floor (m).
    pub fn channel_floor(&self) -> f64 {
        self.min_channel_res.unwrap_or(self.h0)
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.h0 > 0.0 && self.h0.is_finite()) {
            return Err(SizingError::config(format!("h0 must be positive, got {}", self.h0)));
        }
        if !(self.max_el >= self.h0) {
            return Err(SizingError::config(format!(
                "max_el ({}) must not be below h0 ({})",
                self.max_el, self.h0
            )));
        }
        if !(self.g > 0.0 && self.g.is_finite()) {
            return Err(SizingError::config(format!(
                "grade g must be positive and finite, got {}",
                self.g
            )));
        }
        if self.max_el_bands.len() > MAX_EL_BANDS {
            return Err(SizingError::config(format!(
                "at most {} depth-banded max_el entries are supported, got {}",
                MAX_EL_BANDS,
                self.max_el_bands.len()
            )));
        }
        for band in &self.max_el_bands {
            if !(band.max_el >= self.h0) {
                return Err(SizingError::config(format!(
                    "banded max_el ({}) must not be below h0 ({})",
                    band.max_el, self.h0
                )));
            }
        }
        if let Some(ns) = self.max_el_ns {
            if !(ns >= self.h0) {
                return Err(SizingError::config(format!(
                    "max_el_ns ({}) must not be below h0 ({})",
                    ns, self.h0
                )));
            }
        }
        if let Some(dt) = self.dt {
            if !(dt >= 0.0 && dt.is_finite()) {
                return Err(SizingError::config(format!(
                    "dt must be non-negative, got {}",
                    dt
                )));
            }
        }
        if let Some(floor) = self.min_channel_res {
            if !(floor > 0.0) {
                return Err(SizingError::config(format!(
                    "min_channel_res must be positive, got {}",
                    floor
                )));
            }
        }
        if self.grading_max_iterations == Some(0) {
            return Err(SizingError::config("grading_max_iterations must be at least 1"));
        }
        if self.criteria.is_empty() {
            return Err(SizingError::config("no size criterion enabled"));
        }

        let mut seen = Vec::with_capacity(self.criteria.len());
        for c in &self.criteria {
            if seen.contains(&c.kind()) {
                return Err(SizingError::config(format!(
                    "criterion '{}' given more than once",
                    c.kind()
                )));
            }
            seen.push(c.kind());
            c.validate()?;
        }
        Ok(())
    }

    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json)?;

        let mut criteria = Vec::new();
        for (name, value) in raw.criteria {
            match CriterionKind::from_name(&name) {
                Some(kind) => criteria.push(Criterion::from_json(kind, value)?),
                None => log::warn!("Ignoring unrecognised criterion '{}'", name),
            }
        }
        criteria.sort_by_key(Criterion::kind);

        Ok(Self {
            h0: raw.h0,
            max_el: raw.max_el,
            max_el_bands: raw.max_el_bands,
            max_el_ns: raw.max_el_ns,
            g: raw.g,
            dt: raw.dt,
            min_channel_res: raw.min_channel_res,
            grading_max_iterations: raw.grading_max_iterations,
            criteria,
        })
    }

    /// Read a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// On-disk layout: criteria keyed by name so unknown keys can be skipped.
#[derive(Deserialize)]
struct RawConfig {
    h0: f64,
    max_el: f64,
    #[serde(default)]
    max_el_bands: Vec<MaxElementBand>,
    #[serde(default)]
    max_el_ns: Option<f64>,
    g: f64,
    #[serde(default)]
    dt: Option<f64>,
    #[serde(default)]
    min_channel_res: Option<f64>,
    #[serde(default)]
    grading_max_iterations: Option<usize>,
    #[serde(default)]
    criteria: serde_json::Map<String, serde_json::Value>,
}
