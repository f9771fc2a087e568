//! Machine-readable record accompanying a finished sizing field.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::CriterionKind;
use crate::criteria::SkippedChannelPoint;

/// The criteria that contributed to a sizing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledCriteria(Vec<CriterionKind>);

impl EnabledCriteria {
    /// Record `kinds`, sorted and deduplicated.
    pub fn new(kinds: impl IntoIterator<Item = CriterionKind>) -> Self {
        let mut kinds: Vec<_> = kinds.into_iter().collect();
        kinds.sort();
        kinds.dedup();
        Self(kinds)
    }

    /// Whether `kind` contributed.
    pub fn contains(&self, kind: CriterionKind) -> bool {
        self.0.contains(&kind)
    }

    /// Contributing criteria in pipeline order.
    pub fn kinds(&self) -> &[CriterionKind] {
        &self.0
    }

    /// Short configuration keys, e.g. `["dis", "wl"]`.
    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|k| k.short_name()).collect()
    }
}

impl fmt::Display for EnabledCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(", "))
    }
}

/// Non-fatal events recorded while building a sizing field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizingDiagnostics {
    /// Gradient-limiter sweeps
    pub grading_iterations: usize,
    /// Channel vertices skipped for oversized stencils
    pub skipped_channel_points: Vec<SkippedChannelPoint>,
    /// Nodes undefined in every layer, filled with max_el
    pub nan_filled_nodes: usize,
    /// Nodes raised by the CFL constraint after grading
    pub cfl_adjusted_nodes: usize,
    /// Neighbour pairs exceeding the grade after the CFL pass
    pub grade_violations: usize,
    /// Nodes above their max_el after the CFL pass
    pub ceiling_violations: usize,
}

impl SizingDiagnostics {
    /// Whether anything was skipped, filled or left in conflict.
    pub fn has_warnings(&self) -> bool {
        !self.skipped_channel_points.is_empty()
            || self.nan_filled_nodes > 0
            || self.grade_violations > 0
            || self.ceiling_violations > 0
    }
}

impl fmt::Display for SizingDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sizing diagnostics:")?;
        writeln!(f, "  Grading iterations: {}", self.grading_iterations)?;
        writeln!(
            f,
            "  Skipped channel points: {}",
            self.skipped_channel_points.len()
        )?;
        writeln!(f, "  NaN-filled nodes: {}", self.nan_filled_nodes)?;
        writeln!(f, "  CFL-adjusted nodes: {}", self.cfl_adjusted_nodes)?;
        write!(
            f,
            "  Post-CFL violations: {} grade, {} ceiling",
            self.grade_violations, self.ceiling_violations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_sorted() {
        let enabled = EnabledCriteria::new([
            CriterionKind::Slope,
            CriterionKind::Distance,
            CriterionKind::Slope,
        ]);
        assert_eq!(enabled.names(), vec!["dis", "slp"]);
        assert!(enabled.contains(CriterionKind::Distance));
        assert!(!enabled.contains(CriterionKind::Channel));
        assert_eq!(enabled.to_string(), "dis, slp");
    }

    #[test]
    fn test_warnings() {
        let mut diag = SizingDiagnostics::default();
        assert!(!diag.has_warnings());
        diag.nan_filled_nodes = 2;
        assert!(diag.has_warnings());
    }
}
