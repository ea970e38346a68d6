// src/math/optimization/report.rs

use crate::math::point_distribution::SpacingDiagnostics;
use std::fmt;

/// Kopfzeile passend zu [`IterationReport`]s `Display`.
pub fn report_header() -> String {
    format!(
        "{:^4} {:^10} {:^10} {:^10} {:^10}",
        "Iter", "Error", "avgSpacing", "IFSD'", "DenStDev"
    )
}

/// Eine Zeile des Fortschrittsberichts nach einer äußeren Iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport {
    pub iteration: usize,
    pub cost: f64,
    pub diagnostics: SpacingDiagnostics,
}

impl fmt::Display for IterationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:4} {:10.6} {:10.3} {:10.6} {:10.6}",
            self.iteration,
            self.cost,
            self.diagnostics.mean_spacing,
            self.diagnostics.spacing_deviation,
            self.diagnostics.density_std
        )
    }
}
