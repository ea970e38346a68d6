// src/math/optimization/minimizer.rs

use super::{nelder_mead::NelderMead, powell::Powell};
use crate::math::point_distribution::MinimizerKind;
use nalgebra::DVector;

/// Zielfunktion eines Minimierers. `FnMut`, weil die Kostenfunktion des
/// Zellfeldes bei jeder Auswertung dessen abgeleitete Sichten neu aufbaut.
pub type Objective<'a> = dyn FnMut(&DVector<f64>) -> f64 + 'a;

/// Ergebnis eines begrenzten Minimierungslaufs.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizeOutcome {
    /// Bester gefundener Punkt
    pub x: DVector<f64>,
    /// Funktionswert an `x`
    pub fun: f64,
    pub iterations: usize,
    pub evaluations: usize,
    /// `true`, wenn das interne Abbruchkriterium griff und nicht das Iterationslimit
    pub converged: bool,
}

/// Ableitungsfreier Minimierer für die innere Optimierungsschleife.
///
/// Implementierungen dürfen die Zielfunktion beliebig oft auswerten, halten
/// aber `max_iterations` als Obergrenze ihrer Hauptschleife ein.
pub trait Minimizer: Send + Sync {
    /// Kurzer Name für Log-Ausgaben.
    fn name(&self) -> &'static str;

    /// Minimiert `objective` ausgehend von `x0`.
    ///
    /// # Arguments
    ///
    /// * `objective` - Die Zielfunktion.
    /// * `x0` - Startpunkt; seine Länge bestimmt die Dimension.
    /// * `max_iterations` - Obergrenze der Iterationen dieses Aufrufs.
    fn minimize(
        &self,
        objective: &mut Objective<'_>,
        x0: DVector<f64>,
        max_iterations: usize,
    ) -> MinimizeOutcome;
}

/// Erstellt den in der Konfiguration gewählten Minimierer.
pub fn minimizer_for(kind: MinimizerKind) -> Box<dyn Minimizer> {
    match kind {
        MinimizerKind::Powell => Box::new(Powell::default()),
        MinimizerKind::NelderMead => Box::new(NelderMead::default()),
    }
}

/// Zählt die Auswertungen einer Zielfunktion.
pub(crate) struct CountingObjective<'o, 'a> {
    objective: &'o mut Objective<'a>,
    pub evaluations: usize,
}

impl<'o, 'a> CountingObjective<'o, 'a> {
    pub fn new(objective: &'o mut Objective<'a>) -> Self {
        Self {
            objective,
            evaluations: 0,
        }
    }

    pub fn eval(&mut self, x: &DVector<f64>) -> f64 {
        self.evaluations += 1;
        (self.objective)(x)
    }
}
