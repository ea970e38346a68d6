// src/math/optimization/driver.rs

use super::{
    minimizer::{Minimizer, minimizer_for},
    report::{IterationReport, report_header},
};
use crate::math::{
    error::{MathError, MathResult},
    point_distribution::{CellArray, SpacingConfig},
};
use bevy::log::{info, trace};
use nalgebra::DVector;
use std::collections::VecDeque;

/// Länge des Fensters für die Stillstandserkennung.
pub const COST_WINDOW_LEN: usize = 5;
/// Startbelegung des Fensters: verschieden und größer als jede echte Kostenzahl.
const COST_WINDOW_SENTINELS: [f64; COST_WINDOW_LEN] = [9e9, 8e9, 7e9, 6e9, 5e9];

/// Warum ein Optimierungslauf endete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Kosten unter dem Ziel
    Converged,
    /// Die letzten fünf Kostenwerte sind bitgleich
    Stalled,
    /// Maximale Anzahl äußerer Iterationen erreicht
    Exhausted,
}

impl Termination {
    pub fn message(&self) -> &'static str {
        match self {
            Termination::Converged => "Cost goal reached.",
            Termination::Stalled => "Failed to converge.",
            Termination::Exhausted => "Maximum iteration loops reached.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizerState {
    #[default]
    Idle,
    RunningInner,
    Finished(Termination),
}

/// Empfänger der Zwischenstände nach jeder äußeren Iteration.
///
/// Fehler beim Sichern sind Sache der Implementierung; der Lauf geht weiter.
pub trait CheckpointSink {
    fn checkpoint(&mut self, iteration: usize, cells: &CellArray);
}

/// Verwirft alle Zwischenstände.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCheckpoints;

impl CheckpointSink for NoCheckpoints {
    fn checkpoint(&mut self, _iteration: usize, _cells: &CellArray) {}
}

/// Gleitendes Fenster der letzten Kostenwerte.
#[derive(Debug, Clone, PartialEq)]
pub struct CostWindow {
    values: VecDeque<f64>,
}

impl Default for CostWindow {
    fn default() -> Self {
        Self {
            values: COST_WINDOW_SENTINELS.into_iter().collect(),
        }
    }
}

impl CostWindow {
    /// Ältesten Wert verwerfen, `cost` hinten anhängen.
    pub fn push(&mut self, cost: f64) {
        self.values.pop_front();
        self.values.push_back(cost);
    }

    /// `true`, wenn alle Werte bitweise identisch sind.
    pub fn is_flat(&self) -> bool {
        let mut bits = self.values.iter().map(|v| v.to_bits());
        match bits.next() {
            Some(first) => bits.all(|b| b == first),
            None => true,
        }
    }
}

/// Ein Optimierungslauf über ein [`CellArray`].
///
/// Zustände: `Idle -> RunningInner -> Finished(Converged | Stalled | Exhausted)`.
/// Jeder Aufruf von [`OptimizerRun::step`] führt genau eine äußere Iteration
/// aus; dazwischen gehört das Zellfeld wieder dem Aufrufer.
pub struct OptimizerRun {
    minimizer: Box<dyn Minimizer>,
    cost_goal: f64,
    max_inner_iterations: usize,
    max_outer_loops: usize,
    iteration: usize,
    window: CostWindow,
    state: OptimizerState,
    reports: Vec<IterationReport>,
}

impl OptimizerRun {
    pub fn new(config: &SpacingConfig) -> Self {
        Self::with_minimizer(config, minimizer_for(config.minimizer))
    }

    pub fn with_minimizer(config: &SpacingConfig, minimizer: Box<dyn Minimizer>) -> Self {
        Self {
            minimizer,
            cost_goal: config.cost_goal,
            max_inner_iterations: config.max_inner_iterations,
            max_outer_loops: config.max_outer_loops,
            iteration: 0,
            window: CostWindow::default(),
            state: OptimizerState::Idle,
            reports: Vec::new(),
        }
    }

    /// Überschreibt die Obergrenze äußerer Iterationen für diesen Lauf.
    pub fn with_max_outer_loops(mut self, max_loops: usize) -> Self {
        self.max_outer_loops = max_loops;
        self
    }

    pub fn state(&self) -> OptimizerState {
        self.state
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn max_outer_loops(&self) -> usize {
        self.max_outer_loops
    }

    /// Alle Berichtszeilen dieses Laufs, beginnend mit Iteration 0.
    pub fn reports(&self) -> &[IterationReport] {
        &self.reports
    }

    pub fn is_running(&self) -> bool {
        self.state == OptimizerState::RunningInner
    }

    /// Prüft die Vorbedingungen, wertet die Startkosten aus und meldet Iteration 0.
    pub fn start(&mut self, cells: &mut CellArray) -> MathResult<IterationReport> {
        if self.state != OptimizerState::Idle {
            return Err(MathError::InvalidState {
                message: format!("Optimizer run already started ({:?})", self.state),
            });
        }
        if self.max_outer_loops == 0 {
            return Err(MathError::InvalidConfiguration {
                message: "Maximum number of loops must be greater than 0".to_string(),
            });
        }
        cells.validate_for_optimization()?;

        let cost = cells.refresh();
        info!(
            "Optimization started: {} cells, {} minimizer, max {} loops",
            cells.len(),
            self.minimizer.name(),
            self.max_outer_loops
        );
        info!("{}", report_header());
        let report = self.record(cells, cost);
        self.state = OptimizerState::RunningInner;
        Ok(report)
    }

    /// Eine äußere Iteration: begrenzter Minimiererlauf, Neuauswertung am
    /// Ergebnis, Bericht, Checkpoint und Abbruchprüfung.
    pub fn step(
        &mut self,
        cells: &mut CellArray,
        sink: &mut dyn CheckpointSink,
    ) -> MathResult<IterationReport> {
        if !self.is_running() {
            return Err(MathError::InvalidState {
                message: format!("Optimizer is not running ({:?})", self.state),
            });
        }
        // Das Zellfeld kann zwischen zwei Schritten bearbeitet worden sein
        cells.validate_for_optimization()?;

        let x0 = cells.positions();
        let iteration = self.iteration + 1;
        let outcome = {
            let mut objective = |x: &DVector<f64>| match cells.evaluate_cost(x.as_slice()) {
                Ok(cost) => {
                    trace!(
                        "{}",
                        IterationReport {
                            iteration,
                            cost,
                            diagnostics: cells.diagnostics(),
                        }
                    );
                    cost
                }
                Err(e) => {
                    trace!("evaluation rejected: {}", e);
                    f64::INFINITY
                }
            };
            self.minimizer
                .minimize(&mut objective, x0, self.max_inner_iterations)
        };
        // Die letzte Auswertung des Minimierers muss nicht am besten Punkt liegen
        let cost = cells.evaluate_cost(outcome.x.as_slice())?;
        self.iteration += 1;

        let report = self.record(cells, cost);
        self.window.push(cost);
        sink.checkpoint(self.iteration, cells);

        if let Some(termination) = self.check_termination(cost) {
            info!("{}", termination.message());
            info!("Iteration loops completed: {}", self.iteration);
            self.state = OptimizerState::Finished(termination);
        }
        Ok(report)
    }

    /// Startet den Lauf (falls nötig) und iteriert bis zum Ende.
    pub fn run_to_completion(
        &mut self,
        cells: &mut CellArray,
        sink: &mut dyn CheckpointSink,
    ) -> MathResult<Termination> {
        if self.state == OptimizerState::Idle {
            self.start(cells)?;
        }
        while self.is_running() {
            self.step(cells, sink)?;
        }
        match self.state {
            OptimizerState::Finished(termination) => Ok(termination),
            other => Err(MathError::InvalidState {
                message: format!("Optimizer ended in unexpected state {:?}", other),
            }),
        }
    }

    /// Reihenfolge: Ziel erreicht, Stillstand, Iterationslimit.
    fn check_termination(&self, cost: f64) -> Option<Termination> {
        if cost < self.cost_goal {
            Some(Termination::Converged)
        } else if self.window.is_flat() {
            Some(Termination::Stalled)
        } else if self.iteration >= self.max_outer_loops {
            Some(Termination::Exhausted)
        } else {
            None
        }
    }

    fn record(&mut self, cells: &CellArray, cost: f64) -> IterationReport {
        let report = IterationReport {
            iteration: self.iteration,
            cost,
            diagnostics: cells.diagnostics(),
        };
        info!("{}", report);
        self.reports.push(report);
        report
    }
}
