// src/sim/resources.rs

use super::{
    error::{SimError, SimResult},
    history::{CheckpointHistory, Checkpointer},
    persistence::{CellSnapshot, SnapshotPaths, SnapshotStore},
};
use crate::math::{
    optimization::{IterationReport, OptimizerRun, OptimizerState, Termination, report_header},
    point_distribution::{CellArray, SpacingConfig},
    types::Point2D,
};
use bevy::prelude::*;
use rand::Rng;
use std::path::Path;

/// Zellfeld, laufende Optimierung und letzte Ergebnisse.
///
/// Einziger Schreiber des Zellfeldes ist entweder der Controller (im
/// Leerlauf) oder der Optimierungslauf; die Methoden prüfen das.
#[derive(Resource)]
pub struct CellSimulation {
    config: SpacingConfig,
    cells: Option<CellArray>,
    run: Option<OptimizerRun>,
    pub last_report: Option<IterationReport>,
    pub last_termination: Option<Termination>,
}

impl CellSimulation {
    pub fn new(config: SpacingConfig) -> Self {
        Self {
            config,
            cells: None,
            run: None,
            last_report: None,
            last_termination: None,
        }
    }

    pub fn config(&self) -> &SpacingConfig {
        &self.config
    }

    pub fn cells(&self) -> Option<&CellArray> {
        self.cells.as_ref()
    }

    pub fn run(&self) -> Option<&OptimizerRun> {
        self.run.as_ref()
    }

    pub fn is_optimizing(&self) -> bool {
        self.run.as_ref().is_some_and(|run| run.is_running())
    }

    fn cells_mut(&mut self) -> SimResult<&mut CellArray> {
        if self.is_optimizing() {
            return Err(SimError::Busy);
        }
        self.cells.as_mut().ok_or(SimError::NotInitialised)
    }

    /// Neues Zellfeld mit frisch gezogenen Radien und Startpositionen.
    pub fn initialise<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SimResult<()> {
        if self.is_optimizing() {
            return Err(SimError::Busy);
        }
        let mut cells = CellArray::new(self.config.clone(), rng)?;
        cells.seed_positions(rng);
        info!(
            "Cell array initialised: {} cells on {}, radius {}, grid spacing {}, {} neighbours, coverage {:.3}",
            cells.len(),
            cells.domain(),
            self.config.avg_radius,
            self.config.grid_spacing,
            self.config.num_neighbours,
            cells.mean_coverage()
        );
        self.cells = Some(cells);
        self.last_report = None;
        self.last_termination = None;
        Ok(())
    }

    /// Übernimmt eine geprüfte Konfiguration und baut das Zellfeld neu auf.
    pub fn apply_config<R: Rng + ?Sized>(
        &mut self,
        config: SpacingConfig,
        rng: &mut R,
    ) -> SimResult<()> {
        if self.is_optimizing() {
            return Err(SimError::Busy);
        }
        config.validate()?;
        let previous = std::mem::replace(&mut self.config, config);
        if let Err(e) = self.initialise(rng) {
            self.config = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Lädt einen Snapshot. Passt die Zellzahl nicht zur Konfiguration, wird
    /// gewarnt und die geladene Zahl übernommen. Fehlt das Zellfeld, wird es
    /// aus der Konfiguration angelegt.
    pub fn load_snapshot<R: Rng + ?Sized>(
        &mut self,
        path: &Path,
        store: &SnapshotStore,
        rng: &mut R,
    ) -> SimResult<usize> {
        if self.is_optimizing() {
            return Err(SimError::Busy);
        }
        let snapshot = store.load(path)?;
        let expected = self.config.num_cells;
        if let Err(e) = snapshot.check_shape(expected) {
            warn!("Loaded cell array data does not match current array size: {}", e);
        }

        if self.cells.is_none() {
            self.cells = Some(CellArray::new(self.config.clone(), rng)?);
        }
        let cells = self.cells_mut()?;
        cells.restore(&snapshot.coordinates, &snapshot.radii)?;
        let count = cells.len();
        self.config.num_cells = count;
        info!("{} data points loaded from file {}", snapshot.coordinates.len(), path.display());
        Ok(count)
    }

    pub fn save_snapshot(&self, store: &mut SnapshotStore) -> SimResult<SnapshotPaths> {
        let cells = self.cells.as_ref().ok_or(SimError::NotInitialised)?;
        let iteration = self.run.as_ref().map_or(0, |run| run.iteration());
        let paths = store.save(&CellSnapshot::from_cells(iteration, cells))?;
        info!("Data saved to file: {}", paths.centres.display());
        Ok(paths)
    }

    /// Berechnet Kosten und Kennzahlen des aktuellen Standes.
    pub fn evaluate_cost(&mut self) -> SimResult<IterationReport> {
        let iteration = self.run.as_ref().map_or(0, |run| run.iteration());
        let cells = self.cells.as_mut().ok_or(SimError::NotInitialised)?;
        let positions = cells.positions();
        let cost = cells.evaluate_cost(positions.as_slice())?;
        let report = IterationReport {
            iteration,
            cost,
            diagnostics: cells.diagnostics(),
        };
        info!("{}", report_header());
        info!("{}", report);
        self.last_report = Some(report);
        Ok(report)
    }

    pub fn add_cells<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> SimResult<usize> {
        let cells = self.cells_mut()?;
        for _ in 0..count {
            let index = cells.add_cell(rng);
            debug!("Cell {} added at {:?}", index, cells.centers()[index]);
        }
        let total = cells.len();
        self.config.num_cells = total;
        info!("{} cells added, {} cells in array", count, total);
        Ok(total)
    }

    pub fn remove_cell(&mut self, index: usize) -> SimResult<()> {
        let cells = self.cells_mut()?;
        cells.remove_cell(index)?;
        let total = cells.len();
        self.config.num_cells = total;
        info!("Cell {} removed, {} cells in array", index, total);
        Ok(())
    }

    pub fn adjust_cell(&mut self, index: usize, x: f64, y: f64, radius: f64) -> SimResult<()> {
        let cells = self.cells_mut()?;
        cells.adjust_cell(index, Point2D::new(x, y), radius)?;
        info!("Cell {} (x, y, r) changed to ({}, {}, {})", index, x, y, radius);
        Ok(())
    }

    pub fn start_optimization(&mut self, max_loops: usize) -> SimResult<IterationReport> {
        let mut run = OptimizerRun::new(&self.config).with_max_outer_loops(max_loops);
        let cells = self.cells_mut()?;
        let report = run.start(cells)?;
        self.run = Some(run);
        self.last_report = Some(report);
        self.last_termination = None;
        Ok(report)
    }

    /// Eine äußere Iteration. Liefert das Abbruchergebnis, sobald der Lauf endet.
    pub fn optimization_step(
        &mut self,
        store: &mut SnapshotStore,
        history: &mut CheckpointHistory,
    ) -> SimResult<Option<Termination>> {
        let (Some(run), Some(cells)) = (self.run.as_mut(), self.cells.as_mut()) else {
            return Err(SimError::NotInitialised);
        };

        let mut sink = Checkpointer { store, history };
        let step = run.step(cells, &mut sink);
        let state = run.state();
        let report = match step {
            Ok(report) => report,
            Err(e) => {
                self.run = None;
                return Err(e.into());
            }
        };
        self.last_report = Some(report);

        if let OptimizerState::Finished(termination) = state {
            self.last_termination = Some(termination);
            self.run = None;
            return Ok(Some(termination));
        }
        Ok(None)
    }

    pub fn stop_optimization(&mut self) {
        if let Some(run) = self.run.take() {
            info!("Optimization stopped after {} loops", run.iteration());
        }
    }

    /// Übernimmt den Checkpoint `index` aus dem Verlauf.
    pub fn restore_checkpoint(&mut self, index: usize, history: &CheckpointHistory) -> SimResult<()> {
        let snapshot = history
            .get_snapshot_by_index(index)
            .ok_or(SimError::MissingCheckpoint(index))?;
        let cells = self.cells_mut()?;
        cells.restore(&snapshot.coordinates, &snapshot.radii)?;
        let total = cells.len();
        self.config.num_cells = total;
        info!("Checkpoint of loop {} restored", snapshot.iteration);
        Ok(())
    }
}

impl Default for CellSimulation {
    fn default() -> Self {
        Self::new(SpacingConfig::default())
    }
}

/// Eingabefelder des Bedienpanels, bevor sie als `CellCommand` abgeschickt werden.
#[derive(Resource, Debug, Clone)]
pub struct ControlPanel {
    pub draft_config: SpacingConfig,
    pub max_loops: usize,
    pub add_count: usize,
    pub cell_index: usize,
    pub edit_x: f64,
    pub edit_y: f64,
    pub edit_radius: f64,
    pub snapshot_path: String,
    pub checkpoint_index: usize,
    pub seed_text: String,
    pub show_density_areas: bool,
    pub status: String,
}

impl ControlPanel {
    pub fn new(config: &SpacingConfig) -> Self {
        Self {
            draft_config: config.clone(),
            max_loops: config.max_outer_loops,
            add_count: 1,
            cell_index: 0,
            edit_x: 0.0,
            edit_y: 0.0,
            edit_radius: config.avg_radius,
            snapshot_path: String::new(),
            checkpoint_index: 0,
            seed_text: String::new(),
            show_density_areas: false,
            status: String::new(),
        }
    }
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new(&SpacingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn small_config() -> SpacingConfig {
        SpacingConfig::new()
            .with_cells(5)
            .with_dimensions(5.0, 5.0)
            .with_radius(0.3, 0.1)
            .with_neighbours(2)
            .with_grid_spacing(1.0)
            .with_iterations(1, 3)
    }

    fn scratch_store(name: &str) -> SnapshotStore {
        let dir = std::env::temp_dir().join(format!(
            "cell_spacing_sim_ctl_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        SnapshotStore::new(dir)
    }

    #[test]
    fn test_commands_need_initialised_array() {
        let mut sim = CellSimulation::new(small_config());
        assert!(matches!(sim.evaluate_cost(), Err(SimError::NotInitialised)));
        assert!(matches!(sim.remove_cell(0), Err(SimError::NotInitialised)));
    }

    #[test]
    fn test_edit_commands_update_cell_count() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut sim = CellSimulation::new(small_config());
        sim.initialise(&mut rng).unwrap();

        assert_eq!(sim.add_cells(2, &mut rng).unwrap(), 7);
        sim.remove_cell(0).unwrap();
        assert_eq!(sim.config().num_cells, 6);
        sim.adjust_cell(1, 2.0, -1.0, 0.25).unwrap();
        let cells = sim.cells().unwrap();
        assert_eq!(cells.centers()[1], Point2D::new(2.0, 4.0));
        assert_eq!(cells.radii()[1], 0.25);
    }

    #[test]
    fn test_invalid_config_is_rejected_and_kept() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut sim = CellSimulation::new(small_config());
        sim.initialise(&mut rng).unwrap();

        let bad = small_config().with_neighbours(5);
        assert!(sim.apply_config(bad, &mut rng).is_err());
        assert_eq!(sim.config().num_neighbours, 2);
        assert_eq!(sim.cells().unwrap().len(), 5);
    }

    #[test]
    fn test_run_checkpoints_and_finishes() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut store = scratch_store("run");
        let mut history = CheckpointHistory::new(10);
        let mut sim = CellSimulation::new(small_config());
        sim.initialise(&mut rng).unwrap();

        sim.start_optimization(3).unwrap();
        assert!(sim.is_optimizing());
        assert!(matches!(sim.add_cells(1, &mut rng), Err(SimError::Busy)));

        let mut termination = None;
        for _ in 0..3 {
            termination = sim.optimization_step(&mut store, &mut history).unwrap();
            if termination.is_some() {
                break;
            }
        }
        assert!(termination.is_some());
        assert!(!sim.is_optimizing());
        assert_eq!(sim.last_termination, termination);
        assert!(!history.is_empty());

        // Zurück zum ersten Checkpoint
        let first = history.get_snapshot_by_index(0).unwrap().clone();
        sim.restore_checkpoint(0, &history).unwrap();
        assert_eq!(
            sim.cells().unwrap().positions().as_slice(),
            first.coordinates.as_slice()
        );
        assert!(matches!(
            sim.restore_checkpoint(99, &history),
            Err(SimError::MissingCheckpoint(99))
        ));
        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[test]
    fn test_loading_other_size_adopts_count() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut store = scratch_store("load");
        let mut sim = CellSimulation::new(small_config());
        sim.initialise(&mut rng).unwrap();
        sim.add_cells(3, &mut rng).unwrap();
        let paths = sim.save_snapshot(&mut store).unwrap();

        let mut other = CellSimulation::new(small_config());
        other.initialise(&mut rng).unwrap();
        assert_eq!(other.load_snapshot(&paths.centres, &store, &mut rng).unwrap(), 8);
        assert_eq!(other.config().num_cells, 8);
        assert_eq!(
            other.cells().unwrap().radii(),
            sim.cells().unwrap().radii()
        );
        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[test]
    fn test_loading_without_array_builds_one() {
        let mut rng = StdRng::seed_from_u64(15);
        let mut store = scratch_store("load_fresh");
        let mut sim = CellSimulation::new(small_config());
        sim.initialise(&mut rng).unwrap();
        let paths = sim.save_snapshot(&mut store).unwrap();

        let mut fresh = CellSimulation::new(small_config());
        assert!(fresh.cells().is_none());
        assert_eq!(fresh.load_snapshot(&paths.centres, &store, &mut rng).unwrap(), 5);
        let cells = fresh.cells().unwrap();
        assert_eq!(cells.radii(), sim.cells().unwrap().radii());
        assert_eq!(cells.positions(), sim.cells().unwrap().positions());
        let _ = std::fs::remove_dir_all(store.dir());
    }
}
