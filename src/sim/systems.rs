// src/sim/systems.rs

use super::{
    commands::CellCommand,
    error::SimError,
    history::CheckpointHistory,
    persistence::SnapshotStore,
    resources::{CellSimulation, ControlPanel},
    state::SimulationState,
};
use crate::debug::visualization::svg::export_cells_svg;
use crate::math::probability::SeedResource;
use bevy::prelude::*;
use std::time::{SystemTime, UNIX_EPOCH};

/// Baut beim Start das erste Zellfeld aus der Standardkonfiguration.
pub fn setup_cell_array_system(
    mut sim: ResMut<CellSimulation>,
    mut seed: ResMut<SeedResource>,
    mut panel: ResMut<ControlPanel>,
) {
    if let Some(s) = sim.config().seed {
        seed.reset_with_new_seed(s);
    }
    info!("Receptor cell spacing simulator, seed {}", seed.seed);
    match sim.initialise(seed.rng_mut()) {
        Ok(()) => panel.status = "Cell array initialised".to_string(),
        Err(e) => {
            warn!("Initial cell array could not be built: {}", e);
            panel.status = e.to_string();
        }
    }
}

/// Arbeitet alle `CellCommand`s dieses Frames ab.
#[allow(clippy::too_many_arguments)]
pub fn handle_cell_commands_system(
    mut events: EventReader<CellCommand>,
    mut sim: ResMut<CellSimulation>,
    mut seed: ResMut<SeedResource>,
    mut store: ResMut<SnapshotStore>,
    mut history: ResMut<CheckpointHistory>,
    mut panel: ResMut<ControlPanel>,
    mut next_state: ResMut<NextState<SimulationState>>,
) {
    for command in events.read() {
        if sim.is_optimizing() && command.edits_cells() {
            warn!("{:?} ignored while the optimizer is running", command);
            panel.status = "Stop the optimizer first".to_string();
            continue;
        }

        let result = match command {
            CellCommand::Initialise => {
                history.clear();
                sim.initialise(seed.rng_mut())
                    .map(|()| "Cell array initialised".to_string())
            }
            CellCommand::LoadSnapshot { path } => sim
                .load_snapshot(path, &store, seed.rng_mut())
                .map(|n| format!("{} cells loaded", n)),
            CellCommand::SaveSnapshot => sim
                .save_snapshot(&mut store)
                .map(|paths| format!("Saved {}", paths.centres.display())),
            CellCommand::EvaluateCost => sim
                .evaluate_cost()
                .map(|report| format!("Cost {:.6}", report.cost)),
            CellCommand::AddCells(count) => sim
                .add_cells(*count, seed.rng_mut())
                .map(|n| format!("{} cells in array", n)),
            CellCommand::RemoveCell(index) => sim
                .remove_cell(*index)
                .map(|()| format!("Cell {} removed", index)),
            CellCommand::AdjustCell {
                index,
                x,
                y,
                radius,
            } => sim
                .adjust_cell(*index, *x, *y, *radius)
                .map(|()| format!("Cell {} adjusted", index)),
            CellCommand::StartOptimization { max_loops } => {
                sim.start_optimization(*max_loops).map(|report| {
                    next_state.set(SimulationState::Optimizing);
                    format!("Optimizing, initial cost {:.6}", report.cost)
                })
            }
            CellCommand::StopOptimization => {
                sim.stop_optimization();
                next_state.set(SimulationState::Idle);
                Ok("Optimization stopped".to_string())
            }
            CellCommand::RestoreCheckpoint(index) => sim
                .restore_checkpoint(*index, &history)
                .map(|()| format!("Checkpoint {} restored", index)),
            CellCommand::ApplyConfig(config) => {
                history.clear();
                store.set_dir(config.checkpoint_dir.clone());
                sim.apply_config(config.clone(), seed.rng_mut())
                    .map(|()| "Configuration applied".to_string())
            }
            CellCommand::ExportSvg => match sim.cells() {
                Some(cells) => {
                    let stamp = SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .map(|d| d.as_secs())
                        .unwrap_or(0);
                    let path = store.dir().join(format!("cells_{}.svg", stamp));
                    export_cells_svg(cells, &path, panel.show_density_areas)
                        .map(|()| format!("Exported {}", path.display()))
                }
                None => Err(SimError::NotInitialised),
            },
        };

        match result {
            Ok(status) => panel.status = status,
            Err(e) => {
                warn!("{:?} failed: {}", command, e);
                panel.status = e.to_string();
            }
        }
    }
}

/// Eine äußere Iteration pro Frame, solange optimiert wird.
pub fn optimization_step_system(
    mut sim: ResMut<CellSimulation>,
    mut store: ResMut<SnapshotStore>,
    mut history: ResMut<CheckpointHistory>,
    mut panel: ResMut<ControlPanel>,
    mut next_state: ResMut<NextState<SimulationState>>,
) {
    if !sim.is_optimizing() {
        next_state.set(SimulationState::Idle);
        return;
    }

    match sim.optimization_step(&mut store, &mut history) {
        Ok(Some(termination)) => {
            panel.status = termination.message().to_string();
            next_state.set(SimulationState::Idle);
        }
        Ok(None) => {}
        Err(e) => {
            warn!("Optimization aborted: {}", e);
            panel.status = e.to_string();
            next_state.set(SimulationState::Idle);
        }
    }
}
