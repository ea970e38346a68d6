// ./src/main.rs
use bevy::prelude::*;
use bevy_egui::EguiPlugin;

// Eigene Module deklarieren
pub mod debug;
pub mod math;
pub mod setup; // Kamera-Setup
pub mod sim;

use debug::{ui::cell_control_ui_system, visualization::cells::draw_cells_system};
use math::point_distribution::SpacingConfig;
use math::probability::SeedPlugin;
use setup::setup_scene;
use sim::commands::CellCommand;
use sim::history::CheckpointHistory;
use sim::persistence::SnapshotStore;
use sim::resources::{CellSimulation, ControlPanel};
use sim::state::SimulationState;
use sim::systems::*;

fn main() {
    let config = SpacingConfig::default();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Receptor Cell Spacing".to_string(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .add_plugins(SeedPlugin)
        .add_event::<CellCommand>()
        .init_state::<SimulationState>()
        .insert_resource(SnapshotStore::new(config.checkpoint_dir.clone()))
        .insert_resource(ControlPanel::new(&config))
        .insert_resource(CellSimulation::new(config))
        .init_resource::<CheckpointHistory>()
        .add_systems(Startup, (setup_scene, setup_cell_array_system))
        .add_systems(
            Update,
            (
                // UI -> Befehle -> eine Optimierungsschleife pro Frame
                cell_control_ui_system,
                handle_cell_commands_system,
                optimization_step_system.run_if(in_state(SimulationState::Optimizing)),
            )
                .chain(),
        )
        .add_systems(Update, draw_cells_system)
        .run();
}
