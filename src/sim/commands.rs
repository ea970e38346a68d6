// src/sim/commands.rs
use crate::math::point_distribution::SpacingConfig;
use bevy::prelude::*;
use std::path::PathBuf;

/// Alle Bedienaktionen auf das Zellfeld. Das UI schickt sie als Events,
/// `handle_cell_commands_system` arbeitet sie der Reihe nach ab.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum CellCommand {
    /// Neues Zellfeld aus der aktuellen Konfiguration
    Initialise,
    /// Snapshot über den Pfad der `centres_*`-Datei laden
    LoadSnapshot { path: PathBuf },
    SaveSnapshot,
    /// Kosten und Kennzahlen berechnen und melden
    EvaluateCost,
    AddCells(usize),
    RemoveCell(usize),
    AdjustCell {
        index: usize,
        x: f64,
        y: f64,
        radius: f64,
    },
    StartOptimization { max_loops: usize },
    StopOptimization,
    /// Stand aus dem Checkpoint-Verlauf übernehmen (Index im Verlauf)
    RestoreCheckpoint(usize),
    /// Neue Konfiguration übernehmen und das Zellfeld neu aufbauen
    ApplyConfig(SpacingConfig),
    ExportSvg,
}

impl CellCommand {
    /// Befehle, die das Zellfeld verändern und deshalb nur im Leerlauf erlaubt sind.
    pub fn edits_cells(&self) -> bool {
        !matches!(
            self,
            CellCommand::SaveSnapshot
                | CellCommand::EvaluateCost
                | CellCommand::StopOptimization
                | CellCommand::ExportSvg
        )
    }
}
