use bevy::prelude::*;

#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum SimulationState {
    /// Zellfeld gehört dem Controller; Bearbeitungsbefehle erlaubt
    #[default]
    Idle,
    /// Pro Frame läuft eine äußere Optimierungsiteration
    Optimizing,
}
