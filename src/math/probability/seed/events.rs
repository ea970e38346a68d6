use bevy::prelude::*;

/// Setzt den Zufallsgenerator der Anwendung auf einen neuen Seed zurück.
#[derive(Event, Debug, Clone)]
pub struct SeedChangedEvent {
    pub new_seed: u64,
}
