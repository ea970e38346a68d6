//! Bevy `Plugin` für die seed-basierte Zufallsquelle.
//!
//! Registriert die `SeedResource` und reagiert auf `SeedChangedEvent`.

use super::{events::SeedChangedEvent, resource::SeedResource};
use bevy::prelude::*;

/// Verwaltet die globale `SeedResource`.
///
/// - Initialisiert die `SeedResource`, falls noch keine existiert.
/// - Registriert `SeedChangedEvent`.
/// - Fügt `seed_changed_event_handler` hinzu, der die Resource neu startet.
pub struct SeedPlugin;

impl Plugin for SeedPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SeedResource>()
            .add_event::<SeedChangedEvent>()
            .add_systems(Update, seed_changed_event_handler);
    }
}

fn seed_changed_event_handler(
    mut events: EventReader<SeedChangedEvent>,
    mut seed_resource: ResMut<SeedResource>,
) {
    for event in events.read() {
        info!(
            "SeedResource is being updated due to SeedChangedEvent: {}",
            event.new_seed
        );
        seed_resource.reset_with_new_seed(event.new_seed);
    }
}
