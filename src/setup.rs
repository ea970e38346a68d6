// ./src/setup.rs
use bevy::prelude::*;

pub fn setup_scene(mut commands: Commands) {
    // Kamera (2D, Ursprung in der Bildmitte)
    commands.spawn(Camera2dBundle::default());
}
