// src/sim/mod.rs

// Anwendungsschicht: Befehle, Zustände und Ressourcen rund um das Zellfeld
pub mod commands;
pub mod error;
pub mod history;
pub mod persistence;
pub mod resources;
pub mod state;
pub mod systems;
