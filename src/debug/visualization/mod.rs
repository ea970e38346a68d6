// src/debug/visualization/mod.rs
pub mod cells;
pub mod svg;
