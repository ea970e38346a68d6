// src/math/types/mod.rs
pub mod domain;

pub use domain::*;

// Einheitliche Typen für das gesamte Modul
pub type Point2D = nalgebra::Point2<f64>;
pub type Vector2D = nalgebra::Vector2<f64>;
