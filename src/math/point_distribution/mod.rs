// src/math/point_distribution/mod.rs

// Zellfeld auf dem Torus: Konfiguration, abgeleitete Sichten, Kosten und Startverteilung
pub mod cell_array;
pub mod config;
pub mod cost;
pub mod density;
pub mod diagnostics;
pub mod sampler;

pub use self::cell_array::CellArray;
pub use self::config::{MinimizerKind, SeedingStrategy, SpacingConfig};
pub use self::density::DensityGrid;
pub use self::diagnostics::SpacingDiagnostics;
pub use self::sampler::LowDensitySampler;
