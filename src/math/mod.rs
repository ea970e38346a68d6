pub mod error;
pub mod geometry;
pub mod optimization;
pub mod point_distribution;
pub mod probability;
pub mod scalar_field;
pub mod spatial;
pub mod types;
pub mod utils;

// Re-exports für einfache Verwendung
pub use error::{MathError, MathResult};
pub use types::*;

// Öffentliche API
pub mod prelude {
    pub use super::{
        error::{MathError, MathResult},
        geometry::{circle_area, exact_circle_overlap_area},
        optimization::{Minimizer, OptimizerRun, Termination, minimizer_for},
        point_distribution::{CellArray, DensityGrid, SpacingConfig},
        probability::SeedResource,
        spatial::{NeighborTable, TorusIndex},
        types::*,
    };
}
