// src/math/optimization/mod.rs

pub mod driver;
pub mod line_search;
pub mod minimizer;
pub mod nelder_mead;
pub mod powell;
pub mod report;

pub use self::driver::{
    CheckpointSink, CostWindow, NoCheckpoints, OptimizerRun, OptimizerState, Termination,
};
pub use self::minimizer::{MinimizeOutcome, Minimizer, minimizer_for};
pub use self::nelder_mead::NelderMead;
pub use self::powell::Powell;
pub use self::report::{IterationReport, report_header};
