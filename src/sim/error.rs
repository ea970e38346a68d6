// src/sim/error.rs
use super::persistence::PersistenceError;
use crate::math::error::MathError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error(transparent)]
    Math(#[from] MathError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("No cell array initialised")]
    NotInitialised,

    #[error("Command not allowed while the optimizer is running")]
    Busy,

    #[error("No checkpoint at history index {0}")]
    MissingCheckpoint(usize),

    #[error("SVG export to {} failed: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type SimResult<T> = Result<T, SimError>;
