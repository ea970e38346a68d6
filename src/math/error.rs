// src/math/error.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient points for operation: expected at least {expected}, got {actual}")]
    InsufficientPoints { expected: usize, actual: usize },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Cell index {index} out of range for {len} cells")]
    CellIndexOutOfRange { index: usize, len: usize },

    #[error("Dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Coordinate {index} is not finite: {value}")]
    NonFiniteCoordinate { index: usize, value: f64 },

    #[error("Invalid state: {message}")]
    InvalidState { message: String },
}

pub type MathResult<T> = Result<T, MathError>;
