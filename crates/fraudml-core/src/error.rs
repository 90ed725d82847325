use thiserror::Error;

/// Error type shared by every numeric component (fitting, transforming, scoring).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MlError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Index out of bounds: index {index} for axis {axis} with size {size}")]
    IndexOutOfBounds {
        index: usize,
        axis: usize,
        size: usize,
    },

    #[error("Empty matrix")]
    EmptyMatrix,

    #[error("Model not fitted: {0}")]
    NotFitted(&'static str),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Insufficient samples: {0}")]
    InsufficientSamples(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type MlResult<T> = Result<T, MlError>;
