use std::path::PathBuf;

use fraudml_core::MlError;
use fraudml_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Ml(#[from] MlError),

    #[error("no complete rows in {}", .0.display())]
    EmptyDataset(PathBuf),

    #[error("scaler expects {scaler} features but the model expects {model}")]
    WidthMismatch { scaler: usize, model: usize },
}

pub type PipelineResult<T> = Result<T, PipelineError>;
