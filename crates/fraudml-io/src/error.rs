use std::path::PathBuf;

use fraudml_core::MlError;
use thiserror::Error;

/// Errors from reading datasets, writing reports and persisting artifacts.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error on {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: cannot parse '{value}' in column '{column}' as a number")]
    Parse { row: usize, column: String, value: String },

    #[error("row {row}: label must be 0 or 1, got '{value}'")]
    InvalidLabel { row: usize, value: String },

    #[error("unsupported artifact format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("report shape mismatch: expected {expected:?} rows x columns, got {got:?}")]
    ReportShape { expected: Vec<usize>, got: Vec<usize> },

    #[error("artifact feature names do not match the transaction schema")]
    FeatureMismatch,

    #[error("invalid artifact: {0}")]
    Artifact(#[from] MlError),
}

impl IoError {
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IoError::File { path: path.into(), source }
    }
}

pub type IoResult<T> = Result<T, IoError>;
