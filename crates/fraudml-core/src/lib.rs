pub mod matrix;
pub mod dataset;
pub mod schema;
pub mod estimator;
pub mod error;

pub use matrix::Matrix;
pub use dataset::LabeledDataset;
pub use schema::{FEATURE_NAMES, LABEL_COLUMN, NUM_FEATURES};
pub use estimator::{Classifier, Transformer, DECISION_THRESHOLD};
pub use error::{MlError, MlResult};
