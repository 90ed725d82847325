//! # fraudml
//!
//! Credit-card fraud detection: an offline training pipeline and an HTTP
//! prediction service.
//!
//! ## Modules
//!
//! - **core**: `Matrix`, `LabeledDataset`, the transaction schema, estimator traits
//! - **preprocessing**: StandardScaler, sampling with replacement, stratified split, SMOTE
//! - **neighbors**: brute-force k-nearest neighbours
//! - **tree**: histogram gradient-boosted trees with a logistic objective
//! - **metrics**: confusion matrix, precision/recall/F1, accuracy, ROC-AUC, reports
//! - **model_selection**: parameter grids, stratified k-fold, randomized search
//! - **io**: transaction CSV loading, report writers, JSON artifacts
//! - **pipeline**: scoring pipeline and the end-to-end training run
//! - **server**: `POST /predict/` over axum

/// Matrix, dataset and schema.
pub use fraudml_core as core;

/// Data preprocessing.
pub use fraudml_preprocessing as preprocessing;

/// Nearest neighbors.
pub use fraudml_neighbors as neighbors;

/// Tree-based models.
pub use fraudml_tree as tree;

/// Evaluation metrics.
pub use fraudml_metrics as metrics;

/// Hyperparameter search.
pub use fraudml_model_selection as model_selection;

/// I/O utilities.
pub use fraudml_io as io;

/// Training and scoring pipelines.
pub use fraudml_pipeline as pipeline;

/// Prediction service.
pub use fraudml_server as server;
