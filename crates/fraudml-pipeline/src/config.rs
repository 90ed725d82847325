use std::path::PathBuf;

use fraudml_model_selection::BoosterParamGrid;
use serde::{Deserialize, Serialize};

pub const PREDICTIONS_FILE: &str = "fraud_predictions.csv";
pub const TOP_FEATURES_FILE: &str = "top_10_features.csv";

/// Where the dataset is read from and where artifacts and reports go.
///
/// Defaults reproduce the standard layout relative to the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub data: PathBuf,
    pub model: PathBuf,
    pub scaler: PathBuf,
    pub reports_dir: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        ArtifactPaths {
            data: PathBuf::from("data/creditcard.csv"),
            model: PathBuf::from("ml_model/fraud_model.json"),
            scaler: PathBuf::from("ml_model/scaler.json"),
            reports_dir: PathBuf::from("reports"),
        }
    }
}

impl ArtifactPaths {
    pub fn predictions(&self) -> PathBuf {
        self.reports_dir.join(PREDICTIONS_FILE)
    }

    pub fn top_features(&self) -> PathBuf {
        self.reports_dir.join(TOP_FEATURES_FILE)
    }
}

/// Knobs of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    /// Rows drawn with replacement before splitting.
    pub sample_size: usize,
    pub test_ratio: f64,
    /// Seed for sampling, splitting, SMOTE and the search.
    pub seed: u64,
    pub smote_k_neighbors: usize,
    pub n_iter: usize,
    pub cv_folds: usize,
    pub top_k_features: usize,
    pub grid: BoosterParamGrid,
}

impl Default for TrainingParams {
    fn default() -> Self {
        TrainingParams {
            sample_size: 50_000,
            test_ratio: 0.2,
            seed: 42,
            smote_k_neighbors: 5,
            n_iter: 10,
            cv_folds: 3,
            top_k_features: 10,
            grid: BoosterParamGrid::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub paths: ArtifactPaths,
    pub params: TrainingParams,
}
