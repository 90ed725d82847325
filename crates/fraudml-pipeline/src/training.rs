use std::collections::BTreeMap;
use std::path::PathBuf;

use fraudml_core::{Classifier, LabeledDataset, Transformer, DECISION_THRESHOLD};
use fraudml_io::{read_transactions, save_model, save_scaler, write_feature_importances, write_predictions, PredictionRecord};
use fraudml_metrics::{confusion_matrix, roc_auc, ClassificationReport};
use fraudml_model_selection::{RandomizedSearchCv, StratifiedKFold};
use fraudml_preprocessing::{sample_with_replacement, stratified_train_test_split, Smote, StandardScaler};
use fraudml_tree::BoosterParams;
use tracing::{info, warn};

use crate::config::TrainingConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::reports::rank_features;

/// What a training run did and where it wrote its outputs.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub loaded_rows: usize,
    pub dropped_rows: usize,
    pub sampled_rows: usize,
    pub sampled_class_counts: BTreeMap<u8, usize>,
    pub train_rows: usize,
    pub test_rows: usize,
    pub resampled_class_counts: BTreeMap<u8, usize>,
    pub test_class_counts: BTreeMap<u8, usize>,
    pub best_params: BoosterParams,
    pub best_cv_auc: f64,
    /// `None` when the test set holds a single class.
    pub test_auc: Option<f64>,
    pub confusion_matrix: Vec<Vec<usize>>,
    pub report: ClassificationReport,
    pub top_features: Vec<(String, f64)>,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub predictions_path: PathBuf,
    pub top_features_path: PathBuf,
}

/// Run the full offline pipeline: load, sample, split, oversample, scale,
/// search, evaluate and write every artifact and report.
pub fn run_training(config: &TrainingConfig) -> PipelineResult<TrainingSummary> {
    let TrainingConfig { paths, params } = config;
    let loaded = read_transactions(&paths.data)?;
    if loaded.dataset.is_empty() {
        return Err(PipelineError::EmptyDataset(paths.data.clone()));
    }
    let loaded_rows = loaded.dataset.len();

    let sampled = sample_with_replacement(&loaded.dataset, params.sample_size, params.seed)?;
    info!(rows = sampled.len(), classes = ?sampled.class_counts(), "sampled with replacement");

    let split = stratified_train_test_split(&sampled, params.test_ratio, params.seed)?;
    info!(train = split.train.len(), test = split.test.len(), "stratified split");

    let resampled = Smote::new(params.smote_k_neighbors, params.seed).fit_resample(&split.train)?;
    let resampled_class_counts = resampled.class_counts();
    info!(rows = resampled.len(), classes = ?resampled_class_counts, "SMOTE applied to training set");

    let mut scaler = StandardScaler::new();
    let train_x = scaler.fit_transform(&resampled.features)?;
    let test_x = scaler.transform(&split.test.features)?;
    save_scaler(&scaler, &paths.scaler)?;

    let train = LabeledDataset::new(train_x, resampled.labels)?;
    let search = RandomizedSearchCv::new(
        params.grid.clone(),
        params.n_iter,
        StratifiedKFold::new(params.cv_folds),
        params.seed,
    );
    let outcome = search.fit(&train)?;
    let best = outcome.best().clone();
    info!(mean_auc = best.mean_score, std_auc = best.std_score, params = ?best.params, "best candidate");
    save_model(&outcome.best_estimator, &paths.model)?;

    let proba = outcome.best_estimator.predict_proba(&test_x)?;
    let predicted: Vec<u8> = proba.iter().map(|&p| u8::from(p >= DECISION_THRESHOLD)).collect();
    let actual = &split.test.labels;

    let confusion = confusion_matrix(actual, &predicted, 2)?;
    let report = ClassificationReport::new(actual, &predicted)?;
    let test_auc = match roc_auc(actual, &proba) {
        Ok(auc) => Some(auc),
        Err(e) => {
            warn!(error = %e, "test AUC unavailable");
            None
        }
    };
    info!(?confusion, auc = ?test_auc, "test set evaluation");
    info!("classification report:\n{report}");

    let records: Vec<PredictionRecord> = actual
        .iter()
        .zip(&predicted)
        .zip(&proba)
        .map(|((&actual, &predicted), &probability)| PredictionRecord { actual, predicted, probability })
        .collect();
    let predictions_path = paths.predictions();
    write_predictions(&predictions_path, &split.test.features, &records)?;

    let top_features = rank_features(outcome.best_estimator.feature_importances(), params.top_k_features);
    let top_features_path = paths.top_features();
    write_feature_importances(&top_features_path, &top_features)?;

    Ok(TrainingSummary {
        loaded_rows,
        dropped_rows: loaded.dropped_rows,
        sampled_rows: sampled.len(),
        sampled_class_counts: sampled.class_counts(),
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        resampled_class_counts,
        test_class_counts: split.test.class_counts(),
        best_params: best.params,
        best_cv_auc: best.mean_score,
        test_auc,
        confusion_matrix: confusion,
        report,
        top_features,
        model_path: paths.model.clone(),
        scaler_path: paths.scaler.clone(),
        predictions_path,
        top_features_path,
    })
}
