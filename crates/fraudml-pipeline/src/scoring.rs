use std::path::Path;

use fraudml_core::{Classifier, Matrix, MlResult, Transformer, DECISION_THRESHOLD};
use fraudml_io::{load_model, load_scaler};
use fraudml_preprocessing::StandardScaler;
use fraudml_tree::GradientBoostingClassifier;
use serde::Serialize;
use tracing::info;

use crate::error::{PipelineError, PipelineResult};

/// Label and fraud probability for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub label: u8,
    pub risk_score: f64,
}

impl Prediction {
    fn from_probability(risk_score: f64) -> Self {
        Prediction { label: u8::from(risk_score >= DECISION_THRESHOLD), risk_score }
    }
}

/// Fitted scaler followed by the fitted classifier.
///
/// Immutable once built; inputs are raw feature rows in schema order.
#[derive(Debug, Clone)]
pub struct ScoringPipeline {
    scaler: StandardScaler,
    classifier: GradientBoostingClassifier,
}

impl ScoringPipeline {
    pub fn new(scaler: StandardScaler, classifier: GradientBoostingClassifier) -> PipelineResult<Self> {
        let scaler_width = scaler.n_features().unwrap_or(0);
        if scaler_width != classifier.n_features() {
            return Err(PipelineError::WidthMismatch {
                scaler: scaler_width,
                model: classifier.n_features(),
            });
        }
        Ok(ScoringPipeline { scaler, classifier })
    }

    /// Load both artifacts written by a training run.
    pub fn load(scaler_path: impl AsRef<Path>, model_path: impl AsRef<Path>) -> PipelineResult<Self> {
        let scaler = load_scaler(scaler_path.as_ref())?;
        let classifier = load_model(model_path.as_ref())?;
        info!(
            scaler = %scaler_path.as_ref().display(),
            model = %model_path.as_ref().display(),
            trees = classifier.n_trees(),
            "loaded scoring pipeline"
        );
        ScoringPipeline::new(scaler, classifier)
    }

    pub fn n_features(&self) -> usize {
        self.classifier.n_features()
    }

    pub fn classifier(&self) -> &GradientBoostingClassifier {
        &self.classifier
    }

    /// Scale and score one raw row.
    pub fn predict_one(&self, raw: &[f64]) -> MlResult<Prediction> {
        let mut row = raw.to_vec();
        self.scaler.transform_row(&mut row)?;
        let x = Matrix::from_row(&row)?;
        let proba = self.classifier.predict_proba(&x)?;
        Ok(Prediction::from_probability(proba[0]))
    }

    pub fn predict_batch(&self, raw: &Matrix) -> MlResult<Vec<Prediction>> {
        let scaled = self.scaler.transform(raw)?;
        Ok(self
            .classifier
            .predict_proba(&scaled)?
            .into_iter()
            .map(Prediction::from_probability)
            .collect())
    }
}
