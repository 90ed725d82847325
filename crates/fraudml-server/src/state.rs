use std::path::Path;
use std::sync::Arc;

use fraudml_pipeline::{PipelineResult, ScoringPipeline};

/// Shared handler state: the scoring pipeline behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ScoringPipeline>,
}

impl AppState {
    pub fn new(pipeline: ScoringPipeline) -> Self {
        AppState { pipeline: Arc::new(pipeline) }
    }

    pub fn load(scaler_path: impl AsRef<Path>, model_path: impl AsRef<Path>) -> PipelineResult<Self> {
        Ok(AppState::new(ScoringPipeline::load(scaler_path, model_path)?))
    }
}
