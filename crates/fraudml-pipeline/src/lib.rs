pub mod config;
pub mod error;
pub mod reports;
pub mod scoring;
pub mod training;

pub use config::{ArtifactPaths, TrainingConfig, TrainingParams};
pub use error::{PipelineError, PipelineResult};
pub use reports::rank_features;
pub use scoring::{Prediction, ScoringPipeline};
pub use training::{run_training, TrainingSummary};
