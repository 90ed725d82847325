use std::fs;
use std::path::Path;

use fraudml_core::schema::{feature_names, matches_schema};
use fraudml_core::{MlError, NUM_FEATURES};
use fraudml_preprocessing::StandardScaler;
use fraudml_tree::GradientBoostingClassifier;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::csv_io::create_parent;
use crate::error::{IoError, IoResult};

/// Version written into every artifact; loading rejects anything else.
pub const FORMAT_VERSION: u32 = 1;

/// Persisted scaler statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl ScalerArtifact {
    pub fn from_scaler(scaler: &StandardScaler) -> IoResult<Self> {
        match (&scaler.mean, &scaler.scale) {
            (Some(mean), Some(scale)) => Ok(ScalerArtifact {
                format_version: FORMAT_VERSION,
                feature_names: feature_names(),
                mean: mean.clone(),
                scale: scale.clone(),
            }),
            _ => Err(MlError::NotFitted("StandardScaler").into()),
        }
    }

    pub fn into_scaler(self) -> IoResult<StandardScaler> {
        check_header(self.format_version, &self.feature_names)?;
        let scaler = StandardScaler::from_parts(self.mean, self.scale)?;
        if scaler.n_features() != Some(NUM_FEATURES) {
            return Err(IoError::FeatureMismatch);
        }
        Ok(scaler)
    }
}

/// Persisted classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub classifier: GradientBoostingClassifier,
}

impl ModelArtifact {
    pub fn new(classifier: GradientBoostingClassifier) -> Self {
        ModelArtifact {
            format_version: FORMAT_VERSION,
            feature_names: feature_names(),
            classifier,
        }
    }

    pub fn into_classifier(self) -> IoResult<GradientBoostingClassifier> {
        check_header(self.format_version, &self.feature_names)?;
        self.classifier.validate()?;
        if self.classifier.n_features() != NUM_FEATURES {
            return Err(IoError::FeatureMismatch);
        }
        Ok(self.classifier)
    }
}

fn check_header(version: u32, names: &[String]) -> IoResult<()> {
    if version != FORMAT_VERSION {
        return Err(IoError::UnsupportedVersion { found: version, expected: FORMAT_VERSION });
    }
    if !matches_schema(names) {
        return Err(IoError::FeatureMismatch);
    }
    Ok(())
}

/// Serialize `value` as pretty JSON, creating parent directories.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> IoResult<()> {
    create_parent(path)?;
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| IoError::file(path, e))
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> IoResult<T> {
    let json = fs::read_to_string(path).map_err(|e| IoError::file(path, e))?;
    Ok(serde_json::from_str(&json)?)
}

pub fn save_scaler(scaler: &StandardScaler, path: impl AsRef<Path>) -> IoResult<()> {
    let path = path.as_ref();
    save_json(&ScalerArtifact::from_scaler(scaler)?, path)?;
    info!(path = %path.display(), "saved scaler");
    Ok(())
}

pub fn load_scaler(path: impl AsRef<Path>) -> IoResult<StandardScaler> {
    load_json::<ScalerArtifact>(path.as_ref())?.into_scaler()
}

pub fn save_model(classifier: &GradientBoostingClassifier, path: impl AsRef<Path>) -> IoResult<()> {
    let path = path.as_ref();
    save_json(&ModelArtifact::new(classifier.clone()), path)?;
    info!(path = %path.display(), trees = classifier.n_trees(), "saved model");
    Ok(())
}

pub fn load_model(path: impl AsRef<Path>) -> IoResult<GradientBoostingClassifier> {
    load_json::<ModelArtifact>(path.as_ref())?.into_classifier()
}
