use fraudml_core::{MlError, MlResult};
use serde::{Deserialize, Serialize};

/// Hyperparameters of [`GradientBoostingClassifier`](crate::GradientBoostingClassifier).
///
/// Names follow the usual XGBoost vocabulary so search grids read naturally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterParams {
    /// Number of boosting rounds (trees).
    pub n_estimators: usize,
    pub max_depth: usize,
    /// Shrinkage applied to every leaf weight.
    pub learning_rate: f64,
    /// Fraction of rows drawn (without replacement) for each tree.
    pub subsample: f64,
    /// Fraction of features drawn for each tree.
    pub colsample_bytree: f64,
    /// Minimum loss reduction required to keep a split.
    pub gamma: f64,
    /// Weight multiplier for positive-class rows.
    pub scale_pos_weight: f64,
    /// L2 regularization on leaf weights.
    pub reg_lambda: f64,
    /// Minimum hessian sum in each child.
    pub min_child_weight: f64,
    /// Maximum number of histogram bins per feature.
    pub max_bins: usize,
    pub seed: u64,
}

impl Default for BoosterParams {
    fn default() -> Self {
        BoosterParams {
            n_estimators: 100,
            max_depth: 6,
            learning_rate: 0.3,
            subsample: 1.0,
            colsample_bytree: 1.0,
            gamma: 0.0,
            scale_pos_weight: 1.0,
            reg_lambda: 1.0,
            min_child_weight: 1.0,
            max_bins: 256,
            seed: 42,
        }
    }
}

impl BoosterParams {
    pub fn validate(&self) -> MlResult<()> {
        let fraction = |name: &str, v: f64| {
            if v > 0.0 && v <= 1.0 {
                Ok(())
            } else {
                Err(MlError::InvalidParameter(format!("{name} must be in (0, 1], got {v}")))
            }
        };
        if self.n_estimators == 0 {
            return Err(MlError::InvalidParameter("n_estimators must be at least 1".into()));
        }
        if self.max_depth == 0 {
            return Err(MlError::InvalidParameter("max_depth must be at least 1".into()));
        }
        if !(self.learning_rate > 0.0) {
            return Err(MlError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        fraction("subsample", self.subsample)?;
        fraction("colsample_bytree", self.colsample_bytree)?;
        if self.gamma < 0.0 || self.reg_lambda < 0.0 || self.min_child_weight < 0.0 {
            return Err(MlError::InvalidParameter(
                "gamma, reg_lambda and min_child_weight must be non-negative".into(),
            ));
        }
        if !(self.scale_pos_weight > 0.0) {
            return Err(MlError::InvalidParameter("scale_pos_weight must be positive".into()));
        }
        if !(2..=usize::from(u16::MAX)).contains(&self.max_bins) {
            return Err(MlError::InvalidParameter(format!(
                "max_bins must be in 2..=65535, got {}",
                self.max_bins
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(BoosterParams::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let bad = [
            BoosterParams { n_estimators: 0, ..Default::default() },
            BoosterParams { subsample: 0.0, ..Default::default() },
            BoosterParams { colsample_bytree: 1.5, ..Default::default() },
            BoosterParams { gamma: -1.0, ..Default::default() },
            BoosterParams { scale_pos_weight: 0.0, ..Default::default() },
            BoosterParams { max_bins: 1, ..Default::default() },
        ];
        for params in bad {
            assert!(params.validate().is_err(), "{params:?} should be rejected");
        }
    }
}
