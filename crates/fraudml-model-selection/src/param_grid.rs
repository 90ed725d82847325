use fraudml_core::{MlError, MlResult};
use fraudml_tree::BoosterParams;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Candidate values for each searched booster hyperparameter.
///
/// Fields not listed here are taken from `base`. The grid enumerates
/// combinations with the last field varying fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterParamGrid {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<usize>,
    pub learning_rate: Vec<f64>,
    pub subsample: Vec<f64>,
    pub colsample_bytree: Vec<f64>,
    pub gamma: Vec<f64>,
    pub scale_pos_weight: Vec<f64>,
    pub base: BoosterParams,
}

impl Default for BoosterParamGrid {
    fn default() -> Self {
        BoosterParamGrid {
            n_estimators: vec![50, 100, 200],
            max_depth: vec![3, 5, 7],
            learning_rate: vec![0.01, 0.1, 0.3],
            subsample: vec![0.7, 1.0],
            colsample_bytree: vec![0.7, 1.0],
            gamma: vec![0.0, 1.0],
            scale_pos_weight: vec![50.0, 70.0, 99.0],
            base: BoosterParams::default(),
        }
    }
}

impl BoosterParamGrid {
    fn dims(&self) -> [usize; 7] {
        [
            self.n_estimators.len(),
            self.max_depth.len(),
            self.learning_rate.len(),
            self.subsample.len(),
            self.colsample_bytree.len(),
            self.gamma.len(),
            self.scale_pos_weight.len(),
        ]
    }

    /// Number of combinations.
    pub fn len(&self) -> usize {
        self.dims().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `index`-th combination in enumeration order.
    pub fn get(&self, index: usize) -> Option<BoosterParams> {
        if index >= self.len() {
            return None;
        }
        let mut digits = [0usize; 7];
        let mut rest = index;
        for (digit, &dim) in digits.iter_mut().zip(self.dims().iter()).rev() {
            *digit = rest % dim;
            rest /= dim;
        }
        Some(BoosterParams {
            n_estimators: self.n_estimators[digits[0]],
            max_depth: self.max_depth[digits[1]],
            learning_rate: self.learning_rate[digits[2]],
            subsample: self.subsample[digits[3]],
            colsample_bytree: self.colsample_bytree[digits[4]],
            gamma: self.gamma[digits[5]],
            scale_pos_weight: self.scale_pos_weight[digits[6]],
            ..self.base.clone()
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = BoosterParams> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Draw `n_iter` distinct combinations without replacement.
    ///
    /// When the grid has no more than `n_iter` combinations every one is
    /// returned in enumeration order.
    pub fn sample(&self, n_iter: usize, seed: u64) -> MlResult<Vec<BoosterParams>> {
        let total = self.len();
        if total == 0 {
            return Err(MlError::InvalidParameter("parameter grid is empty".into()));
        }
        if n_iter == 0 {
            return Err(MlError::InvalidParameter("n_iter must be at least 1".into()));
        }
        if n_iter >= total {
            return Ok(self.iter().collect());
        }
        let mut rng = StdRng::seed_from_u64(seed);
        Ok(index::sample(&mut rng, total, n_iter)
            .into_iter()
            .filter_map(|i| self.get(i))
            .collect())
    }
}
