use fraudml_core::{Classifier, Matrix, MlError, MlResult};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::binning::BinnedMatrix;
use crate::params::BoosterParams;
use crate::regression_tree::{RegressionTree, TreeGrower};

const MIN_HESSIAN: f64 = 1e-16;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Gradient Boosted Trees for Binary Classification.
///
/// Uses log-loss as the objective with second-order (gradient and hessian)
/// tree fitting. Raw predictions are log-odds, converted with sigmoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingClassifier {
    pub params: BoosterParams,
    base_margin: f64,
    trees: Vec<RegressionTree>,
    feature_importances: Vec<f64>,
    n_features: usize,
}

impl GradientBoostingClassifier {
    pub fn new(params: BoosterParams) -> Self {
        GradientBoostingClassifier {
            params,
            base_margin: 0.0,
            trees: Vec::new(),
            feature_importances: Vec::new(),
            n_features: 0,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.n_features > 0
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Average split gain per feature, normalised to sum to 1.
    /// All zeros when the ensemble never split.
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Structural check for a deserialized model: every split must reference a
    /// known feature and the importance vector must match the width.
    pub fn validate(&self) -> MlResult<()> {
        if !self.is_fitted() {
            return Err(MlError::NotFitted("GradientBoostingClassifier"));
        }
        if self.feature_importances.len() != self.n_features {
            return Err(MlError::ShapeMismatch {
                expected: vec![self.n_features],
                got: vec![self.feature_importances.len()],
            });
        }
        for tree in &self.trees {
            RegressionTree::from_nodes(tree.nodes().to_vec())?;
            if let Some(f) = tree.max_feature() {
                if f >= self.n_features {
                    return Err(MlError::IndexOutOfBounds { index: f, axis: 1, size: self.n_features });
                }
            }
        }
        Ok(())
    }

    /// Raw log-odds for every row.
    pub fn predict_margin(&self, x: &Matrix) -> MlResult<Vec<f64>> {
        if !self.is_fitted() {
            return Err(MlError::NotFitted("GradientBoostingClassifier"));
        }
        if x.n_cols() != self.n_features {
            return Err(MlError::ShapeMismatch {
                expected: vec![x.n_rows(), self.n_features],
                got: vec![x.n_rows(), x.n_cols()],
            });
        }
        Ok(x.rows_iter()
            .map(|row| self.base_margin + self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>())
            .collect())
    }

    fn compute_importances(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.n_features];
        let mut count = vec![0usize; self.n_features];
        for (feature, gain) in self.trees.iter().flat_map(RegressionTree::splits) {
            total[feature] += gain;
            count[feature] += 1;
        }
        let avg: Vec<f64> = total
            .iter()
            .zip(&count)
            .map(|(&t, &c)| if c == 0 { 0.0 } else { t / c as f64 })
            .collect();
        let sum: f64 = avg.iter().sum();
        if sum > 0.0 {
            avg.into_iter().map(|v| v / sum).collect()
        } else {
            avg
        }
    }
}

impl Classifier for GradientBoostingClassifier {
    fn fit(&mut self, x: &Matrix, y: &[u8]) -> MlResult<()> {
        self.params.validate()?;
        let n = x.n_rows();
        let p = x.n_cols();
        if n == 0 {
            return Err(MlError::EmptyMatrix);
        }
        if y.len() != n {
            return Err(MlError::ShapeMismatch { expected: vec![n], got: vec![y.len()] });
        }
        if let Some(bad) = y.iter().find(|&&l| l > 1) {
            return Err(MlError::InvalidParameter(format!("labels must be 0 or 1, got {bad}")));
        }

        let weights: Vec<f64> = y
            .iter()
            .map(|&l| if l == 1 { self.params.scale_pos_weight } else { 1.0 })
            .collect();
        let targets: Vec<f64> = y.iter().map(|&l| f64::from(l)).collect();

        // Initial log-odds based on weighted class proportions
        let pos_weight: f64 = weights.iter().zip(y).filter(|(_, &l)| l == 1).map(|(w, _)| w).sum();
        let total_weight: f64 = weights.iter().sum();
        let p0 = (pos_weight / total_weight).clamp(1e-6, 1.0 - 1e-6);
        self.base_margin = (p0 / (1.0 - p0)).ln();

        let binned = BinnedMatrix::from_matrix(x, self.params.max_bins)?;
        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let mut margins = vec![self.base_margin; n];
        let mut grad = vec![0.0; n];
        let mut hess = vec![0.0; n];

        let n_rows_per_tree = ((n as f64 * self.params.subsample).round() as usize).clamp(1, n);
        let n_cols_per_tree = ((p as f64 * self.params.colsample_bytree).round() as usize).clamp(1, p);

        self.trees.clear();
        self.n_features = p;

        for round in 0..self.params.n_estimators {
            grad.par_iter_mut()
                .zip(hess.par_iter_mut())
                .enumerate()
                .for_each(|(i, (g, h))| {
                    let prob = sigmoid(margins[i]);
                    *g = (prob - targets[i]) * weights[i];
                    *h = (prob * (1.0 - prob)).max(MIN_HESSIAN) * weights[i];
                });

            let mut rows = if n_rows_per_tree < n {
                index::sample(&mut rng, n, n_rows_per_tree).into_vec()
            } else {
                (0..n).collect()
            };
            rows.sort_unstable();
            let mut features = if n_cols_per_tree < p {
                index::sample(&mut rng, p, n_cols_per_tree).into_vec()
            } else {
                (0..p).collect()
            };
            features.sort_unstable();

            let grower = TreeGrower {
                binned: &binned,
                grad: &grad,
                hess: &hess,
                features: &features,
                params: &self.params,
            };
            let tree = grower.grow(rows);

            margins
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, m)| *m += tree.predict_row(x.row(i)));

            if (round + 1) % 50 == 0 {
                debug!(round = round + 1, leaves = tree.n_leaves(), "boosting progress");
            }
            self.trees.push(tree);
        }

        self.feature_importances = self.compute_importances();
        Ok(())
    }

    fn predict_proba(&self, x: &Matrix) -> MlResult<Vec<f64>> {
        Ok(self.predict_margin(x)?.into_iter().map(sigmoid).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Label is 1 when the second feature is large; the first is noise.
    fn separable(n: usize) -> (Matrix, Vec<u8>) {
        let mut rows = Vec::with_capacity(n);
        let mut labels = Vec::with_capacity(n);
        for i in 0..n {
            let signal = (i % 10) as f64;
            let noise = ((i * 7) % 13) as f64;
            rows.push(vec![noise, signal]);
            labels.push(u8::from(signal >= 7.0));
        }
        (Matrix::from_rows(&rows).unwrap(), labels)
    }

    fn small_params() -> BoosterParams {
        BoosterParams { n_estimators: 30, max_depth: 3, learning_rate: 0.3, ..Default::default() }
    }

    #[test]
    fn test_gradient_boosting_classifier() {
        let (x, y) = separable(200);
        let mut model = GradientBoostingClassifier::new(small_params());
        model.fit(&x, &y).unwrap();

        let pred = model.predict(&x).unwrap();
        assert_eq!(pred, y);
        assert_eq!(model.n_trees(), 30);
    }

    #[test]
    fn test_probabilities_are_bounded_and_match_labels() {
        let (x, y) = separable(100);
        let params = BoosterParams { subsample: 0.7, colsample_bytree: 0.5, ..small_params() };
        let mut model = GradientBoostingClassifier::new(params);
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        let labels = model.predict(&x).unwrap();
        for (p, l) in proba.iter().zip(&labels) {
            assert!((0.0..=1.0).contains(p));
            assert_eq!(*l == 1, *p >= 0.5);
        }
    }

    #[test]
    fn test_importances_favour_signal_feature() {
        let (x, y) = separable(200);
        let mut model = GradientBoostingClassifier::new(small_params());
        model.fit(&x, &y).unwrap();

        let imp = model.feature_importances();
        assert_eq!(imp.len(), 2);
        assert!(imp[1] > imp[0]);
        approx::assert_abs_diff_eq!(imp.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fit_is_deterministic_for_a_seed() {
        let (x, y) = separable(120);
        let params = BoosterParams { subsample: 0.7, colsample_bytree: 0.5, ..small_params() };
        let mut a = GradientBoostingClassifier::new(params.clone());
        let mut b = GradientBoostingClassifier::new(params);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_scale_pos_weight_raises_positive_scores() {
        let (x, y) = separable(100);
        let mut plain = GradientBoostingClassifier::new(BoosterParams { n_estimators: 5, ..small_params() });
        let mut weighted = GradientBoostingClassifier::new(BoosterParams {
            n_estimators: 5,
            scale_pos_weight: 50.0,
            ..small_params()
        });
        plain.fit(&x, &y).unwrap();
        weighted.fit(&x, &y).unwrap();
        let row = Matrix::from_row(&[0.0, 8.0]).unwrap();
        assert!(weighted.predict_proba(&row).unwrap()[0] > plain.predict_proba(&row).unwrap()[0]);
    }

    #[test]
    fn test_shape_and_fit_errors() {
        let (x, y) = separable(20);
        let model = GradientBoostingClassifier::new(small_params());
        assert!(matches!(model.predict_proba(&x), Err(MlError::NotFitted(_))));

        let mut model = GradientBoostingClassifier::new(small_params());
        assert!(model.fit(&x, &y[..10]).is_err());
        assert!(model.fit(&x, &[2; 20]).is_err());

        model.fit(&x, &y).unwrap();
        let wide = Matrix::from_row(&[0.0, 1.0, 2.0]).unwrap();
        assert!(matches!(model.predict_proba(&wide), Err(MlError::ShapeMismatch { .. })));
        assert!(model.validate().is_ok());
    }
}
