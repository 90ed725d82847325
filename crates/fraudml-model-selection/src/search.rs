use fraudml_core::{Classifier, LabeledDataset, MlError, MlResult};
use fraudml_metrics::roc_auc;
use fraudml_tree::{BoosterParams, GradientBoostingClassifier};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::kfold::{Fold, StratifiedKFold};
use crate::param_grid::BoosterParamGrid;

/// Cross-validation outcome of one sampled parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub params: BoosterParams,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
    pub std_score: f64,
    /// 1 is best.
    pub rank: usize,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub candidates: Vec<CandidateResult>,
    pub best_index: usize,
    /// Best parameters refit on the full training set.
    pub best_estimator: GradientBoostingClassifier,
}

impl SearchOutcome {
    pub fn best(&self) -> &CandidateResult {
        &self.candidates[self.best_index]
    }
}

/// Randomized hyperparameter search scored by ROC-AUC.
///
/// Every (candidate, fold) fit runs on the rayon pool. The best candidate has
/// the highest mean validation AUC; ties go to the earlier candidate.
#[derive(Debug, Clone)]
pub struct RandomizedSearchCv {
    pub grid: BoosterParamGrid,
    pub n_iter: usize,
    pub cv: StratifiedKFold,
    pub seed: u64,
}

impl Default for RandomizedSearchCv {
    fn default() -> Self {
        RandomizedSearchCv {
            grid: BoosterParamGrid::default(),
            n_iter: 10,
            cv: StratifiedKFold::default(),
            seed: 42,
        }
    }
}

impl RandomizedSearchCv {
    pub fn new(grid: BoosterParamGrid, n_iter: usize, cv: StratifiedKFold, seed: u64) -> Self {
        RandomizedSearchCv { grid, n_iter, cv, seed }
    }

    pub fn fit(&self, data: &LabeledDataset) -> MlResult<SearchOutcome> {
        let candidates = self.grid.sample(self.n_iter, self.seed)?;
        let folds = self.cv.split(&data.labels)?;
        let fold_data: Vec<(LabeledDataset, LabeledDataset)> = folds
            .iter()
            .map(|Fold { train, validation }| Ok((data.select(train)?, data.select(validation)?)))
            .collect::<MlResult<_>>()?;

        info!(
            candidates = candidates.len(),
            folds = folds.len(),
            fits = candidates.len() * folds.len(),
            "starting randomized search"
        );

        let jobs: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|c| (0..fold_data.len()).map(move |f| (c, f)))
            .collect();
        let scores: Vec<f64> = jobs
            .par_iter()
            .map(|&(c, f)| {
                let (train, validation) = &fold_data[f];
                score_fold(&candidates[c], train, validation)
            })
            .collect::<MlResult<_>>()?;

        let mut results: Vec<CandidateResult> = candidates
            .into_iter()
            .zip(scores.chunks(fold_data.len()))
            .map(|(params, fold_scores)| {
                let n = fold_scores.len() as f64;
                let mean = fold_scores.iter().sum::<f64>() / n;
                let var = fold_scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
                CandidateResult {
                    params,
                    fold_scores: fold_scores.to_vec(),
                    mean_score: mean,
                    std_score: var.sqrt(),
                    rank: 0,
                }
            })
            .collect();

        let mut order: Vec<usize> = (0..results.len()).collect();
        // stable sort keeps earlier candidates first on equal means
        order.sort_by(|&a, &b| results[b].mean_score.total_cmp(&results[a].mean_score));
        for (rank, &i) in order.iter().enumerate() {
            results[i].rank = rank + 1;
        }
        let best_index = order.first().copied().ok_or(MlError::EmptyMatrix)?;

        for (i, r) in results.iter().enumerate() {
            debug!(candidate = i, mean_auc = r.mean_score, std_auc = r.std_score, rank = r.rank, "cv result");
        }
        info!(
            best = best_index,
            mean_auc = results[best_index].mean_score,
            params = ?results[best_index].params,
            "refitting best candidate on full training set"
        );

        let mut best_estimator = GradientBoostingClassifier::new(results[best_index].params.clone());
        best_estimator.fit(&data.features, &data.labels)?;

        Ok(SearchOutcome { candidates: results, best_index, best_estimator })
    }
}

fn score_fold(params: &BoosterParams, train: &LabeledDataset, validation: &LabeledDataset) -> MlResult<f64> {
    let mut model = GradientBoostingClassifier::new(params.clone());
    model.fit(&train.features, &train.labels)?;
    let proba = model.predict_proba(&validation.features)?;
    roc_auc(&validation.labels, &proba)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use fraudml_core::Matrix;

    fn noisy_dataset() -> LabeledDataset {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..90 {
            let signal = (i % 9) as f64;
            let noise = ((i * 5) % 11) as f64;
            rows.push(vec![signal, noise]);
            labels.push(u8::from(signal >= 6.0));
        }
        LabeledDataset::new(Matrix::from_rows(&rows).unwrap(), labels).unwrap()
    }

    fn tiny_grid() -> BoosterParamGrid {
        BoosterParamGrid {
            n_estimators: vec![5, 10],
            max_depth: vec![1, 2],
            learning_rate: vec![0.3],
            subsample: vec![1.0],
            colsample_bytree: vec![1.0],
            gamma: vec![0.0],
            scale_pos_weight: vec![1.0, 3.0],
            base: BoosterParams::default(),
        }
    }

    #[test]
    fn test_search_ranks_and_refits() {
        let data = noisy_dataset();
        let search = RandomizedSearchCv::new(tiny_grid(), 4, StratifiedKFold::new(3), 42);
        let outcome = search.fit(&data).unwrap();

        assert_eq!(outcome.candidates.len(), 4);
        let best = outcome.best();
        assert_eq!(best.rank, 1);
        assert_eq!(best.fold_scores.len(), 3);
        for c in &outcome.candidates {
            assert!(c.mean_score <= best.mean_score);
            assert!((0.0..=1.0).contains(&c.mean_score));
        }
        assert_eq!(outcome.best_estimator.params, best.params);
        assert!(outcome.best_estimator.is_fitted());
    }

    #[test]
    fn test_scores_summarise_fold_results() {
        let data = noisy_dataset();
        let search = RandomizedSearchCv::new(tiny_grid(), 4, StratifiedKFold::new(3), 42);
        let outcome = search.fit(&data).unwrap();

        for c in &outcome.candidates {
            let mean = c.fold_scores.iter().sum::<f64>() / 3.0;
            let var = c.fold_scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / 3.0;
            assert_abs_diff_eq!(c.mean_score, mean, epsilon = 1e-12);
            assert_abs_diff_eq!(c.std_score, var.sqrt(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_ties_go_to_earliest_candidate() {
        // perfectly separable: every candidate scores AUC 1.0
        let data = noisy_dataset();
        let search = RandomizedSearchCv::new(tiny_grid(), 8, StratifiedKFold::new(3), 42);
        let outcome = search.fit(&data).unwrap();
        assert!(outcome.candidates.iter().all(|c| c.mean_score == 1.0));
        assert_eq!(outcome.best_index, 0);
        let ranks: Vec<usize> = outcome.candidates.iter().map(|c| c.rank).collect();
        assert_eq!(ranks, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn test_search_is_reproducible() {
        let data = noisy_dataset();
        let search = RandomizedSearchCv::new(tiny_grid(), 3, StratifiedKFold::new(3), 7);
        let a = search.fit(&data).unwrap();
        let b = search.fit(&data).unwrap();
        assert_eq!(a.candidates, b.candidates);
        assert_eq!(a.best_estimator, b.best_estimator);
    }
}
