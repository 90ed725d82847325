use crate::error::MlResult;
use crate::matrix::Matrix;

/// Probability at or above which `predict` returns the positive class.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Trait for unsupervised transformers (scalers).
pub trait Transformer {
    fn fit(&mut self, x: &Matrix) -> MlResult<()>;
    fn transform(&self, x: &Matrix) -> MlResult<Matrix>;
    fn fit_transform(&mut self, x: &Matrix) -> MlResult<Matrix> {
        self.fit(x)?;
        self.transform(x)
    }
}

/// Trait for binary probabilistic classifiers.
pub trait Classifier {
    fn fit(&mut self, x: &Matrix, y: &[u8]) -> MlResult<()>;

    /// Probability of the positive class, one value per row.
    fn predict_proba(&self, x: &Matrix) -> MlResult<Vec<f64>>;

    fn predict(&self, x: &Matrix) -> MlResult<Vec<u8>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| u8::from(p >= DECISION_THRESHOLD))
            .collect())
    }
}
