use fraudml_core::{Matrix, MlError, MlResult, Transformer};
use serde::{Deserialize, Serialize};

/// Standardize features by removing the mean and scaling to unit variance.
///
/// The deviation is the population one; a constant column is left unscaled
/// (scale 1) rather than divided by zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Option<Vec<f64>>,
    pub scale: Option<Vec<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        StandardScaler { mean: None, scale: None }
    }

    /// Rebuild a fitted scaler from persisted statistics.
    pub fn from_parts(mean: Vec<f64>, scale: Vec<f64>) -> MlResult<Self> {
        if mean.len() != scale.len() {
            return Err(MlError::ShapeMismatch {
                expected: vec![mean.len()],
                got: vec![scale.len()],
            });
        }
        if scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(MlError::InvalidParameter(
                "scaler scale values must be finite and positive".to_string(),
            ));
        }
        Ok(StandardScaler { mean: Some(mean), scale: Some(scale) })
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some() && self.scale.is_some()
    }

    pub fn n_features(&self) -> Option<usize> {
        self.mean.as_ref().map(Vec::len)
    }

    fn fitted(&self) -> MlResult<(&[f64], &[f64])> {
        match (&self.mean, &self.scale) {
            (Some(m), Some(s)) => Ok((m, s)),
            _ => Err(MlError::NotFitted("StandardScaler")),
        }
    }

    /// Scale a single row in place.
    pub fn transform_row(&self, row: &mut [f64]) -> MlResult<()> {
        let (mean, scale) = self.fitted()?;
        if row.len() != mean.len() {
            return Err(MlError::ShapeMismatch {
                expected: vec![mean.len()],
                got: vec![row.len()],
            });
        }
        for ((v, m), s) in row.iter_mut().zip(mean).zip(scale) {
            *v = (*v - m) / s;
        }
        Ok(())
    }
}

impl Transformer for StandardScaler {
    /// Compute mean and deviation from training data (rows are samples).
    fn fit(&mut self, x: &Matrix) -> MlResult<()> {
        let mean = x.mean_axis0()?;
        let scale = x
            .std_axis0()?
            .into_iter()
            .map(|s| if s.abs() < f64::EPSILON { 1.0 } else { s })
            .collect();
        self.mean = Some(mean);
        self.scale = Some(scale);
        Ok(())
    }

    /// (x - mean) / scale, using the fitted statistics.
    fn transform(&self, x: &Matrix) -> MlResult<Matrix> {
        let (mean, _) = self.fitted()?;
        if x.n_cols() != mean.len() {
            return Err(MlError::ShapeMismatch {
                expected: vec![x.n_rows(), mean.len()],
                got: vec![x.n_rows(), x.n_cols()],
            });
        }
        let mut out = x.clone();
        for i in 0..out.n_rows() {
            self.transform_row(out.row_mut(i))?;
        }
        Ok(out)
    }
}
