use fraudml_core::{Matrix, MlError, MlResult};
use rayon::prelude::*;

/// Quantile bin boundaries of one feature.
///
/// Value `v` falls in the first bin whose upper bound is `>= v`. Bounds are
/// actual data values, so "bin <= b" and "v <= upper_bounds[b]" select the
/// same training rows.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBins {
    upper_bounds: Vec<f64>,
}

impl FeatureBins {
    /// Build at most `max_bins` boundaries from a column.
    pub fn from_values(values: &[f64], max_bins: usize) -> MlResult<Self> {
        if values.is_empty() {
            return Err(MlError::EmptyMatrix);
        }
        if values.iter().any(|v| v.is_nan()) {
            return Err(MlError::InvalidOperation("cannot bin NaN values".into()));
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mut unique = sorted.clone();
        unique.dedup();

        let upper_bounds = if unique.len() <= max_bins {
            unique
        } else {
            let n = sorted.len();
            let mut bounds: Vec<f64> = (1..=max_bins).map(|b| sorted[b * n / max_bins - 1]).collect();
            bounds.dedup();
            bounds
        };
        Ok(FeatureBins { upper_bounds })
    }

    pub fn n_bins(&self) -> usize {
        self.upper_bounds.len()
    }

    pub fn bin(&self, value: f64) -> usize {
        self.upper_bounds
            .partition_point(|&u| u < value)
            .min(self.upper_bounds.len() - 1)
    }

    /// Raw-value threshold equivalent to "bin <= b".
    pub fn threshold(&self, b: usize) -> f64 {
        self.upper_bounds[b]
    }
}

/// Feature matrix quantized to bin indices, stored column by column.
#[derive(Debug, Clone)]
pub struct BinnedMatrix {
    bins: Vec<u16>,
    n_rows: usize,
    features: Vec<FeatureBins>,
}

impl BinnedMatrix {
    pub fn from_matrix(x: &Matrix, max_bins: usize) -> MlResult<Self> {
        let n_rows = x.n_rows();
        let columns: Vec<(FeatureBins, Vec<u16>)> = (0..x.n_cols())
            .into_par_iter()
            .map(|j| {
                let values: Vec<f64> = x.column(j).collect();
                let bins = FeatureBins::from_values(&values, max_bins)?;
                let coded = values.iter().map(|&v| bins.bin(v) as u16).collect();
                Ok((bins, coded))
            })
            .collect::<MlResult<_>>()?;

        let mut bins = Vec::with_capacity(n_rows * x.n_cols());
        let mut features = Vec::with_capacity(x.n_cols());
        for (f, coded) in columns {
            bins.extend(coded);
            features.push(f);
        }
        Ok(BinnedMatrix { bins, n_rows, features })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    pub fn feature(&self, j: usize) -> &FeatureBins {
        &self.features[j]
    }

    /// Bin codes of feature `j` for every row.
    pub fn column(&self, j: usize) -> &[u16] {
        &self.bins[j * self.n_rows..(j + 1) * self.n_rows]
    }
}
