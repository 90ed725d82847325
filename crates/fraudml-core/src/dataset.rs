use std::collections::BTreeMap;

use crate::error::{MlError, MlResult};
use crate::matrix::Matrix;

/// Feature matrix plus one class label per row.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledDataset {
    pub features: Matrix,
    pub labels: Vec<u8>,
}

impl LabeledDataset {
    pub fn new(features: Matrix, labels: Vec<u8>) -> MlResult<Self> {
        if features.n_rows() != labels.len() {
            return Err(MlError::ShapeMismatch {
                expected: vec![features.n_rows()],
                got: vec![labels.len()],
            });
        }
        Ok(LabeledDataset { features, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.n_cols()
    }

    /// Rows gathered by index, labels included. Indices may repeat.
    pub fn select(&self, indices: &[usize]) -> MlResult<LabeledDataset> {
        let features = self.features.select_rows(indices)?;
        let labels = indices.iter().map(|&i| self.labels[i]).collect();
        LabeledDataset::new(features, labels)
    }

    /// Number of rows per class label, ordered by label.
    pub fn class_counts(&self) -> BTreeMap<u8, usize> {
        class_counts(&self.labels)
    }
}

/// Number of occurrences per label, ordered by label.
pub fn class_counts(labels: &[u8]) -> BTreeMap<u8, usize> {
    let mut counts = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}
