use std::collections::BTreeMap;

use fraudml_core::{MlError, MlResult};

/// Train and validation row indices of one fold.
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

/// Stratified k-fold without shuffling.
///
/// The members of each class, in row order, are cut into `n_splits`
/// contiguous chunks (earlier chunks take the remainder); fold `f` validates
/// on chunk `f` of every class. Each class must have at least `n_splits` rows.
#[derive(Debug, Clone)]
pub struct StratifiedKFold {
    pub n_splits: usize,
}

impl Default for StratifiedKFold {
    fn default() -> Self {
        StratifiedKFold { n_splits: 3 }
    }
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        StratifiedKFold { n_splits }
    }

    pub fn split(&self, labels: &[u8]) -> MlResult<Vec<Fold>> {
        let k = self.n_splits;
        if k < 2 {
            return Err(MlError::InvalidParameter(format!("n_splits must be at least 2, got {k}")));
        }
        let mut by_class: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
        for (i, &l) in labels.iter().enumerate() {
            by_class.entry(l).or_default().push(i);
        }
        if by_class.is_empty() {
            return Err(MlError::EmptyMatrix);
        }

        // fold id for every row
        let mut assignment = vec![0usize; labels.len()];
        for (class, members) in &by_class {
            if members.len() < k {
                return Err(MlError::InsufficientSamples(format!(
                    "class {class} has {} rows, fewer than n_splits={k}",
                    members.len()
                )));
            }
            let base = members.len() / k;
            let extra = members.len() % k;
            let mut start = 0;
            for fold in 0..k {
                let size = base + usize::from(fold < extra);
                for &row in &members[start..start + size] {
                    assignment[row] = fold;
                }
                start += size;
            }
        }

        Ok((0..k)
            .map(|fold| {
                let (validation, train): (Vec<usize>, Vec<usize>) =
                    (0..labels.len()).partition(|&i| assignment[i] == fold);
                Fold { train, validation }
            })
            .collect())
    }
}
