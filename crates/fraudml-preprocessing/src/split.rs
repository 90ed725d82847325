use std::collections::BTreeMap;

use fraudml_core::{LabeledDataset, MlError, MlResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Draw `n` rows uniformly **with replacement**.
///
/// Rows may appear several times in the result. The same seed always yields
/// the same rows in the same order.
pub fn sample_with_replacement(
    data: &LabeledDataset,
    n: usize,
    seed: u64,
) -> MlResult<LabeledDataset> {
    if data.is_empty() {
        return Err(MlError::EmptyMatrix);
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..data.len())).collect();
    data.select(&indices)
}

/// Result of a train/test split.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: LabeledDataset,
    pub test: LabeledDataset,
}

/// Split into training and test sets, keeping each class's share equal in both.
///
/// The test set holds `ceil(n * test_ratio)` rows. Per-class test counts follow
/// the class proportions, rounding with the largest-remainder method so the
/// counts add up exactly. Both partitions come back shuffled.
pub fn stratified_train_test_split(
    data: &LabeledDataset,
    test_ratio: f64,
    seed: u64,
) -> MlResult<TrainTestSplit> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(MlError::InvalidParameter(format!(
            "test_ratio must be in (0, 1), got {test_ratio}"
        )));
    }
    let n = data.len();
    let n_test = (n as f64 * test_ratio).ceil() as usize;

    let mut by_class: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for (i, &label) in data.labels.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }
    if let Some((label, members)) = by_class.iter().find(|(_, m)| m.len() < 2) {
        return Err(MlError::InsufficientSamples(format!(
            "class {label} has {} member(s); stratification needs at least 2",
            members.len()
        )));
    }
    if n_test < by_class.len() || n - n_test < by_class.len() {
        return Err(MlError::InsufficientSamples(format!(
            "{n} rows cannot be split {test_ratio} across {} classes",
            by_class.len()
        )));
    }

    let test_counts = allocate_test_counts(&by_class, n, n_test);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train_idx = Vec::with_capacity(n - n_test);
    let mut test_idx = Vec::with_capacity(n_test);
    for ((_, members), take) in by_class.iter_mut().zip(test_counts) {
        members.shuffle(&mut rng);
        test_idx.extend_from_slice(&members[..take]);
        train_idx.extend_from_slice(&members[take..]);
    }
    train_idx.shuffle(&mut rng);
    test_idx.shuffle(&mut rng);

    Ok(TrainTestSplit {
        train: data.select(&train_idx)?,
        test: data.select(&test_idx)?,
    })
}

fn allocate_test_counts(by_class: &BTreeMap<u8, Vec<usize>>, n: usize, n_test: usize) -> Vec<usize> {
    let exact: Vec<f64> = by_class
        .values()
        .map(|m| m.len() as f64 * n_test as f64 / n as f64)
        .collect();
    let mut counts: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

    let mut remaining = n_test - counts.iter().sum::<usize>();
    let mut order: Vec<usize> = (0..exact.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });
    for &c in order.iter().cycle() {
        if remaining == 0 {
            break;
        }
        let size = by_class.values().nth(c).map_or(0, Vec::len);
        // keep at least one row of every class on the training side
        if counts[c] + 1 < size {
            counts[c] += 1;
            remaining -= 1;
        }
    }
    counts
}
