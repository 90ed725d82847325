use fraudml_core::{LabeledDataset, Matrix, MlError, MlResult};
use fraudml_neighbors::NearestNeighbors;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Synthetic Minority Over-sampling Technique.
///
/// Every class smaller than the majority class is grown to the majority count.
/// Each synthetic row lies on the segment between a randomly chosen member of
/// the class and one of its `k_neighbors` nearest same-class neighbours.
/// Original rows are kept first, synthetic rows are appended after them.
#[derive(Debug, Clone)]
pub struct Smote {
    pub k_neighbors: usize,
    pub seed: u64,
}

impl Default for Smote {
    fn default() -> Self {
        Smote { k_neighbors: 5, seed: 42 }
    }
}

impl Smote {
    pub fn new(k_neighbors: usize, seed: u64) -> Self {
        Smote { k_neighbors, seed }
    }

    pub fn fit_resample(&self, data: &LabeledDataset) -> MlResult<LabeledDataset> {
        if self.k_neighbors == 0 {
            return Err(MlError::InvalidParameter("k_neighbors must be at least 1".into()));
        }
        let counts = data.class_counts();
        let majority = counts
            .values()
            .copied()
            .max()
            .ok_or(MlError::EmptyMatrix)?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut features = data.features.clone();
        let mut labels = data.labels.clone();

        for (&class, &count) in &counts {
            let n_synthetic = majority - count;
            if n_synthetic == 0 {
                continue;
            }
            if count <= self.k_neighbors {
                return Err(MlError::InsufficientSamples(format!(
                    "class {class} has {count} samples; SMOTE with k_neighbors={} needs at least {}",
                    self.k_neighbors,
                    self.k_neighbors + 1
                )));
            }

            let members: Vec<usize> = data
                .labels
                .iter()
                .enumerate()
                .filter(|(_, &l)| l == class)
                .map(|(i, _)| i)
                .collect();
            let class_x = data.features.select_rows(&members)?;
            let mut nn = NearestNeighbors::new();
            nn.fit(&class_x)?;
            let graph = nn.kneighbors_graph(self.k_neighbors)?;

            let synthetic = interpolate(&class_x, &graph, n_synthetic, &mut rng)?;
            debug!(class, original = count, synthetic = n_synthetic, "SMOTE oversampled class");
            features = features.vstack(&synthetic)?;
            labels.extend(std::iter::repeat(class).take(n_synthetic));
        }

        LabeledDataset::new(features, labels)
    }
}

fn interpolate(
    class_x: &Matrix,
    graph: &[Vec<usize>],
    n_synthetic: usize,
    rng: &mut StdRng,
) -> MlResult<Matrix> {
    let mut out = Matrix::with_capacity(class_x.n_cols(), n_synthetic)?;
    let mut row = vec![0.0; class_x.n_cols()];
    for _ in 0..n_synthetic {
        let i = rng.gen_range(0..class_x.n_rows());
        let neighbours = &graph[i];
        let j = neighbours[rng.gen_range(0..neighbours.len())];
        let gap: f64 = rng.gen();
        for ((r, &a), &b) in row.iter_mut().zip(class_x.row(i)).zip(class_x.row(j)) {
            *r = a + gap * (b - a);
        }
        out.push_row(&row)?;
    }
    Ok(out)
}
