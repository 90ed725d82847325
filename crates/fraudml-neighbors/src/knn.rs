use fraudml_core::{Matrix, MlError, MlResult};
use rayon::prelude::*;

/// Squared Euclidean distance; only the ordering matters for neighbour search.
fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Brute-force Euclidean nearest-neighbour index over a fixed set of points.
#[derive(Debug, Clone, Default)]
pub struct NearestNeighbors {
    points: Option<Matrix>,
}

impl NearestNeighbors {
    pub fn new() -> Self {
        NearestNeighbors { points: None }
    }

    pub fn fit(&mut self, x: &Matrix) -> MlResult<()> {
        if x.is_empty() {
            return Err(MlError::EmptyMatrix);
        }
        self.points = Some(x.clone());
        Ok(())
    }

    pub fn n_points(&self) -> usize {
        self.points.as_ref().map_or(0, Matrix::n_rows)
    }

    /// Indices of the `k` points closest to `query`, nearest first.
    ///
    /// `exclude` skips one indexed point, used when the query is itself a member
    /// of the index. Ties are broken by the lower index.
    pub fn kneighbors(&self, query: &[f64], k: usize, exclude: Option<usize>) -> MlResult<Vec<usize>> {
        let points = self
            .points
            .as_ref()
            .ok_or(MlError::NotFitted("NearestNeighbors"))?;
        if query.len() != points.n_cols() {
            return Err(MlError::ShapeMismatch {
                expected: vec![points.n_cols()],
                got: vec![query.len()],
            });
        }
        let available = points.n_rows() - usize::from(exclude.is_some());
        if k > available {
            return Err(MlError::InsufficientSamples(format!(
                "requested {k} neighbours but only {available} points are available"
            )));
        }

        let mut dists: Vec<(f64, usize)> = points
            .rows_iter()
            .enumerate()
            .filter(|(j, _)| Some(*j) != exclude)
            .map(|(j, row)| (squared_distance(query, row), j))
            .collect();
        dists.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        Ok(dists.into_iter().take(k).map(|(_, j)| j).collect())
    }

    /// For every indexed point, its `k` nearest other points.
    pub fn kneighbors_graph(&self, k: usize) -> MlResult<Vec<Vec<usize>>> {
        let points = self
            .points
            .as_ref()
            .ok_or(MlError::NotFitted("NearestNeighbors"))?;
        (0..points.n_rows())
            .into_par_iter()
            .map(|i| self.kneighbors(points.row(i), k, Some(i)))
            .collect()
    }
}
