use crate::error::{MlError, MlResult};

/// Dense 2-D matrix of `f64`. Rows are samples, columns are features.
///
/// Stores data in a flat contiguous `Vec<f64>` with row-major layout so a
/// row is always a contiguous slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl Matrix {
    /// Create a matrix from raw row-major data.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> MlResult<Self> {
        if cols == 0 {
            return Err(MlError::InvalidOperation(
                "a matrix needs at least one column".to_string(),
            ));
        }
        if data.len() != rows * cols {
            return Err(MlError::ShapeMismatch {
                expected: vec![rows, cols],
                got: vec![data.len()],
            });
        }
        Ok(Matrix { data, rows, cols })
    }

    /// Create an empty matrix with room for `capacity` rows.
    pub fn with_capacity(cols: usize, capacity: usize) -> MlResult<Self> {
        Matrix::new(Vec::with_capacity(cols * capacity), 0, cols)
    }

    /// Create a matrix from a slice of equally long rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> MlResult<Self> {
        let first = rows.first().ok_or(MlError::EmptyMatrix)?;
        let cols = first.len();
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(MlError::ShapeMismatch {
                    expected: vec![cols],
                    got: vec![row.len()],
                });
            }
            data.extend_from_slice(row);
        }
        Matrix::new(data, rows.len(), cols)
    }

    /// A single-row matrix.
    pub fn from_row(row: &[f64]) -> MlResult<Self> {
        Matrix::new(row.to_vec(), 1, row.len())
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Borrow row `i`. Panics when `i` is out of range, like slice indexing.
    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        let start = i * self.cols;
        &mut self.data[start..start + self.cols]
    }

    pub fn rows_iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.cols)
    }

    /// Iterate over column `j` top to bottom.
    pub fn column(&self, j: usize) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().skip(j).step_by(self.cols).copied()
    }

    // ─── Row manipulation ───────────────────────────────────────────────────

    /// Append one row; its length must equal the column count.
    pub fn push_row(&mut self, row: &[f64]) -> MlResult<()> {
        if row.len() != self.cols {
            return Err(MlError::ShapeMismatch {
                expected: vec![self.cols],
                got: vec![row.len()],
            });
        }
        self.data.extend_from_slice(row);
        self.rows += 1;
        Ok(())
    }

    /// Gather rows by index into a new matrix. Indices may repeat.
    pub fn select_rows(&self, indices: &[usize]) -> MlResult<Matrix> {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            if i >= self.rows {
                return Err(MlError::IndexOutOfBounds { index: i, axis: 0, size: self.rows });
            }
            data.extend_from_slice(self.row(i));
        }
        Matrix::new(data, indices.len(), self.cols)
    }

    /// Stack `other` below `self`.
    pub fn vstack(&self, other: &Matrix) -> MlResult<Matrix> {
        if other.cols != self.cols {
            return Err(MlError::ShapeMismatch {
                expected: vec![other.rows, self.cols],
                got: vec![other.rows, other.cols],
            });
        }
        let mut data = Vec::with_capacity(self.data.len() + other.data.len());
        data.extend_from_slice(&self.data);
        data.extend_from_slice(&other.data);
        Matrix::new(data, self.rows + other.rows, self.cols)
    }

    // ─── Reductions ─────────────────────────────────────────────────────────

    /// Per-column mean.
    pub fn mean_axis0(&self) -> MlResult<Vec<f64>> {
        if self.rows == 0 {
            return Err(MlError::EmptyMatrix);
        }
        let mut sums = vec![0.0; self.cols];
        for row in self.rows_iter() {
            for (s, &v) in sums.iter_mut().zip(row) {
                *s += v;
            }
        }
        let n = self.rows as f64;
        Ok(sums.into_iter().map(|s| s / n).collect())
    }

    /// Per-column population standard deviation (ddof = 0).
    pub fn std_axis0(&self) -> MlResult<Vec<f64>> {
        let mean = self.mean_axis0()?;
        let mut sq = vec![0.0; self.cols];
        for row in self.rows_iter() {
            for ((s, &v), &mu) in sq.iter_mut().zip(row).zip(&mean) {
                let d = v - mu;
                *s += d * d;
            }
        }
        let n = self.rows as f64;
        Ok(sq.into_iter().map(|s| (s / n).sqrt()).collect())
    }
}
