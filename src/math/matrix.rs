use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};

/// Dense row-major matrix.
///
/// A weight matrix for destination layer `l` has shape
/// `[size(l)][size(l - 1)]`, so `data[to][from]` is the weight of the
/// connection from source neuron `from` to destination neuron `to`.
/// Serializes as a bare nested array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![value; cols]; rows],
        }
    }

    /// Samples every entry uniformly from `[low, high)`.
    pub fn uniform<R: Rng + ?Sized>(rows: usize, cols: usize, low: f64, high: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for x in row.iter_mut() {
                *x = low + rng.gen::<f64>() * (high - low);
            }
        }
        res
    }

    /// Builds a matrix from nested rows, rejecting ragged input.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, Vec::len);
        if let Some(bad) = data.iter().find(|row| row.len() != cols) {
            return Err(NetworkError::mismatch("matrix row length", cols, bad.len()));
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Outer product `col ⊗ row`, shape `[col.len()][row.len()]`.
    pub fn outer(col: &[f64], row: &[f64]) -> Matrix {
        Matrix {
            rows: col.len(),
            cols: row.len(),
            data: col
                .iter()
                .map(|c| row.iter().map(|r| c * r).collect())
                .collect(),
        }
    }

    /// `W · v`; `v.len()` must equal `cols`.
    pub fn mul_vec(&self, v: &[f64]) -> Vec<f64> {
        debug_assert_eq!(v.len(), self.cols);
        self.data
            .iter()
            .map(|row| row.iter().zip(v).map(|(w, x)| w * x).sum())
            .collect()
    }

    /// `Wᵀ · v`; `v.len()` must equal `rows`.
    pub fn transpose_mul_vec(&self, v: &[f64]) -> Vec<f64> {
        debug_assert_eq!(v.len(), self.rows);
        let mut res = vec![0.0; self.cols];
        for (row, &scale) in self.data.iter().zip(v) {
            for (acc, w) in res.iter_mut().zip(row) {
                *acc += w * scale;
            }
        }
        res
    }

    /// In-place `self -= other * scale`.
    pub fn sub_scaled_assign(&mut self, other: &Matrix, scale: f64) {
        assert!(
            self.rows == other.rows && self.cols == other.cols,
            "Matrices are of incorrect sizes"
        );
        for (row, other_row) in self.data.iter_mut().zip(&other.data) {
            for (x, d) in row.iter_mut().zip(other_row) {
                *x -= d * scale;
            }
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = NetworkError;

    fn try_from(data: Vec<Vec<f64>>) -> Result<Self> {
        Matrix::from_data(data)
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(m: Matrix) -> Self {
        m.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn mul_vec_uses_to_from_layout() {
        let w = Matrix::from_data(vec![vec![1.0, 2.0, 3.0], vec![0.0, -1.0, 0.5]]).unwrap();
        assert_eq!(w.mul_vec(&[1.0, 1.0, 2.0]), vec![9.0, 0.0]);
    }

    #[test]
    fn transpose_mul_vec_sums_over_destinations() {
        let w = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(w.transpose_mul_vec(&[1.0, 0.0, 2.0]), vec![11.0, 14.0]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, NetworkError::DimensionMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn uniform_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = Matrix::uniform(16, 784, 0.0, 0.1, &mut rng);
        assert_eq!(m.shape(), (16, 784));
        assert!(m.data.iter().flatten().all(|&x| (0.0..0.1).contains(&x)));

        let m = Matrix::uniform(4, 4, -1.0, 1.0, &mut rng);
        assert!(m.data.iter().flatten().all(|&x| (-1.0..1.0).contains(&x)));
        assert!(m.data.iter().flatten().any(|&x| x < 0.0));
    }

    #[test]
    fn outer_and_scaled_subtraction() {
        let mut m = Matrix::filled(2, 2, 1.0);
        let d = Matrix::outer(&[1.0, 2.0], &[0.5, 1.0]);
        m.sub_scaled_assign(&d, 0.5);
        assert_eq!(m.data, vec![vec![0.75, 0.5], vec![0.5, 0.0]]);
    }

    #[test]
    fn serializes_as_nested_array() {
        let m = Matrix::from_data(vec![vec![1.0, 2.0]]).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "[[1.0,2.0]]");
        let back: Matrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
