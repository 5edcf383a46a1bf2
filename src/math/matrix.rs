use rand::Rng;

use crate::error::{NnError, Result};

/// Dense row-major matrix of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Samples every entry uniformly from `[-bound, bound]`.
    pub fn uniform<R: Rng + ?Sized>(rows: usize, cols: usize, bound: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);

        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = rng.gen_range(-bound..=bound);
            }
        }

        res
    }

    /// Builds a matrix from rows, rejecting empty or ragged input.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map(Vec::len).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(NnError::InvalidConfig(
                "matrix must have at least one row and one column".to_owned(),
            ));
        }
        if let Some(bad) = data.iter().find(|row| row.len() != cols) {
            return Err(NnError::dimension("matrix row", cols, bad.len()));
        }
        Ok(Matrix { rows, cols, data })
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i]
    }

    /// `self -= scale * other`, element-wise and in place.
    pub fn sub_scaled(&mut self, other: &Matrix, scale: f64) {
        debug_assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        for (row, other_row) in self.data.iter_mut().zip(other.data.iter()) {
            for (x, g) in row.iter_mut().zip(other_row.iter()) {
                *x -= g * scale;
            }
        }
    }
}
