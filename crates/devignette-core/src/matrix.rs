//! Dense row-major matrix kernel
//!
//! Small dense `f64` matrices for the normal equations of the radial
//! least-squares estimator:
//!
//! - [`Matrix::multiply`] - accumulate-and-store product into a fresh matrix
//! - [`Matrix::transpose`]
//! - [`Matrix::invert`] - in-place Gauss-Jordan inversion with full pivoting
//!
//! # Examples
//!
//! ```
//! use devignette_core::Matrix;
//!
//! let mut m = Matrix::from_vec(2, 2, vec![4.0, 7.0, 2.0, 6.0]).unwrap();
//! let original = m.clone();
//! assert!(m.invert());
//! let product = original.multiply(&m).unwrap();
//! assert!((product.get(0, 0) - 1.0).abs() < 1e-12);
//! assert!(product.get(0, 1).abs() < 1e-12);
//! ```

use crate::error::{Error, Result};

/// Dense row-major matrix of `f64`
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a zero-filled `rows` x `cols` matrix
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create the `n` x `n` identity matrix
    pub fn identity(n: usize) -> Self {
        let mut m = Self::new(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Create a matrix from row-major data
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidParameter(format!(
                "data length {} doesn't match {}x{}",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Number of rows
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Element at (row, col)
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the matrix.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols, "matrix index out of range");
        self.data[row * self.cols + col]
    }

    /// Set element at (row, col)
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the matrix.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        assert!(row < self.rows && col < self.cols, "matrix index out of range");
        self.data[row * self.cols + col] = value;
    }

    /// Add `value` to the element at (row, col)
    #[inline]
    pub fn add_at(&mut self, row: usize, col: usize, value: f64) {
        assert!(row < self.rows && col < self.cols, "matrix index out of range");
        self.data[row * self.cols + col] += value;
    }

    /// Row-major element storage
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable row-major element storage
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Consume the matrix and return its row-major elements
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Multiply `self` (i x k) by `other` (k x j), returning a new i x j matrix
    ///
    /// # Errors
    ///
    /// Returns `Error::ShapeMismatch` if the inner dimensions differ.
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(Error::ShapeMismatch {
                left: (self.rows, self.cols),
                right: (other.rows, other.cols),
            });
        }

        let (ni, nk, nj) = (self.rows, self.cols, other.cols);
        let mut result = Matrix::new(ni, nj);
        for i in 0..ni {
            for j in 0..nj {
                let mut acc = 0.0;
                for k in 0..nk {
                    acc += self.data[i * nk + k] * other.data[k * nj + j];
                }
                result.data[i * nj + j] = acc;
            }
        }
        Ok(result)
    }

    /// Return the transpose (n x m) of this m x n matrix
    pub fn transpose(&self) -> Matrix {
        let mut result = Matrix::new(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                result.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        result
    }

    /// Invert a square matrix in place.
    ///
    /// Gauss-Jordan elimination with full pivoting. At each step the
    /// largest remaining element is moved to the pivot position; the row
    /// and column swaps are undone in reverse order at the end.
    ///
    /// Returns `false` if the matrix is not square or a pivot is exactly
    /// zero. The contents are unspecified after a failed inversion.
    pub fn invert(&mut self) -> bool {
        if self.rows != self.cols {
            return false;
        }

        let n = self.rows;
        let m = &mut self.data;
        let mut pivot_rows = vec![0usize; n];
        let mut pivot_cols = vec![0usize; n];

        for k in 0..n {
            let mut max_v = 0.0;
            for i in k..n {
                for j in k..n {
                    let v = m[i * n + j].abs();
                    if v > max_v {
                        max_v = v;
                        pivot_rows[k] = i;
                        pivot_cols[k] = j;
                    }
                }
            }

            if max_v == 0.0 {
                return false;
            }

            if pivot_rows[k] != k {
                for j in 0..n {
                    m.swap(k * n + j, pivot_rows[k] * n + j);
                }
            }
            if pivot_cols[k] != k {
                for i in 0..n {
                    m.swap(i * n + k, i * n + pivot_cols[k]);
                }
            }

            let pivot = k * n + k;
            m[pivot] = 1.0 / m[pivot];
            let inv = m[pivot];

            for j in (0..n).filter(|&j| j != k) {
                m[k * n + j] *= inv;
            }

            for i in (0..n).filter(|&i| i != k) {
                let factor = m[i * n + k];
                for j in (0..n).filter(|&j| j != k) {
                    m[i * n + j] -= factor * m[k * n + j];
                }
            }

            for i in (0..n).filter(|&i| i != k) {
                m[i * n + k] *= -inv;
            }
        }

        for k in (0..n).rev() {
            if pivot_cols[k] != k {
                for j in 0..n {
                    m.swap(k * n + j, pivot_cols[k] * n + j);
                }
            }
            if pivot_rows[k] != k {
                for i in 0..n {
                    m.swap(i * n + k, i * n + pivot_rows[k]);
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_identity(m: &Matrix, tol: f64) {
        for i in 0..m.rows() {
            for j in 0..m.cols() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (m.get(i, j) - expected).abs() < tol,
                    "element ({i},{j}) = {}",
                    m.get(i, j)
                );
            }
        }
    }

    #[test]
    fn test_identity_and_multiply() {
        let a = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let p = a.multiply(&Matrix::identity(3)).unwrap();
        assert_eq!(p, a);
    }

    #[test]
    fn test_multiply_shape_mismatch() {
        let a = Matrix::new(2, 3);
        let b = Matrix::new(2, 3);
        assert!(a.multiply(&b).is_err());
    }

    #[test]
    fn test_multiply_values() {
        let a = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Matrix::from_vec(2, 1, vec![5.0, 6.0]).unwrap();
        let p = a.multiply(&b).unwrap();
        assert_eq!(p.data(), &[17.0, 39.0]);
    }

    #[test]
    fn test_transpose() {
        let a = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let t = a.transpose();
        assert_eq!((t.rows(), t.cols()), (3, 2));
        assert_eq!(t.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(t.transpose(), a);
    }

    #[test]
    fn test_invert_requires_pivoting() {
        // Zero on the leading diagonal forces row/column swaps
        let a = Matrix::from_vec(3, 3, vec![0.0, 2.0, 1.0, 1.0, 0.0, 3.0, 4.0, 1.0, 0.0]).unwrap();
        let mut inv = a.clone();
        assert!(inv.invert());
        assert_identity(&a.multiply(&inv).unwrap(), 1e-12);
        assert_identity(&inv.multiply(&a).unwrap(), 1e-12);
    }

    #[test]
    fn test_invert_zero_matrix_fails() {
        let mut z = Matrix::new(4, 4);
        assert!(!z.invert());
    }

    #[test]
    fn test_invert_singular_fails() {
        let mut s = Matrix::from_vec(2, 2, vec![1.0, 2.0, 2.0, 4.0]).unwrap();
        assert!(!s.invert());
    }

    #[test]
    fn test_invert_non_square_fails() {
        let mut m = Matrix::new(2, 3);
        assert!(!m.invert());
    }
}
