//! Dense matrix operations
//!
//! Row-major dense matrix stored as a list of row [`Vector`]s. Rows are
//! mutable in place (reduction works on them directly) but the shape is
//! fixed once the matrix is built.

use crate::error::{expect_dim, LatticeError, Result};
use crate::scalar::Scalar;
use crate::vector::Vector;
use num_bigint::BigInt;
use std::fmt;

/// Dense matrix in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    data: Vec<Vector<T>>,
    rows: usize,
    cols: usize,
}

/// Partial-pivot elimination result: P·A = L·U
///
/// Row i of P·A is row `permutation[i]` of A.
#[derive(Debug, Clone)]
pub struct LuDecomposition<T> {
    pub permutation: Vec<usize>,
    pub lower: Matrix<T>,
    pub upper: Matrix<T>,
    /// Number of row exchanges (sign of the determinant)
    pub swaps: usize,
}

impl<T: Scalar> LuDecomposition<T> {
    /// The permutation as an explicit matrix P
    pub fn permutation_matrix(&self) -> Matrix<T> {
        let n = self.permutation.len();
        let rows = self
            .permutation
            .iter()
            .map(|&p| Vector::unit(n, p))
            .collect();
        Matrix {
            data: rows,
            rows: n,
            cols: n,
        }
    }

    /// det(A) = (-1)^swaps · Π u_ii
    pub fn determinant(&self) -> T {
        let diag = (0..self.upper.rows).fold(T::one(), |acc, i| acc * self.upper.get(i, i).clone());
        if self.swaps % 2 == 1 {
            -diag
        } else {
            diag
        }
    }
}

impl<T: Scalar> Matrix<T> {
    /// Create a matrix from row vectors; every row must have the same length
    pub fn new(rows: Vec<Vector<T>>) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        for row in &rows {
            expect_dim(cols, row.len())?;
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data: rows,
        })
    }

    /// Create a zero matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![Vector::zeros(cols); rows],
            rows,
            cols,
        }
    }

    /// Create an identity matrix
    pub fn identity(n: usize) -> Self {
        Self {
            data: (0..n).map(|i| Vector::unit(n, i)).collect(),
            rows: n,
            cols: n,
        }
    }

    pub fn from_i64_rows(rows: &[Vec<i64>]) -> Result<Self> {
        Self::new(rows.iter().map(|r| Vector::from_i64(r)).collect())
    }

    pub fn from_integer_rows(rows: &[Vec<BigInt>]) -> Result<Self> {
        Self::new(
            rows.iter()
                .map(|r| Vector::new(r.iter().map(T::from_bigint).collect()))
                .collect(),
        )
    }

    /// Get matrix dimensions
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Get number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Access element at (i, j)
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[i][j]
    }

    /// Overwrite element at (i, j)
    pub fn set(&mut self, i: usize, j: usize, value: T) -> Result<()> {
        match self.data.get_mut(i) {
            Some(row) => row.set(j, value),
            None => Err(LatticeError::DimensionMismatch {
                expected: self.rows,
                actual: i + 1,
            }),
        }
    }

    /// Get a row
    pub fn row(&self, i: usize) -> &Vector<T> {
        &self.data[i]
    }

    /// Replace a row; the new row must have `cols` entries
    pub fn set_row(&mut self, i: usize, row: Vector<T>) -> Result<()> {
        expect_dim(self.cols, row.len())?;
        match self.data.get_mut(i) {
            Some(slot) => {
                *slot = row;
                Ok(())
            }
            None => Err(LatticeError::DimensionMismatch {
                expected: self.rows,
                actual: i + 1,
            }),
        }
    }

    pub fn iter_rows(&self) -> std::slice::Iter<'_, Vector<T>> {
        self.data.iter()
    }

    pub fn into_rows(self) -> Vec<Vector<T>> {
        self.data
    }

    /// Swap two rows in place
    pub fn swap_rows(&mut self, i: usize, j: usize) {
        self.data.swap(i, j);
    }

    /// Copy of this matrix with rows i and j exchanged
    pub fn with_rows_swapped(&self, i: usize, j: usize) -> Self {
        let mut m = self.clone();
        m.swap_rows(i, j);
        m
    }

    /// row[i] -= row[j] * factor
    pub fn sub_scaled_row(&mut self, i: usize, j: usize, factor: &T) {
        let scaled = self.data[j].scale(factor);
        // Both rows have `cols` entries, so this cannot mismatch
        if let Ok(updated) = self.data[i].sub(&scaled) {
            self.data[i] = updated;
        }
    }

    pub fn negate_row(&mut self, i: usize) {
        self.data[i] = self.data[i].scale(&-T::one());
    }

    /// Σ coeffs[i] · row[i]
    pub fn combine_rows(&self, coeffs: &[T]) -> Result<Vector<T>> {
        expect_dim(self.rows, coeffs.len())?;
        let mut acc = Vector::zeros(self.cols);
        for (row, c) in self.data.iter().zip(coeffs) {
            if !c.is_zero() {
                acc = acc.add(&row.scale(c))?;
            }
        }
        Ok(acc)
    }

    /// Standard matrix product self · other
    pub fn mul(&self, other: &Self) -> Result<Self> {
        expect_dim(self.cols, other.rows)?;
        let mut out = Self::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            let coeffs = self.data[i].as_slice();
            out.data[i] = if other.rows == 0 {
                Vector::zeros(other.cols)
            } else {
                other.combine_rows(coeffs)?
            };
        }
        Ok(out)
    }

    pub fn transpose(&self) -> Self {
        let data = (0..self.cols)
            .map(|j| Vector::new((0..self.rows).map(|i| self.get(i, j).clone()).collect()))
            .collect();
        Self {
            data,
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Extract the `rows × cols` block starting at (row_offset, col_offset)
    pub fn submatrix(
        &self,
        row_offset: usize,
        col_offset: usize,
        rows: usize,
        cols: usize,
    ) -> Result<Self> {
        if row_offset + rows > self.rows {
            return Err(LatticeError::DimensionMismatch {
                expected: self.rows,
                actual: row_offset + rows,
            });
        }
        if col_offset + cols > self.cols {
            return Err(LatticeError::DimensionMismatch {
                expected: self.cols,
                actual: col_offset + cols,
            });
        }
        let data = self.data[row_offset..row_offset + rows]
            .iter()
            .map(|r| Vector::new(r.as_slice()[col_offset..col_offset + cols].to_vec()))
            .collect();
        Ok(Self { data, rows, cols })
    }

    /// Copy with every all-zero row dropped
    pub fn without_zero_rows(&self) -> Self {
        let data: Vec<Vector<T>> = self.data.iter().filter(|r| !r.is_zero()).cloned().collect();
        Self {
            rows: data.len(),
            cols: self.cols,
            data,
        }
    }

    /// Convert every entry to another scalar type
    pub fn map<U: Scalar>(&self, f: impl Fn(&T) -> U) -> Matrix<U> {
        Matrix {
            data: self.data.iter().map(|r| r.map(&f)).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Partial-pivot Gaussian elimination
    ///
    /// Singular matrices are decomposed too: a column with no usable pivot
    /// is skipped and leaves a zero on the diagonal of U.
    pub fn lu(&self) -> Result<LuDecomposition<T>> {
        if !self.is_square() {
            return Err(LatticeError::DimensionMismatch {
                expected: self.rows,
                actual: self.cols,
            });
        }
        let n = self.rows;
        let mut upper = self.clone();
        let mut lower = Self::zeros(n, n);
        let mut permutation: Vec<usize> = (0..n).collect();
        let mut swaps = 0;

        for k in 0..n {
            // Largest magnitude in column k at or below the diagonal
            let mut pivot = k;
            for i in k + 1..n {
                if upper.get(i, k).abs() > upper.get(pivot, k).abs() {
                    pivot = i;
                }
            }
            if upper.get(pivot, k).is_zero() {
                continue;
            }

            if pivot != k {
                upper.swap_rows(k, pivot);
                lower.swap_rows(k, pivot);
                permutation.swap(k, pivot);
                swaps += 1;
            }

            let pivot_value = upper.get(k, k).clone();
            for i in k + 1..n {
                if upper.get(i, k).is_zero() {
                    continue;
                }
                let factor = upper.get(i, k).checked_div(&pivot_value)?;
                upper.sub_scaled_row(i, k, &factor);
                lower.set(i, k, factor)?;
            }
        }

        for i in 0..n {
            lower.set(i, i, T::one())?;
        }

        Ok(LuDecomposition {
            permutation,
            lower,
            upper,
            swaps,
        })
    }

    /// Determinant of a square matrix
    pub fn determinant(&self) -> Result<T> {
        Ok(self.lu()?.determinant())
    }

    /// Inverse of a square matrix; fails with `Singular` when det = 0
    pub fn inverse(&self) -> Result<Self> {
        let lu = self.lu()?;
        let n = self.rows;
        if (0..n).any(|i| lu.upper.get(i, i).is_zero()) {
            return Err(LatticeError::Singular);
        }

        let mut columns = Vec::with_capacity(n);
        for j in 0..n {
            // Forward substitution: L y = P e_j
            let mut y: Vec<T> = Vec::with_capacity(n);
            for i in 0..n {
                let mut acc = if lu.permutation[i] == j { T::one() } else { T::zero() };
                for (k, yk) in y.iter().enumerate() {
                    acc = acc - lu.lower.get(i, k).clone() * yk.clone();
                }
                y.push(acc);
            }

            // Back substitution: U x = y
            let mut x = vec![T::zero(); n];
            for i in (0..n).rev() {
                let mut acc = y[i].clone();
                for k in i + 1..n {
                    acc = acc - lu.upper.get(i, k).clone() * x[k].clone();
                }
                x[i] = acc.checked_div(lu.upper.get(i, i))?;
            }
            columns.push(Vector::new(x));
        }

        Ok(Self {
            data: columns,
            rows: n,
            cols: n,
        }
        .transpose())
    }
}

impl<T: Scalar> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix ({}×{}):", self.rows, self.cols)?;
        for (i, v) in self.data.iter().enumerate() {
            writeln!(f, "  b_{}: {}", i, v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::Rational;
    use proptest::prelude::*;

    fn rat(rows: &[Vec<i64>]) -> Matrix<Rational> {
        Matrix::from_i64_rows(rows).unwrap()
    }

    #[test]
    fn test_matrix_access() {
        let m = rat(&[vec![0, 1, 2], vec![3, 4, 5]]);

        assert_eq!(m.dims(), (2, 3));
        assert_eq!(m.get(0, 0), &Rational::from(0));
        assert_eq!(m.get(0, 2), &Rational::from(2));
        assert_eq!(m.get(1, 0), &Rational::from(3));
        assert_eq!(m.get(1, 2), &Rational::from(5));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Matrix::<Rational>::from_i64_rows(&[vec![1, 2], vec![3]]).unwrap_err();
        assert_eq!(err, LatticeError::DimensionMismatch { expected: 2, actual: 1 });
    }

    #[test]
    fn test_identity() {
        let id: Matrix<Rational> = Matrix::identity(3);
        assert_eq!(id.get(0, 0), &Rational::one());
        assert_eq!(id.get(1, 1), &Rational::one());
        assert_eq!(id.get(0, 1), &Rational::zero());
    }

    #[test]
    fn test_multiply_and_transpose() {
        let a = rat(&[vec![1, 2], vec![3, 4], vec![5, 6]]);
        let b = rat(&[vec![1, 0, -1], vec![2, 1, 0]]);

        let ab = a.mul(&b).unwrap();
        assert_eq!(ab, rat(&[vec![5, 2, -1], vec![11, 4, -3], vec![17, 6, -5]]));
        assert_eq!(a.transpose(), rat(&[vec![1, 3, 5], vec![2, 4, 6]]));
        assert_eq!(
            a.mul(&a),
            Err(LatticeError::DimensionMismatch { expected: 2, actual: 3 })
        );
    }

    #[test]
    fn test_row_operations() {
        let mut m = rat(&[vec![1, 2], vec![3, 4]]);
        m.sub_scaled_row(1, 0, &Rational::from(3));
        assert_eq!(m, rat(&[vec![1, 2], vec![0, -2]]));

        let swapped = m.with_rows_swapped(0, 1);
        assert_eq!(swapped, rat(&[vec![0, -2], vec![1, 2]]));
        // The copying variant leaves the original alone
        assert_eq!(m.row(0), &Vector::from_i64(&[1, 2]));

        m.negate_row(1);
        assert_eq!(m.row(1), &Vector::from_i64(&[0, 2]));
        assert!(m.set_row(0, Vector::from_i64(&[1])).is_err());
    }

    #[test]
    fn test_submatrix() {
        let m = rat(&[vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]);
        assert_eq!(m.submatrix(1, 1, 2, 2).unwrap(), rat(&[vec![5, 6], vec![8, 9]]));
        assert!(m.submatrix(2, 0, 2, 1).is_err());
        assert!(m.submatrix(0, 2, 1, 2).is_err());
    }

    #[test]
    fn test_determinant() {
        let m = rat(&[vec![2, 0, 1], vec![1, 3, 2], vec![1, 1, 1]]);
        // 2(3-2) - 0 + 1(1-3) = 0
        assert_eq!(m.determinant().unwrap(), Rational::zero());

        let m = rat(&[vec![0, 1], vec![1, 0]]);
        assert_eq!(m.determinant().unwrap(), Rational::from(-1));

        let m = rat(&[vec![1, 103, 107], vec![0, 200, 0], vec![0, 0, 200]]);
        assert_eq!(m.determinant().unwrap(), Rational::from(40_000));
    }

    #[test]
    fn test_inverse() {
        let m = rat(&[vec![4, 7], vec![2, 6]]);
        let inv = m.inverse().unwrap();
        assert_eq!(m.mul(&inv).unwrap(), Matrix::identity(2));
        assert_eq!(inv.get(0, 0), &Rational::from_ratio(3, 5).unwrap());

        let singular = rat(&[vec![1, 2], vec![2, 4]]);
        assert_eq!(singular.inverse(), Err(LatticeError::Singular));
        assert!(rat(&[vec![1, 2, 3]]).inverse().is_err());
    }

    #[test]
    fn test_without_zero_rows() {
        let m = rat(&[vec![0, 0], vec![1, 2], vec![0, 0]]);
        assert_eq!(m.without_zero_rows(), rat(&[vec![1, 2]]));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_lu_is_exact(n in 1usize..5, seed in proptest::collection::vec(-9i64..10, 25)) {
            let rows: Vec<Vec<i64>> = (0..n).map(|i| seed[i * n..(i + 1) * n].to_vec()).collect();
            let a = rat(&rows);
            let lu = a.lu().unwrap();

            let pa = lu.permutation_matrix().mul(&a).unwrap();
            let product = lu.lower.mul(&lu.upper).unwrap();
            prop_assert_eq!(pa, product);

            if !lu.determinant().is_zero() {
                let inv = a.inverse().unwrap();
                prop_assert_eq!(a.mul(&inv).unwrap(), Matrix::identity(n));
            }
        }
    }
}
