//! Lattice basis constructors
//!
//! A basis is a [`Matrix`] whose row i is the i-th generating vector b_i.
//! The lattice L(B) = {Σ x_i b_i : x_i ∈ Z}.

use crate::matrix::Matrix;
use crate::rational::Rational;
use crate::vector::Vector;
use rand::Rng;

/// Create a lattice basis from integer rows
///
/// # Panics
/// Panics if rows have inconsistent dimensions; use
/// [`Matrix::from_i64_rows`] for a fallible version.
pub fn from_rows(rows: &[Vec<i64>]) -> Matrix<Rational> {
    Matrix::from_i64_rows(rows).expect("All vectors must have the same dimension")
}

/// Create a random lattice basis for testing
///
/// # Arguments
/// * `n` - Number of basis vectors (rank)
/// * `m` - Dimension of ambient space
/// * `bits` - Maximum bit size of entries
pub fn random(n: usize, m: usize, bits: usize) -> Matrix<Rational> {
    let mut rng = rand::thread_rng();
    let half = 1i64 << (bits.clamp(1, 62) - 1);

    let rows = (0..n)
        .map(|_| {
            Vector::new(
                (0..m)
                    .map(|_| Rational::from(rng.gen_range(-half..half)))
                    .collect(),
            )
        })
        .collect();

    Matrix::new(rows).unwrap_or_else(|_| Matrix::zeros(n, m))
}

/// Create a knapsack/subset-sum lattice for testing
///
/// Given a = [a_1, ..., a_n] and target s, creates the lattice:
/// ```text
/// [ 2  0  0 ... 0  a_1 ]
/// [ 0  2  0 ... 0  a_2 ]
/// [ 0  0  2 ... 0  a_3 ]
/// [ ...                ]
/// [ 1  1  1 ... 1   s  ]
/// ```
pub fn knapsack(a: &[i64], s: i64) -> Matrix<Rational> {
    let n = a.len() + 1;
    let mut rows = vec![vec![0i64; n]; n];

    // First n-1 rows: diagonal 2's with a_i in last column
    for (i, &ai) in a.iter().enumerate() {
        rows[i][i] = 2;
        rows[i][n - 1] = ai;
    }

    // Last row: all 1's with s in last column
    for j in 0..a.len() {
        rows[n - 1][j] = 1;
    }
    rows[n - 1][n - 1] = s;

    from_rows(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basis_creation() {
        let basis = from_rows(&[vec![1, 0, 3], vec![0, 1, 5], vec![0, 0, 7]]);
        assert_eq!(basis.dims(), (3, 3));
    }

    #[test]
    fn test_knapsack_lattice() {
        let basis = knapsack(&[1, 2, 3], 5);

        assert_eq!(basis.dims(), (4, 4));
        assert_eq!(basis.get(0, 0), &Rational::from(2));
        assert_eq!(basis.get(0, 3), &Rational::from(1));
        assert_eq!(basis.get(3, 0), &Rational::from(1));
        assert_eq!(basis.get(3, 3), &Rational::from(5));
    }

    #[test]
    fn test_random_bounds() {
        let basis = random(4, 5, 8);
        assert_eq!(basis.dims(), (4, 5));
        let bound = Rational::from(128);
        assert!(basis
            .iter_rows()
            .all(|r| r.iter().all(|x| x.is_integer() && x.abs() <= bound)));
    }
}
