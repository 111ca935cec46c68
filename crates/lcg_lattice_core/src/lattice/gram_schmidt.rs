//! Gram-Schmidt orthogonalization
//!
//! Given basis B = [b_0, ..., b_{h-1}], compute orthogonal vectors b*_i and
//! coefficients μ_ij:
//!
//! ```text
//! b*_0 = b_0
//! b*_i = b_i - Σ_{j<i} μ_ij b*_j
//! μ_ij = <b_i, b*_j> / <b*_j, b*_j>
//! ```
//!
//! A zero-length b*_j (linearly dependent input) contributes μ_ij = 0
//! instead of failing, so reduction can continue on degenerate bases.
//! The reducer recomputes this state in full after every basis mutation.

use crate::error::Result;
use crate::matrix::Matrix;
use crate::scalar::Scalar;
use crate::vector::Vector;

/// Gram-Schmidt orthogonalization data
#[derive(Debug, Clone)]
pub struct GramSchmidt<T> {
    /// Orthogonal vectors b*_i as rows (same shape as the basis)
    pub orthogonal: Matrix<T>,
    /// Coefficients μ_ij, populated for j < i; unit diagonal, zero above
    pub mu: Matrix<T>,
    /// Squared norms ||b*_i||^2
    pub norms_sq: Vec<T>,
    /// Basis height
    pub n: usize,
}

impl<T: Scalar> GramSchmidt<T> {
    /// Compute Gram-Schmidt orthogonalization of the rows of `basis`
    pub fn compute(basis: &Matrix<T>) -> Result<Self> {
        let n = basis.rows();
        let mut mu = Matrix::identity(n);
        let mut star: Vec<Vector<T>> = Vec::with_capacity(n);
        let mut norms_sq: Vec<T> = Vec::with_capacity(n);

        for i in 0..n {
            let b_i = basis.row(i);
            let mut b_star = b_i.clone();

            for j in 0..i {
                if norms_sq[j].is_zero() {
                    continue;
                }
                let mu_ij = b_i.dot(&star[j])?.checked_div(&norms_sq[j])?;
                if !mu_ij.is_zero() {
                    b_star = b_star.sub(&star[j].scale(&mu_ij))?;
                }
                mu.set(i, j, mu_ij)?;
            }

            norms_sq.push(b_star.norm_squared());
            star.push(b_star);
        }

        Ok(Self {
            orthogonal: Matrix::new(star)?,
            mu,
            norms_sq,
            n,
        })
    }

    /// Get μ_ij
    pub fn mu(&self, i: usize, j: usize) -> &T {
        self.mu.get(i, j)
    }

    /// Get ||b*_i||^2
    pub fn norm_sq(&self, i: usize) -> &T {
        &self.norms_sq[i]
    }

    /// Check if μ_ij needs size reduction (|μ_ij| > 1/2)
    pub fn needs_size_reduction(&self, i: usize, j: usize) -> bool {
        let mu = self.mu(i, j);
        let two = T::from_i64(2);
        two * mu.abs() > T::one()
    }

    /// Check Lovász condition at position k
    ///
    /// ||b*_k||^2 ≥ (δ - μ_{k,k-1}^2) ||b*_{k-1}||^2
    pub fn check_lovasz(&self, k: usize, delta: &T) -> bool {
        if k == 0 {
            return true;
        }
        let c = self.mu(k, k - 1).clone();
        let bound = (delta.clone() - c.clone() * c) * self.norms_sq[k - 1].clone();
        self.norms_sq[k] >= bound
    }
}
