//! LLL Lattice Reduction Algorithm
//!
//! Given a basis B = [b_0, ..., b_{h-1}], LLL produces a δ-reduced basis satisfying:
//! 1. **Size reduction**: |μ_ij| ≤ 1/2 for all j < i
//! 2. **Lovász condition**: ||b*_k||² ≥ (δ - μ_{k,k-1}²) ||b*_{k-1}||²
//!
//! Gram-Schmidt state is recomputed in full after every row operation. This
//! keeps the exact-arithmetic path simple at the cost of O(h²·m) work per
//! mutation.
//!
//! The transformation-tracking mode applies every row operation to a parallel
//! identity-initialized matrix T, so that on return `T · B_in = B_out`.

use crate::error::{LatticeError, Result};
use crate::matrix::Matrix;
use crate::scalar::Scalar;
use num_traits::Zero;
use std::time::Instant;
use super::gram_schmidt::GramSchmidt;

/// LLL configuration parameters
#[derive(Debug, Clone)]
pub struct LllConfig<T> {
    /// Lovász parameter δ, must lie in (1/4, 1]
    pub delta: T,
    /// Also return the change-of-basis matrix
    pub track_transform: bool,
    /// Stop after this many main-loop iterations (exact arithmetic always
    /// terminates; the cap exists for floating-point runs)
    pub max_iterations: Option<usize>,
}

impl<T: Scalar> Default for LllConfig<T> {
    fn default() -> Self {
        Self::strong()
    }
}

impl<T: Scalar> LllConfig<T> {
    pub fn new(delta: T) -> Self {
        Self {
            delta,
            track_transform: false,
            max_iterations: None,
        }
    }

    /// δ = 0.99 (strong reduction)
    pub fn strong() -> Self {
        Self::new(constant(99, 100))
    }

    /// δ = 3/4 (Lovász's original choice)
    pub fn classic() -> Self {
        Self::new(constant(3, 4))
    }

    /// δ = 0.5 (fast but weaker reduction)
    pub fn fast() -> Self {
        Self::new(constant(1, 2))
    }

    pub fn with_transform(mut self) -> Self {
        self.track_transform = true;
        self
    }

    /// Reject δ outside (1/4, 1]
    pub fn validate(&self) -> Result<()> {
        if self.delta > constant(1, 4) && self.delta <= T::one() {
            Ok(())
        } else {
            Err(LatticeError::InvalidParameter(format!(
                "delta must lie in (1/4, 1], got {}",
                self.delta
            )))
        }
    }
}

fn constant<T: Scalar>(num: i64, den: i64) -> T {
    T::from_ratio(num, den).unwrap_or_else(|_| T::one())
}

/// Statistics from LLL execution
#[derive(Debug, Clone, Default)]
pub struct LllStats {
    /// Number of size reductions performed
    pub size_reductions: usize,
    /// Number of swaps performed
    pub swaps: usize,
    /// Total iterations
    pub iterations: usize,
    /// Time for Gram-Schmidt computation (seconds)
    pub gs_time: f64,
    /// Total time (seconds)
    pub total_time: f64,
    /// Whether the iteration cap cut the run short
    pub truncated: bool,
}

impl LllStats {
    pub fn absorb(&mut self, other: &LllStats) {
        self.size_reductions += other.size_reductions;
        self.swaps += other.swaps;
        self.iterations += other.iterations;
        self.gs_time += other.gs_time;
        self.total_time += other.total_time;
        self.truncated |= other.truncated;
    }
}

/// A reduced basis with its optional transformation matrix
#[derive(Debug, Clone)]
pub struct Reduction<T> {
    pub basis: Matrix<T>,
    /// Unimodular T with `T · input = basis`, when tracking was requested
    pub transform: Option<Matrix<T>>,
    pub stats: LllStats,
}

/// LLL lattice reduction algorithm
pub struct Lll;

impl Lll {
    /// Reduce a lattice basis using the LLL algorithm
    ///
    /// # Arguments
    /// * `basis` - The input lattice basis (rows are generating vectors)
    /// * `config` - LLL configuration parameters
    pub fn reduce<T: Scalar>(basis: &Matrix<T>, config: &LllConfig<T>) -> Result<Reduction<T>> {
        config.validate()?;
        let mut b = basis.clone();
        let mut transform = config
            .track_transform
            .then(|| Matrix::identity(basis.rows()));

        let stats = Self::reduce_in_place(&mut b, transform.as_mut(), config)?;

        Ok(Reduction {
            basis: b,
            transform,
            stats,
        })
    }

    /// Reduce `basis` in place, mirroring every row operation on `transform`
    pub fn reduce_in_place<T: Scalar>(
        basis: &mut Matrix<T>,
        mut transform: Option<&mut Matrix<T>>,
        config: &LllConfig<T>,
    ) -> Result<LllStats> {
        config.validate()?;
        let start = Instant::now();
        let mut stats = LllStats::default();
        let n = basis.rows();

        if n <= 1 {
            stats.total_time = start.elapsed().as_secs_f64();
            return Ok(stats);
        }

        let mut gs = Self::gram_schmidt(basis, &mut stats)?;
        let mut k = 1usize;

        while k < n {
            if config.max_iterations.is_some_and(|cap| stats.iterations >= cap) {
                stats.truncated = true;
                log::warn!(
                    "LLL stopped at iteration cap {} (k={}, n={})",
                    stats.iterations,
                    k,
                    n
                );
                break;
            }
            stats.iterations += 1;

            // Size-reduce b_k against b_{k-1}, ..., b_0
            for j in (0..k).rev() {
                let r = gs.mu(k, j).round_half_up();
                if r.is_zero() {
                    continue;
                }
                let factor = T::from_bigint(&r);
                basis.sub_scaled_row(k, j, &factor);
                if let Some(t) = transform.as_deref_mut() {
                    t.sub_scaled_row(k, j, &factor);
                }
                gs = Self::gram_schmidt(basis, &mut stats)?;
                stats.size_reductions += 1;
            }

            if gs.check_lovasz(k, &config.delta) {
                k += 1;
            } else {
                basis.swap_rows(k, k - 1);
                if let Some(t) = transform.as_deref_mut() {
                    t.swap_rows(k, k - 1);
                }
                gs = Self::gram_schmidt(basis, &mut stats)?;
                stats.swaps += 1;
                k = (k - 1).max(1);
            }

            if stats.iterations % 1000 == 0 {
                log::debug!(
                    "LLL iteration {}: k={}, swaps={}, reductions={}",
                    stats.iterations,
                    k,
                    stats.swaps,
                    stats.size_reductions
                );
            }
        }

        stats.total_time = start.elapsed().as_secs_f64();
        log::debug!(
            "LLL completed: n={}, {} iterations, {} swaps, {} reductions, {:.3}s",
            n,
            stats.iterations,
            stats.swaps,
            stats.size_reductions,
            stats.total_time
        );

        Ok(stats)
    }

    /// Check if a basis is size-reduced and satisfies the Lovász condition
    pub fn is_reduced<T: Scalar>(basis: &Matrix<T>, delta: &T) -> Result<bool> {
        let gs = GramSchmidt::compute(basis)?;
        let n = basis.rows();

        for i in 1..n {
            for j in 0..i {
                if gs.needs_size_reduction(i, j) {
                    return Ok(false);
                }
            }
        }

        Ok((1..n).all(|k| gs.check_lovasz(k, delta)))
    }

    fn gram_schmidt<T: Scalar>(basis: &Matrix<T>, stats: &mut LllStats) -> Result<GramSchmidt<T>> {
        let gs_start = Instant::now();
        let gs = GramSchmidt::compute(basis)?;
        stats.gs_time += gs_start.elapsed().as_secs_f64();
        Ok(gs)
    }
}
