//! BKZ block reduction
//!
//! Each tour slides a window [k, k+β) over an LLL-reduced basis. Inside the
//! window the projected lattice π_k(b_k), ..., π_k(b_{k+β-1}) is written in
//! Gram-Schmidt coordinates (the μ block, unit lower triangular) and searched
//! with the constrained enumerator for a vector shorter than δ·||b*_k||².
//! A hit is inserted at position k by unimodular row operations and the
//! whole basis is LLL-reduced again.
//!
//! Block size 2 is plain LLL.

use super::gram_schmidt::GramSchmidt;
use super::lll::{Lll, LllConfig, LllStats};
use crate::enumerate::{box_constraints, Enumeration};
use crate::error::{LatticeError, Result};
use crate::matrix::Matrix;
use crate::rational::Rational;
use crate::vector::Vector;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};
use std::time::Instant;

/// BKZ configuration parameters
#[derive(Debug, Clone)]
pub struct BkzConfig {
    /// Window size β; 2 degenerates to LLL
    pub block_size: usize,
    /// LLL pass run before the first tour and after every insertion
    pub lll: LllConfig<Rational>,
    /// Upper bound on full tours over the basis
    pub max_tours: usize,
    /// Search-node budget for one block
    ///
    /// The block search walks the bounding box of the norm ball, and every
    /// node costs two exact LP solves per free coefficient. Without a budget
    /// blocks of size 6 and up on 16-bit inputs can take minutes.
    pub enumeration_limit: Option<u64>,
}

impl Default for BkzConfig {
    fn default() -> Self {
        Self {
            block_size: 10,
            lll: LllConfig::strong(),
            max_tours: 8,
            enumeration_limit: Some(100_000),
        }
    }
}

impl BkzConfig {
    pub fn new(block_size: usize, delta: Rational) -> Self {
        Self {
            block_size,
            lll: LllConfig::new(delta),
            ..Self::default()
        }
    }

    pub fn with_transform(mut self) -> Self {
        self.lll.track_transform = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_size < 2 {
            return Err(LatticeError::InvalidParameter(format!(
                "block size must be at least 2, got {}",
                self.block_size
            )));
        }
        self.lll.validate()
    }
}

/// Statistics from BKZ execution
#[derive(Debug, Clone, Default)]
pub struct BkzStats {
    pub tours: usize,
    pub insertions: usize,
    /// Blocks handed to the enumerator
    pub enumerations: usize,
    pub nodes_expanded: u64,
    /// Blocks whose search hit the node budget
    pub truncated_blocks: usize,
    /// Accumulated over every LLL pass
    pub lll: LllStats,
    pub total_time: f64,
}

/// A block-reduced basis with its optional transformation matrix
#[derive(Debug, Clone)]
pub struct BlockReduction {
    pub basis: Matrix<Rational>,
    /// Unimodular T with `T · input = basis`, when tracking was requested
    pub transform: Option<Matrix<Rational>>,
    pub stats: BkzStats,
}

/// BKZ lattice reduction algorithm
pub struct Bkz;

impl Bkz {
    pub fn reduce(basis: &Matrix<Rational>, config: &BkzConfig) -> Result<BlockReduction> {
        config.validate()?;
        let start = Instant::now();
        let mut stats = BkzStats::default();
        let mut b = basis.clone();
        let mut transform = config
            .lll
            .track_transform
            .then(|| Matrix::identity(basis.rows()));

        let lll_stats = Lll::reduce_in_place(&mut b, transform.as_mut(), &config.lll)?;
        stats.lll.absorb(&lll_stats);

        let n = b.rows();
        if config.block_size > 2 && n > 1 {
            for tour in 0..config.max_tours {
                let insertions = stats.insertions;

                for k in 0..n - 1 {
                    let h = (k + config.block_size).min(n);
                    let gs = GramSchmidt::compute(&b)?;
                    if (k..h).any(|i| gs.norm_sq(i).is_zero()) {
                        continue;
                    }

                    let Some(x) = Self::shortest_in_block(&gs, k, h, config, &mut stats)? else {
                        continue;
                    };
                    Self::insert(&mut b, transform.as_mut(), k, &x);
                    let lll_stats = Lll::reduce_in_place(&mut b, transform.as_mut(), &config.lll)?;
                    stats.lll.absorb(&lll_stats);
                    stats.insertions += 1;
                }

                stats.tours += 1;
                log::debug!(
                    "BKZ tour {}: {} insertions, {} nodes so far",
                    tour + 1,
                    stats.insertions - insertions,
                    stats.nodes_expanded
                );
                if stats.insertions == insertions {
                    break;
                }
            }
        }

        stats.total_time = start.elapsed().as_secs_f64();
        log::info!(
            "BKZ-{} completed: n={}, {} tours, {} insertions, {} enumerations, {:.3}s",
            config.block_size,
            n,
            stats.tours,
            stats.insertions,
            stats.enumerations,
            stats.total_time
        );

        Ok(BlockReduction {
            basis: b,
            transform,
            stats,
        })
    }

    /// Coefficients (over rows k..h) of a vector whose projection beats
    /// δ·||b*_k||², the shortest one found
    fn shortest_in_block(
        gs: &GramSchmidt<Rational>,
        k: usize,
        h: usize,
        config: &BkzConfig,
        stats: &mut BkzStats,
    ) -> Result<Option<Vec<BigInt>>> {
        let d = h - k;
        let target = &config.lll.delta * gs.norm_sq(k);

        // |y_i|² ||b*_i||² < target bounds every GS coordinate
        let mut hi = Vec::with_capacity(d);
        for i in k..h {
            let q = target.checked_div(gs.norm_sq(i))?.ceil();
            let mut s = if q.is_positive() { q.sqrt() } else { BigInt::zero() };
            if &s * &s < q {
                s += 1;
            }
            hi.push(Rational::from(s));
        }
        let lo: Vec<Rational> = hi.iter().map(|s| -s).collect();

        let block = gs.mu.submatrix(k, k, d, d)?;
        let mut search = Enumeration::new(&block, &Vector::zeros(d), &box_constraints(&lo, &hi)?)?;
        if let Some(limit) = config.enumeration_limit {
            search = search.with_node_limit(limit);
        }
        stats.enumerations += 1;

        let mut best: Option<(Rational, Vec<BigInt>)> = None;
        for candidate in search.by_ref() {
            if candidate.coefficients.iter().all(Zero::is_zero) {
                continue;
            }
            let norm = candidate
                .point
                .iter()
                .zip(&gs.norms_sq[k..h])
                .fold(Rational::zero(), |acc, (y, b)| acc + &(y * y) * b);
            let shorter = match &best {
                Some((best_norm, _)) => &norm < best_norm,
                None => norm < target,
            };
            if shorter {
                best = Some((norm, candidate.coefficients));
            }
        }
        stats.nodes_expanded += search.nodes_expanded();
        if let Some(e) = search.take_error() {
            return Err(e);
        }
        if search.is_truncated() {
            stats.truncated_blocks += 1;
            log::debug!("Block [{}, {}) hit the node budget", k, h);
        }

        Ok(best.map(|(_, x)| x))
    }

    /// Make Σ x_i b_{k+i} (or a primitive divisor of it) row k
    ///
    /// Euclidean steps `b_a += q b_i, x_i -= q x_a` keep the combination
    /// fixed until a single nonzero coefficient is left.
    fn insert(
        basis: &mut Matrix<Rational>,
        mut transform: Option<&mut Matrix<Rational>>,
        k: usize,
        x: &[BigInt],
    ) {
        let mut x = x.to_vec();

        loop {
            let Some(a) = (0..x.len())
                .filter(|&i| !x[i].is_zero())
                .min_by(|&i, &j| x[i].abs().cmp(&x[j].abs()))
            else {
                return;
            };

            let mut done = true;
            for i in 0..x.len() {
                if i == a || x[i].is_zero() {
                    continue;
                }
                done = false;
                let q = x[i].div_floor(&x[a]);
                let step = &q * &x[a];
                x[i] -= step;
                let factor = Rational::from(-q);
                basis.sub_scaled_row(k + a, k + i, &factor);
                if let Some(t) = transform.as_deref_mut() {
                    t.sub_scaled_row(k + a, k + i, &factor);
                }
            }

            if done {
                for j in (k..k + a).rev() {
                    basis.swap_rows(j, j + 1);
                    if let Some(t) = transform.as_deref_mut() {
                        t.swap_rows(j, j + 1);
                    }
                }
                if x[a].is_negative() {
                    basis.negate_row(k);
                    if let Some(t) = transform.as_deref_mut() {
                        t.negate_row(k);
                    }
                }
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::basis;

    fn q(n: i64, d: i64) -> Rational {
        Rational::from_ratio(n, d).unwrap()
    }

    #[test]
    fn test_block_size_two_is_lll() {
        let b = basis::from_rows(&[vec![1, 103, 107], vec![0, 200, 0], vec![0, 0, 200]]);
        let bkz = Bkz::reduce(&b, &BkzConfig::new(2, q(3, 4))).unwrap();
        let lll = Lll::reduce(&b, &LllConfig::classic()).unwrap();

        assert_eq!(bkz.basis, lll.basis);
        assert_eq!(bkz.stats.tours, 0);
    }

    #[test]
    fn test_invalid_parameters() {
        let b = basis::from_rows(&[vec![1, 0], vec![0, 1]]);
        assert!(matches!(
            Bkz::reduce(&b, &BkzConfig::new(1, q(3, 4))),
            Err(LatticeError::InvalidParameter(_))
        ));
        assert!(matches!(
            Bkz::reduce(&b, &BkzConfig::new(3, q(1, 5))),
            Err(LatticeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_bkz_is_lll_reduced_with_valid_transform() {
        let b = basis::knapsack(&[13, 29, 41], 47);
        let config = BkzConfig::new(3, q(99, 100)).with_transform();
        let result = Bkz::reduce(&b, &config).unwrap();

        assert!(Lll::is_reduced(&result.basis, &q(99, 100)).unwrap());

        let t = result.transform.unwrap();
        assert_eq!(t.mul(&b).unwrap(), result.basis);
        assert_eq!(t.determinant().unwrap().abs(), Rational::one());
    }

    #[test]
    fn test_first_vector_not_longer_than_lll() {
        let b = basis::from_rows(&[
            vec![1, 0, 0, 3511],
            vec![0, 1, 0, 2791],
            vec![0, 0, 1, 1873],
            vec![0, 0, 0, 9973],
        ]);
        let lll = Lll::reduce(&b, &LllConfig::classic()).unwrap();
        let bkz = Bkz::reduce(&b, &BkzConfig::new(4, q(3, 4))).unwrap();

        assert!(bkz.basis.row(0).norm_squared() <= lll.basis.row(0).norm_squared());
        assert!(Lll::is_reduced(&bkz.basis, &q(3, 4)).unwrap());
    }

    #[test]
    fn test_node_budget_bounds_block_search() {
        let b = basis::from_rows(&[
            vec![1, 0, 0, 3511],
            vec![0, 1, 0, 2791],
            vec![0, 0, 1, 1873],
            vec![0, 0, 0, 9973],
        ]);
        let config = BkzConfig {
            enumeration_limit: Some(1),
            ..BkzConfig::new(4, q(3, 4)).with_transform()
        };
        let result = Bkz::reduce(&b, &config).unwrap();

        assert!(result.stats.enumerations > 0);
        assert_eq!(result.stats.truncated_blocks, result.stats.enumerations);
        assert_eq!(result.stats.nodes_expanded, result.stats.enumerations as u64);
        assert_eq!(result.stats.insertions, 0);
        assert!(Lll::is_reduced(&result.basis, &q(3, 4)).unwrap());
        assert_eq!(result.transform.unwrap().mul(&b).unwrap(), result.basis);
    }

    #[test]
    fn test_full_block_finds_shortest_vector() {
        let b = basis::from_rows(&[vec![1, 3, 7], vec![0, 20, 0], vec![0, 0, 20]]);
        let result = Bkz::reduce(&b, &BkzConfig::new(3, Rational::one())).unwrap();
        let first = result.basis.row(0).norm_squared();

        // Every lattice vector inside the ball of radius ||b_0|| is no shorter
        let inverse = b.inverse().unwrap();
        let r = first.floor().sqrt();
        let r = i64::try_from(r).unwrap();
        for x in -r..=r {
            for y in -r..=r {
                for z in -r..=r {
                    let p = Vector::from_i64(&[x, y, z]);
                    let c = inverse.combine_rows(p.as_slice()).unwrap();
                    if p.is_zero() || !c.iter().all(|v| v.is_integer()) {
                        continue;
                    }
                    assert!(p.norm_squared() >= first, "{} is shorter than b_0", p);
                }
            }
        }
    }

    #[test]
    fn test_insert_keeps_lattice() {
        let mut b = basis::from_rows(&[vec![1, 0, 0], vec![0, 1, 0], vec![0, 0, 1]]);
        let mut t = Matrix::identity(3);
        let x = vec![BigInt::from(0), BigInt::from(-3), BigInt::from(5)];

        Bkz::insert(&mut b, Some(&mut t), 0, &x);

        assert_eq!(b.row(0), &Vector::from_i64(&[0, -3, 5]));
        assert_eq!(t.determinant().unwrap().abs(), Rational::one());
        assert_eq!(t, b);
    }
}
