//! Seed reversal: LCG observations to candidate seeds
//!
//! Call i observes the state `x_i = A_i·s + C_i (mod m)` reached after
//! `t_i = Σ_{k≤i} (gap_k + 1)` steps from the seed s, where `(A_i, C_i)` is
//! the generator skipped `t_i` steps. Eliminating s through the first call
//! gives `x_i ≡ a_i·x_0 + d_i` with `a_i = A_i·A_0⁻¹` and
//! `d_i = C_i - a_i·C_0`, so every consistent state vector lies in
//!
//! ```text
//! d + L(B),   B = [ 1  a_1  a_2  ...  ]
//!                 [ 0   m    0   ...  ]
//!                 [ 0   0    m   ...  ]
//!                 [ ...               ]
//! ```
//!
//! Columns are weighted by `lcm(ranges) / range_i` before reduction so every
//! observation window has the same width, the transform T is applied to
//! the unweighted B, and the per-call boxes are enumerated over `d + L(T·B)`.
//! The first coordinate of each point rewinds to a seed.

use crate::enumerate::{box_constraints, Enumeration, LatticePoint};
use crate::error::{LatticeError, Result};
use crate::lattice::{Bkz, BkzConfig, Lll, LllConfig};
use crate::lcg::{mod_inverse, CallConstraint, Lcg};
use crate::matrix::Matrix;
use crate::rational::Rational;
use crate::vector::Vector;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use rayon::iter::ParallelIterator;

/// Seed-reversal configuration
#[derive(Debug, Clone)]
pub struct ReverseConfig {
    /// Expected number of call constraints
    pub dimension: usize,
    /// Lovász parameter for the reduction
    pub delta: Rational,
    /// Reduce with BKZ of this block size instead of LLL
    pub block_size: Option<usize>,
}

impl ReverseConfig {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            delta: LllConfig::<Rational>::strong().delta,
            block_size: None,
        }
    }
}

/// The reduced lattice of states consistent with a set of observations
#[derive(Debug, Clone)]
pub struct SeedReverser {
    constraints: Vec<CallConstraint>,
    /// Maps the first observed state back to the seed
    rewind: Lcg,
    offset: Vector<Rational>,
    lattice: Matrix<Rational>,
    weights: Vec<BigInt>,
    reduced: Matrix<Rational>,
    transform: Matrix<Rational>,
}

impl SeedReverser {
    /// Build and reduce the lattice for `constraints` under `lcg`
    pub fn new(lcg: &Lcg, constraints: &[CallConstraint], config: &ReverseConfig) -> Result<Self> {
        Self::validate(lcg, constraints, config)?;
        let m = &lcg.modulus;
        let n = constraints.len();

        let mut steps = Vec::with_capacity(n);
        let mut t = 0u64;
        for c in constraints {
            t += u64::from(c.gap) + 1;
            steps.push(lcg.skip(t));
        }

        let first = &steps[0];
        let rewind = first.inverse()?;
        let inv_a0 = mod_inverse(&first.multiplier, m).ok_or_else(|| {
            LatticeError::InvalidInput(format!("multiplier is not invertible modulo {}", m))
        })?;

        let mut top = vec![BigInt::one()];
        let mut offset = vec![Rational::zero()];
        for step in &steps[1..] {
            let a = (&step.multiplier * &inv_a0).mod_floor(m);
            let d = (&step.increment - &a * &first.increment).mod_floor(m);
            top.push(a);
            offset.push(Rational::from(d));
        }

        let mut rows = vec![top];
        for i in 1..n {
            let mut row = vec![BigInt::zero(); n];
            row[i] = m.clone();
            rows.push(row);
        }
        let lattice = Matrix::from_integer_rows(&rows)?;

        let ranges: Vec<BigInt> = constraints.iter().map(CallConstraint::range).collect();
        let common = ranges.iter().fold(BigInt::one(), |acc, r| acc.lcm(r));
        let weights: Vec<BigInt> = ranges.iter().map(|r| &common / r).collect();
        let scaled = Matrix::from_integer_rows(
            &rows
                .iter()
                .map(|row| row.iter().zip(&weights).map(|(x, w)| x * w).collect())
                .collect::<Vec<Vec<BigInt>>>(),
        )?;

        log::info!(
            "Reversing {} calls under {}: common range {}, weights {:?}",
            n,
            lcg,
            common,
            weights.iter().map(|w| w.to_string()).collect::<Vec<_>>()
        );

        let transform = match config.block_size {
            Some(block_size) => {
                let bkz = BkzConfig::new(block_size, config.delta.clone()).with_transform();
                Bkz::reduce(&scaled, &bkz)?.transform
            }
            None => {
                let lll = LllConfig::new(config.delta.clone()).with_transform();
                Lll::reduce(&scaled, &lll)?.transform
            }
        }
        .unwrap_or_else(|| Matrix::identity(n));
        let reduced = transform.mul(&lattice)?;

        Ok(Self {
            constraints: constraints.to_vec(),
            rewind,
            offset: Vector::new(offset),
            lattice,
            weights,
            reduced,
            transform,
        })
    }

    fn validate(lcg: &Lcg, constraints: &[CallConstraint], config: &ReverseConfig) -> Result<()> {
        if constraints.is_empty() {
            return Err(LatticeError::InvalidInput("no call constraints given".into()));
        }
        if constraints.len() != config.dimension {
            return Err(LatticeError::InvalidInput(format!(
                "expected {} call constraints, got {}",
                config.dimension,
                constraints.len()
            )));
        }
        if lcg.modulus <= BigInt::one() {
            return Err(LatticeError::InvalidInput(format!(
                "modulus must exceed 1, got {}",
                lcg.modulus
            )));
        }
        for (i, c) in constraints.iter().enumerate() {
            if c.min > c.max {
                return Err(LatticeError::InvalidInput(format!(
                    "call {}: min {} exceeds max {}",
                    i, c.min, c.max
                )));
            }
            if c.min < 0 || BigInt::from(c.max) >= lcg.modulus {
                return Err(LatticeError::InvalidInput(format!(
                    "call {}: range [{}, {}] outside [0, {})",
                    i, c.min, c.max, lcg.modulus
                )));
            }
        }
        Ok(())
    }

    /// Unreduced lattice B (rows as above)
    pub fn lattice_basis(&self) -> &Matrix<Rational> {
        &self.lattice
    }

    /// Reduced basis `T·B` of the same lattice
    pub fn reduced_basis(&self) -> &Matrix<Rational> {
        &self.reduced
    }

    /// Unimodular T with `T·B` = reduced basis
    pub fn transform(&self) -> &Matrix<Rational> {
        &self.transform
    }

    /// Column weights applied before reduction
    pub fn weights(&self) -> &[BigInt] {
        &self.weights
    }

    /// Lazily enumerate every seed consistent with all observations
    pub fn candidates(&self) -> Result<SeedCandidates> {
        let (lo, hi): (Vec<Rational>, Vec<Rational>) = self
            .constraints
            .iter()
            .map(|c| (Rational::from(c.min), Rational::from(c.max)))
            .unzip();
        let points = Enumeration::new(&self.reduced, &self.offset, &box_constraints(&lo, &hi)?)?;

        Ok(SeedCandidates {
            points,
            rewind: self.rewind.clone(),
        })
    }
}

/// Lazy, splittable sequence of candidate seeds
#[derive(Debug)]
pub struct SeedCandidates {
    points: Enumeration,
    rewind: Lcg,
}

impl SeedCandidates {
    /// Split off a sequence covering a disjoint part of the candidates
    pub fn try_split(&mut self) -> Option<Self> {
        self.points.try_split().map(|points| Self {
            points,
            rewind: self.rewind.clone(),
        })
    }

    /// Search nodes expanded by this sequence so far
    pub fn nodes_expanded(&self) -> u64 {
        self.points.nodes_expanded()
    }

    /// Error that ended the sequence early, if any
    pub fn take_error(&mut self) -> Option<LatticeError> {
        self.points.take_error()
    }

    /// Consume the candidates in parallel on the rayon pool
    pub fn par_seeds(self) -> impl ParallelIterator<Item = i64> {
        let rewind = self.rewind;
        self.points
            .par_points()
            .filter_map(move |p| seed_of(&rewind, &p))
    }
}

impl Iterator for SeedCandidates {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        loop {
            let p = self.points.next()?;
            if let Some(seed) = seed_of(&self.rewind, &p) {
                return Some(seed);
            }
        }
    }
}

/// Seed whose first constrained call lands on `p[0]`, as the low 64 bits
fn seed_of(rewind: &Lcg, p: &LatticePoint) -> Option<i64> {
    let Some(x0) = p.point.get(0).and_then(Rational::to_integer) else {
        log::warn!("Non-integral lattice point {}", p.point);
        return None;
    };
    let seed = rewind.step(&x0) & BigInt::from(u64::MAX);
    u64::try_from(seed).ok().map(|s| s as i64)
}

/// Enumerate seeds consistent with `constraints`, reducing with LLL
pub fn reverse_seeds(constraints: &[CallConstraint], lcg: &Lcg) -> Result<SeedCandidates> {
    let config = ReverseConfig::new(constraints.len());
    SeedReverser::new(lcg, constraints, &config)?.candidates()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    /// Run `lcg` from `seed`, observing the top `bits` of the state at each
    /// call after skipping `gaps[i]` unobserved steps
    fn observe(lcg: &Lcg, seed: u64, gaps: &[u32], bits: u32) -> Vec<CallConstraint> {
        let state_bits = lcg.state_bits() as u32;
        let mut state = BigInt::from(seed);
        gaps.iter()
            .map(|&gap| {
                for _ in 0..=gap {
                    state = lcg.step(&state);
                }
                let s = u64::try_from(&state).unwrap();
                CallConstraint::top_bits(s >> (state_bits - bits), bits, state_bits, gap).unwrap()
            })
            .collect()
    }

    fn consistent(lcg: &Lcg, seed: i64, constraints: &[CallConstraint]) -> bool {
        let mut state = BigInt::from(seed);
        constraints.iter().all(|c| {
            for _ in 0..=c.gap {
                state = lcg.step(&state);
            }
            c.contains(&state)
        })
    }

    #[test]
    fn test_java_next_int_recovers_seed() {
        let lcg = Lcg::java();
        let seed = 0x2B99_2DDF_A232u64;
        let calls = observe(&lcg, seed, &[0, 0, 0], 16);

        let found: Vec<i64> = reverse_seeds(&calls, &lcg).unwrap().collect();

        assert!(found.contains(&(seed as i64)), "{:?}", found);
        assert!(found.iter().all(|&s| consistent(&lcg, s, &calls)));
    }

    #[test]
    fn test_gaps_between_calls() {
        let lcg = Lcg::java();
        let seed = 0x0000_DEAD_BEEF_1234u64 & ((1 << 48) - 1);
        let calls = observe(&lcg, seed, &[3, 0, 5, 1], 14);

        let found: Vec<i64> = reverse_seeds(&calls, &lcg).unwrap().collect();

        assert!(found.contains(&(seed as i64)));
        assert!(found.iter().all(|&s| consistent(&lcg, s, &calls)));
    }

    #[test]
    fn test_small_outputs_are_all_consistent() {
        // Three nextInt(16) calls leave ~2^36 seeds; check a prefix
        let lcg = Lcg::java();
        let calls = observe(&lcg, 42, &[0, 0, 0], 4);

        let prefix: Vec<i64> = reverse_seeds(&calls, &lcg).unwrap().take(32).collect();

        assert_eq!(prefix.len(), 32);
        assert!(prefix.iter().all(|&s| consistent(&lcg, s, &calls)));
        assert_eq!(prefix.iter().collect::<BTreeSet<_>>().len(), 32);
    }

    #[test]
    fn test_four_bit_outputs_keep_true_state() {
        // Too many candidates to list; place the true states directly
        let lcg = Lcg::java();
        let seed = 42u64;
        let calls = observe(&lcg, seed, &[0, 0, 0], 4);
        let reverser = SeedReverser::new(&lcg, &calls, &ReverseConfig::new(3)).unwrap();

        let mut state = BigInt::from(seed);
        let states: Vec<Rational> = (0..3)
            .map(|_| {
                state = lcg.step(&state);
                Rational::from(state.clone())
            })
            .collect();
        let x = Vector::new(states);
        assert!(calls
            .iter()
            .zip(x.iter())
            .all(|(c, xi)| c.contains(&xi.to_integer().unwrap())));

        let diff = x.sub(&reverser.offset).unwrap();
        let inverse = reverser.reduced_basis().inverse().unwrap();
        let coefficients = inverse.combine_rows(diff.as_slice()).unwrap();
        assert!(coefficients.iter().all(Rational::is_integer));

        let point = LatticePoint {
            coefficients: coefficients.iter().map(|c| c.to_integer().unwrap()).collect(),
            point: x,
        };
        assert_eq!(seed_of(&reverser.rewind, &point), Some(seed as i64));
    }

    #[test]
    fn test_matches_exhaustive_search() {
        let lcg = Lcg::new(1_103_515_245u64, 12_345, 1u64 << 12).unwrap();
        let calls = vec![
            CallConstraint::new(0, 1023, 0),
            CallConstraint::new(512, 2047, 1),
            CallConstraint::new(100, 3000, 0),
        ];

        let expected: BTreeSet<i64> = (0..1i64 << 12)
            .filter(|&s| consistent(&lcg, s, &calls))
            .collect();

        let reverser = SeedReverser::new(&lcg, &calls, &ReverseConfig::new(3)).unwrap();
        let serial: BTreeSet<i64> = reverser.candidates().unwrap().collect();
        let parallel: BTreeSet<i64> = reverser.candidates().unwrap().par_seeds().collect();

        assert_eq!(serial, expected);
        assert_eq!(parallel, expected);
    }

    #[test]
    fn test_block_reduction_gives_same_seeds() {
        let lcg = Lcg::new(69_069, 1, 1u64 << 16).unwrap();
        let seed = 31_337u64;
        let calls = observe(&lcg, seed, &[0, 2, 0, 1], 6);

        let mut config = ReverseConfig::new(4);
        let lll: BTreeSet<i64> = SeedReverser::new(&lcg, &calls, &config)
            .unwrap()
            .candidates()
            .unwrap()
            .collect();
        config.block_size = Some(3);
        let bkz: BTreeSet<i64> = SeedReverser::new(&lcg, &calls, &config)
            .unwrap()
            .candidates()
            .unwrap()
            .collect();

        assert!(lll.contains(&(seed as i64)));
        assert_eq!(lll, bkz);
    }

    #[test]
    fn test_reduced_basis_spans_same_lattice() {
        let lcg = Lcg::java();
        let calls = observe(&lcg, 7, &[0, 1, 0], 16);
        let reverser = SeedReverser::new(&lcg, &calls, &ReverseConfig::new(3)).unwrap();

        let t = reverser.transform();
        assert_eq!(t.determinant().unwrap().abs(), Rational::one());
        assert_eq!(&t.mul(reverser.lattice_basis()).unwrap(), reverser.reduced_basis());
        assert!(reverser.weights().iter().all(|w| w.is_one()));
    }

    #[test]
    fn test_split_candidates_cover_everything() {
        let lcg = Lcg::new(1_103_515_245u64, 12_345, 1u64 << 12).unwrap();
        let calls = vec![
            CallConstraint::new(0, 2047, 0),
            CallConstraint::new(1024, 4095, 0),
        ];
        let whole: BTreeSet<i64> = reverse_seeds(&calls, &lcg).unwrap().collect();

        let mut first = reverse_seeds(&calls, &lcg).unwrap();
        let second = first.try_split().unwrap();
        let a: Vec<i64> = first.collect();
        let b: Vec<i64> = second.collect();

        assert_eq!(a.len() + b.len(), whole.len());
        assert_eq!(a.into_iter().chain(b).collect::<BTreeSet<_>>(), whole);
    }

    #[test]
    fn test_invalid_input() {
        let lcg = Lcg::java();
        let ok = CallConstraint::new(0, 10, 0);

        let cases = vec![
            (vec![], 0),
            (vec![ok, ok], 3),
            (vec![CallConstraint::new(5, 4, 0)], 1),
            (vec![CallConstraint::new(-1, 4, 0)], 1),
            (vec![CallConstraint::new(0, 1 << 48, 0)], 1),
        ];
        for (calls, dimension) in cases {
            let err = SeedReverser::new(&lcg, &calls, &ReverseConfig::new(dimension)).unwrap_err();
            assert!(matches!(err, LatticeError::InvalidInput(_)), "{:?}", calls);
        }

        let even = Lcg::new(4, 1, 1u64 << 16).unwrap();
        assert!(matches!(
            reverse_seeds(&[ok], &even),
            Err(LatticeError::InvalidInput(_))
        ));
    }
}
