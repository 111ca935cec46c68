//! Linear congruential generators and per-call observation constraints
//!
//! An LCG advances `s' = (s·a + c) mod m`. Jumping n steps ahead is again an
//! affine map `s ↦ A_n·s + C_n`, computed by square-and-multiply over the
//! composition of affine maps.

use crate::error::{LatticeError, Result};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use std::fmt;

/// Affine state update `s' = (s·multiplier + increment) mod modulus`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg {
    pub multiplier: BigInt,
    pub increment: BigInt,
    pub modulus: BigInt,
}

impl Lcg {
    /// Create a generator; multiplier and increment are reduced mod `modulus`
    pub fn new(
        multiplier: impl Into<BigInt>,
        increment: impl Into<BigInt>,
        modulus: impl Into<BigInt>,
    ) -> Result<Self> {
        let modulus = modulus.into();
        if modulus <= BigInt::one() {
            return Err(LatticeError::InvalidInput(format!(
                "modulus must exceed 1, got {}",
                modulus
            )));
        }
        Ok(Self {
            multiplier: multiplier.into().mod_floor(&modulus),
            increment: increment.into().mod_floor(&modulus),
            modulus,
        })
    }

    /// `java.util.Random`: a = 0x5DEECE66D, c = 0xB, m = 2^48
    pub fn java() -> Self {
        Self {
            multiplier: BigInt::from(0x5DEECE66Du64),
            increment: BigInt::from(0xBu64),
            modulus: BigInt::one() << 48,
        }
    }

    /// Number of bits needed to hold any state
    pub fn state_bits(&self) -> u64 {
        (&self.modulus - 1u32).bits()
    }

    pub fn step(&self, state: &BigInt) -> BigInt {
        (state * &self.multiplier + &self.increment).mod_floor(&self.modulus)
    }

    /// The generator that advances `n` steps at once
    pub fn skip(&self, mut n: u64) -> Self {
        let mut acc = (BigInt::one(), BigInt::zero());
        let mut base = (self.multiplier.clone(), self.increment.clone());

        while n > 0 {
            if n & 1 == 1 {
                acc = self.compose(&base, &acc);
            }
            base = self.compose(&base, &base);
            n >>= 1;
        }

        Self {
            multiplier: acc.0,
            increment: acc.1,
            modulus: self.modulus.clone(),
        }
    }

    /// The generator that steps backwards
    ///
    /// Fails with `InvalidInput` when the multiplier is not a unit mod m.
    pub fn inverse(&self) -> Result<Self> {
        let inv = mod_inverse(&self.multiplier, &self.modulus).ok_or_else(|| {
            LatticeError::InvalidInput(format!(
                "multiplier {} is not invertible modulo {}",
                self.multiplier, self.modulus
            ))
        })?;
        let increment = (-(&self.increment * &inv)).mod_floor(&self.modulus);
        Ok(Self {
            multiplier: inv,
            increment,
            modulus: self.modulus.clone(),
        })
    }

    /// `g ∘ f` for affine maps given as (a, c) pairs
    fn compose(&self, g: &(BigInt, BigInt), f: &(BigInt, BigInt)) -> (BigInt, BigInt) {
        (
            (&g.0 * &f.0).mod_floor(&self.modulus),
            (&g.0 * &f.1 + &g.1).mod_floor(&self.modulus),
        )
    }
}

impl fmt::Display for Lcg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "s' = (s * {} + {}) mod {}",
            self.multiplier, self.increment, self.modulus
        )
    }
}

/// Inverse of `a` modulo `m`, when gcd(a, m) = 1
pub fn mod_inverse(a: &BigInt, m: &BigInt) -> Option<BigInt> {
    let e = a.mod_floor(m).extended_gcd(m);
    e.gcd.is_one().then(|| e.x.mod_floor(m))
}

/// Inclusive range observed for the LCG state at one call
///
/// `gap` counts the unobserved steps since the previous constrained call;
/// every call itself advances the generator once more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallConstraint {
    pub min: i64,
    pub max: i64,
    pub gap: u32,
}

impl CallConstraint {
    pub fn new(min: i64, max: i64, gap: u32) -> Self {
        Self { min, max, gap }
    }

    /// A call that reveals the top `bits` of a `state_bits`-bit state, like
    /// Java's `nextInt(2^bits)`
    pub fn top_bits(observed: u64, bits: u32, state_bits: u32, gap: u32) -> Result<Self> {
        if bits == 0 || bits > state_bits || state_bits > 63 {
            return Err(LatticeError::InvalidInput(format!(
                "cannot observe {} of {} state bits",
                bits, state_bits
            )));
        }
        if observed >> bits != 0 {
            return Err(LatticeError::InvalidInput(format!(
                "observed value {} does not fit in {} bits",
                observed, bits
            )));
        }
        let shift = state_bits - bits;
        let min = (observed << shift) as i64;
        Ok(Self {
            min,
            max: min + ((1i64 << shift) - 1),
            gap,
        })
    }

    /// Number of states allowed, `max - min + 1`
    pub fn range(&self) -> BigInt {
        BigInt::from(self.max) - BigInt::from(self.min) + 1
    }

    pub fn contains(&self, state: &BigInt) -> bool {
        !state.is_negative() && *state >= BigInt::from(self.min) && *state <= BigInt::from(self.max)
    }
}

impl fmt::Display for CallConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}] after gap {}", self.min, self.max, self.gap)
    }
}
