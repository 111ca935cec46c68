//! Exact rational number type
//!
//! A rational number built on BigInt numerator and denominator, always kept
//! in lowest terms with a positive denominator. Lattice reduction compares
//! squared norms exactly, so nothing in this type ever rounds.

use crate::error::{LatticeError, Result};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

/// Exact rational number (numerator / denominator)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rational {
    numerator: BigInt,
    denominator: BigInt,
}

impl Rational {
    /// Create a new rational number from numerator and denominator
    ///
    /// Fails with `DivisionByZero` when `den` is zero.
    pub fn new(num: BigInt, den: BigInt) -> Result<Self> {
        if den.is_zero() {
            return Err(LatticeError::DivisionByZero);
        }
        Ok(Self::normalized(num, den))
    }

    /// Create a rational from a machine-integer fraction
    pub fn from_ratio(num: i64, den: i64) -> Result<Self> {
        Self::new(BigInt::from(num), BigInt::from(den))
    }

    /// Create a rational from an integer
    pub fn from_int<T: Into<BigInt>>(n: T) -> Self {
        Self {
            numerator: n.into(),
            denominator: BigInt::one(),
        }
    }

    /// Create a rational from a BigInt (alias for from_int)
    pub fn from_bigint(n: BigInt) -> Self {
        Self::from_int(n)
    }

    /// Create zero
    pub fn zero() -> Self {
        Self::from_int(BigInt::zero())
    }

    /// Create one
    pub fn one() -> Self {
        Self::from_int(BigInt::one())
    }

    pub fn numer(&self) -> &BigInt {
        &self.numerator
    }

    pub fn denom(&self) -> &BigInt {
        &self.denominator
    }

    /// Check if this rational is zero
    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.numerator.is_negative()
    }

    pub fn is_positive(&self) -> bool {
        self.numerator.is_positive()
    }

    /// True when the denominator is one
    pub fn is_integer(&self) -> bool {
        self.denominator.is_one()
    }

    /// The exact integer value, if this rational is an integer
    pub fn to_integer(&self) -> Option<BigInt> {
        self.is_integer().then(|| self.numerator.clone())
    }

    pub fn abs(&self) -> Self {
        Self {
            numerator: self.numerator.abs(),
            denominator: self.denominator.clone(),
        }
    }

    /// Multiplicative inverse
    pub fn recip(&self) -> Result<Self> {
        Self::new(self.denominator.clone(), self.numerator.clone())
    }

    /// Exact division, failing with `DivisionByZero` when `other` is zero
    pub fn checked_div(&self, other: &Self) -> Result<Self> {
        if other.is_zero() {
            return Err(LatticeError::DivisionByZero);
        }
        Ok(Self::normalized(
            &self.numerator * &other.denominator,
            &self.denominator * &other.numerator,
        ))
    }

    /// Largest integer ≤ self
    pub fn floor(&self) -> BigInt {
        self.numerator.div_floor(&self.denominator)
    }

    /// Smallest integer ≥ self
    pub fn ceil(&self) -> BigInt {
        self.numerator.div_ceil(&self.denominator)
    }

    /// Nearest integer, ties rounded towards +∞: floor(self + 1/2)
    pub fn round_half_up(&self) -> BigInt {
        let two_num: BigInt = &self.numerator * 2;
        let two_den: BigInt = &self.denominator * 2;
        (two_num + &self.denominator).div_floor(&two_den)
    }

    /// Lossy conversion, for reporting only
    pub fn to_f64(&self) -> f64 {
        match (self.numerator.to_f64(), self.denominator.to_f64()) {
            (Some(n), Some(d)) if n.is_finite() && d.is_finite() => n / d,
            _ => {
                // Scale both down so the quotient survives the conversion
                let shift = self
                    .numerator
                    .bits()
                    .max(self.denominator.bits())
                    .saturating_sub(1000);
                let n = (&self.numerator >> shift).to_f64().unwrap_or(0.0);
                let d = (&self.denominator >> shift).to_f64().unwrap_or(1.0);
                n / d
            }
        }
    }

    /// Reduce to lowest terms with a positive denominator
    fn normalized(num: BigInt, den: BigInt) -> Self {
        if num.is_zero() {
            return Self::zero();
        }

        let g = num.gcd(&den);
        let (mut numerator, mut denominator) = (num / &g, den / &g);

        if denominator.is_negative() {
            numerator = -numerator;
            denominator = -denominator;
        }

        Self {
            numerator,
            denominator,
        }
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator.is_one() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl FromStr for Rational {
    type Err = LatticeError;

    /// Accepts `p`, `p/q` and decimal `a.b` forms
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let bad = || LatticeError::InvalidInput(format!("not a rational number: {:?}", s));
        let parse_int = |t: &str| BigInt::from_str(t.trim()).map_err(|_| bad());

        if let Some((num, den)) = s.split_once('/') {
            return Self::new(parse_int(num)?, parse_int(den)?);
        }

        if let Some((whole, frac)) = s.split_once('.') {
            if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad());
            }
            let negative = whole.trim_start().starts_with('-');
            let whole = if whole.trim().is_empty() || whole.trim() == "-" {
                BigInt::zero()
            } else {
                parse_int(whole)?
            };
            let scale = num_traits::pow(BigInt::from(10), frac.len());
            let frac = parse_int(frac)?;
            let magnitude = whole.abs() * &scale + frac;
            let num = if negative { -magnitude } else { magnitude };
            return Self::new(num, scale);
        }

        Ok(Self::from_int(parse_int(s)?))
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross-multiplication preserves order
        (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_int(n)
    }
}

impl From<BigInt> for Rational {
    fn from(n: BigInt) -> Self {
        Self::from_int(n)
    }
}

impl Add for &Rational {
    type Output = Rational;

    fn add(self, other: Self) -> Rational {
        if self.denominator == other.denominator {
            return Rational::normalized(
                &self.numerator + &other.numerator,
                self.denominator.clone(),
            );
        }
        let num = &self.numerator * &other.denominator + &other.numerator * &self.denominator;
        let den = &self.denominator * &other.denominator;
        Rational::normalized(num, den)
    }
}

impl Add for Rational {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        &self + &other
    }
}

impl Sub for &Rational {
    type Output = Rational;

    fn sub(self, other: Self) -> Rational {
        if self.denominator == other.denominator {
            return Rational::normalized(
                &self.numerator - &other.numerator,
                self.denominator.clone(),
            );
        }
        let num = &self.numerator * &other.denominator - &other.numerator * &self.denominator;
        let den = &self.denominator * &other.denominator;
        Rational::normalized(num, den)
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        &self - &other
    }
}

impl Mul for &Rational {
    type Output = Rational;

    fn mul(self, other: Self) -> Rational {
        let num = &self.numerator * &other.numerator;
        let den = &self.denominator * &other.denominator;
        Rational::normalized(num, den)
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        &self * &other
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            numerator: -self.numerator,
            denominator: self.denominator,
        }
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            numerator: -&self.numerator,
            denominator: self.denominator.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> Rational {
        Rational::from_ratio(n, d).unwrap()
    }

    #[test]
    fn test_rational_arithmetic() {
        let a = q(1, 2);
        let b = q(1, 3);

        assert_eq!(&a + &b, q(5, 6));
        assert_eq!(&a - &b, q(1, 6));
        assert_eq!(&a * &b, q(1, 6));
        assert_eq!(a.checked_div(&b).unwrap(), q(3, 2));
        assert_eq!(-a, q(-1, 2));
    }

    #[test]
    fn test_rational_reduction() {
        assert_eq!(q(4, 8), q(1, 2));
        assert_eq!(q(3, -6), q(-1, 2));
        assert_eq!(q(-3, -6), q(1, 2));
        assert_eq!(q(0, -5), Rational::zero());
        assert_eq!(q(3, -6).denom(), &BigInt::from(2));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(Rational::from_ratio(1, 0), Err(LatticeError::DivisionByZero));
        assert_eq!(
            q(1, 2).checked_div(&Rational::zero()),
            Err(LatticeError::DivisionByZero)
        );
        assert_eq!(Rational::zero().recip(), Err(LatticeError::DivisionByZero));
    }

    #[test]
    fn test_rounding() {
        assert_eq!(q(7, 2).floor(), BigInt::from(3));
        assert_eq!(q(7, 2).ceil(), BigInt::from(4));
        assert_eq!(q(7, 2).round_half_up(), BigInt::from(4));
        assert_eq!(q(-7, 2).floor(), BigInt::from(-4));
        assert_eq!(q(-7, 2).ceil(), BigInt::from(-3));
        // Ties go up, also for negatives
        assert_eq!(q(-7, 2).round_half_up(), BigInt::from(-3));
        assert_eq!(q(-1, 2).round_half_up(), BigInt::from(0));
        assert_eq!(q(5, 3).round_half_up(), BigInt::from(2));
        assert_eq!(q(-5, 3).round_half_up(), BigInt::from(-2));
        assert_eq!(q(6, 3).floor(), BigInt::from(2));
        assert_eq!(q(6, 3).ceil(), BigInt::from(2));
    }

    #[test]
    fn test_ordering() {
        assert!(q(1, 3) < q(1, 2));
        assert!(q(-1, 2) < q(-1, 3));
        assert!(q(2, 4) == q(1, 2));
        assert_eq!(q(-3, 4).abs(), q(3, 4));
        assert_eq!(q(7, 3).max(q(9, 4)), q(7, 3));
    }

    #[test]
    fn test_parse() {
        assert_eq!("3/4".parse::<Rational>().unwrap(), q(3, 4));
        assert_eq!("-12".parse::<Rational>().unwrap(), q(-12, 1));
        assert_eq!("0.99".parse::<Rational>().unwrap(), q(99, 100));
        assert_eq!("-1.25".parse::<Rational>().unwrap(), q(-5, 4));
        assert_eq!("-0.5".parse::<Rational>().unwrap(), q(-1, 2));
        assert!("1/0".parse::<Rational>().is_err());
        assert!("abc".parse::<Rational>().is_err());
        assert!("1.".parse::<Rational>().is_err());
    }

    #[test]
    fn test_display_and_conversion() {
        assert_eq!(q(6, 3).to_string(), "2");
        assert_eq!(q(-2, 6).to_string(), "-1/3");
        assert_eq!(q(6, 3).to_integer(), Some(BigInt::from(2)));
        assert_eq!(q(1, 3).to_integer(), None);
        assert!((q(1, 4).to_f64() - 0.25).abs() < 1e-12);
    }
}
