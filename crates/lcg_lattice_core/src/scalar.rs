//! Scalar capability shared by the vector, matrix and reduction kernels
//!
//! The kernels are written once against [`Scalar`] and instantiated for the
//! exact [`Rational`] type (used by every correctness-critical path) and for
//! `f64` (quick approximate exploration).

use crate::error::{LatticeError, Result};
use crate::rational::Rational;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

pub trait Scalar:
    Clone
    + fmt::Debug
    + fmt::Display
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    fn zero() -> Self;
    fn one() -> Self;
    fn from_i64(n: i64) -> Self;
    fn from_bigint(n: &BigInt) -> Self;

    /// `num / den`; fails when `den` is zero
    fn from_ratio(num: i64, den: i64) -> Result<Self>;

    fn is_zero(&self) -> bool;
    fn abs(&self) -> Self;
    fn checked_div(&self, other: &Self) -> Result<Self>;
    fn floor(&self) -> BigInt;
    fn ceil(&self) -> BigInt;
    /// floor(self + 1/2)
    fn round_half_up(&self) -> BigInt;
    fn to_f64(&self) -> f64;
}

impl Scalar for Rational {
    fn zero() -> Self {
        Rational::zero()
    }

    fn one() -> Self {
        Rational::one()
    }

    fn from_i64(n: i64) -> Self {
        Rational::from_int(n)
    }

    fn from_bigint(n: &BigInt) -> Self {
        Rational::from_bigint(n.clone())
    }

    fn from_ratio(num: i64, den: i64) -> Result<Self> {
        Rational::from_ratio(num, den)
    }

    fn is_zero(&self) -> bool {
        Rational::is_zero(self)
    }

    fn abs(&self) -> Self {
        Rational::abs(self)
    }

    fn checked_div(&self, other: &Self) -> Result<Self> {
        Rational::checked_div(self, other)
    }

    fn floor(&self) -> BigInt {
        Rational::floor(self)
    }

    fn ceil(&self) -> BigInt {
        Rational::ceil(self)
    }

    fn round_half_up(&self) -> BigInt {
        Rational::round_half_up(self)
    }

    fn to_f64(&self) -> f64 {
        Rational::to_f64(self)
    }
}

impl Scalar for f64 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn from_i64(n: i64) -> Self {
        n as f64
    }

    fn from_bigint(n: &BigInt) -> Self {
        n.to_f64().unwrap_or(f64::NAN)
    }

    fn from_ratio(num: i64, den: i64) -> Result<Self> {
        if den == 0 {
            return Err(LatticeError::DivisionByZero);
        }
        Ok(num as f64 / den as f64)
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn abs(&self) -> Self {
        f64::abs(*self)
    }

    fn checked_div(&self, other: &Self) -> Result<Self> {
        if *other == 0.0 {
            return Err(LatticeError::DivisionByZero);
        }
        Ok(self / other)
    }

    fn floor(&self) -> BigInt {
        BigInt::from_f64(f64::floor(*self)).unwrap_or_default()
    }

    fn ceil(&self) -> BigInt {
        BigInt::from_f64(f64::ceil(*self)).unwrap_or_default()
    }

    fn round_half_up(&self) -> BigInt {
        BigInt::from_f64(f64::floor(*self + 0.5)).unwrap_or_default()
    }

    fn to_f64(&self) -> f64 {
        *self
    }
}
