//! Fixed-length vectors over a [`Scalar`]

use crate::error::{expect_dim, LatticeError, Result};
use crate::scalar::Scalar;
use std::fmt;
use std::ops::Index;

/// Ordered sequence of scalars whose length never changes
#[derive(Debug, Clone, PartialEq)]
pub struct Vector<T> {
    entries: Vec<T>,
}

impl<T: Scalar> Vector<T> {
    pub fn new(entries: Vec<T>) -> Self {
        Self { entries }
    }

    pub fn zeros(n: usize) -> Self {
        Self {
            entries: vec![T::zero(); n],
        }
    }

    /// Unit vector e_i of length n
    pub fn unit(n: usize, i: usize) -> Self {
        let mut v = Self::zeros(n);
        v.entries[i] = T::one();
        v
    }

    pub fn from_i64(values: &[i64]) -> Self {
        Self::new(values.iter().map(|&x| T::from_i64(x)).collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&T> {
        self.entries.get(i)
    }

    /// Replace entry i; fails when i is out of range
    pub fn set(&mut self, i: usize, value: T) -> Result<()> {
        let len = self.len();
        match self.entries.get_mut(i) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(LatticeError::DimensionMismatch {
                expected: len,
                actual: i + 1,
            }),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    pub fn into_inner(self) -> Vec<T> {
        self.entries
    }

    /// True when every entry is zero
    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|x| x.is_zero())
    }

    /// Inner product ⟨self, other⟩
    pub fn dot(&self, other: &Self) -> Result<T> {
        expect_dim(self.len(), other.len())?;
        Ok(self
            .entries
            .iter()
            .zip(other.entries.iter())
            .fold(T::zero(), |acc, (a, b)| acc + a.clone() * b.clone()))
    }

    /// ‖self‖²
    pub fn norm_squared(&self) -> T {
        self.entries
            .iter()
            .fold(T::zero(), |acc, x| acc + x.clone() * x.clone())
    }

    pub fn scale(&self, factor: &T) -> Self {
        Self::new(
            self.entries
                .iter()
                .map(|x| x.clone() * factor.clone())
                .collect(),
        )
    }

    pub fn add(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Projection coefficient ⟨self, other⟩ / ‖other‖²
    ///
    /// Fails with `DivisionByZero` when `other` is the zero vector.
    pub fn gram_schmidt_coefficient(&self, other: &Self) -> Result<T> {
        let num = self.dot(other)?;
        num.checked_div(&other.norm_squared())
    }

    /// Convert every entry to another scalar type
    pub fn map<U: Scalar>(&self, f: impl Fn(&T) -> U) -> Vector<U> {
        Vector::new(self.entries.iter().map(f).collect())
    }

    fn zip_with(&self, other: &Self, f: impl Fn(T, T) -> T) -> Result<Self> {
        expect_dim(self.len(), other.len())?;
        Ok(Self::new(
            self.entries
                .iter()
                .zip(other.entries.iter())
                .map(|(a, b)| f(a.clone(), b.clone()))
                .collect(),
        ))
    }
}

impl<T> Index<usize> for Vector<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.entries[i]
    }
}

impl<T: Scalar> From<Vec<T>> for Vector<T> {
    fn from(entries: Vec<T>) -> Self {
        Self::new(entries)
    }
}

impl<T: Scalar> fmt::Display for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (j, x) in self.entries.iter().enumerate() {
            if j > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", x)?;
        }
        write!(f, "]")
    }
}
