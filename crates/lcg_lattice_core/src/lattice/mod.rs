//! Lattice basis reduction algorithms
//!
//! Exact-rational LLL and BKZ over bases stored as matrix rows.
//!
//! # Key Components
//!
//! - [`GramSchmidt`] - Gram-Schmidt orthogonalization
//! - [`Lll`] - LLL lattice reduction algorithm
//! - [`Bkz`] - BKZ block reduction on top of LLL
//! - [`basis`] - constructors for common test lattices
//!
//! # Example
//!
//! ```
//! use lcg_lattice_core::lattice::{self, basis};
//! use lcg_lattice_core::Rational;
//!
//! let b = basis::from_rows(&[
//!     vec![1, 103, 107],
//!     vec![0, 200, 0],
//!     vec![0, 0, 200],
//! ]);
//!
//! let reduced = lattice::reduce(&b, Rational::from_ratio(99, 100).unwrap()).unwrap();
//! assert_eq!(reduced.basis.rows(), 3);
//! ```

pub mod basis;
pub mod bkz;
pub mod gram_schmidt;
pub mod lll;

pub use bkz::{Bkz, BkzConfig, BkzStats, BlockReduction};
pub use gram_schmidt::GramSchmidt;
pub use lll::{Lll, LllConfig, LllStats, Reduction};

use crate::error::Result;
use crate::matrix::Matrix;
use crate::rational::Rational;

/// LLL-reduce `basis` with Lovász parameter `delta`, tracking the transform
pub fn reduce(basis: &Matrix<Rational>, delta: Rational) -> Result<Reduction<Rational>> {
    Lll::reduce(basis, &LllConfig::new(delta).with_transform())
}

/// BKZ-reduce `basis` with window `block_size`, tracking the transform
pub fn reduce_block(
    basis: &Matrix<Rational>,
    block_size: usize,
    delta: Rational,
) -> Result<BlockReduction> {
    Bkz::reduce(basis, &BkzConfig::new(block_size, delta).with_transform())
}
