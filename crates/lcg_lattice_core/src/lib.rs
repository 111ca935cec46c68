//! LCG Lattice Core Library
//!
//! Exact-rational lattice machinery for recovering linear congruential
//! generator seeds from partial observations of their outputs.
//!
//! # Overview
//!
//! Every seed consistent with a sequence of observed state ranges is a point
//! of a shifted integer lattice. The library reduces that lattice (LLL or
//! BKZ) and enumerates its points inside the observation box with an
//! LP-bounded branch-and-bound search, mapping each point back to a seed.
//! All arithmetic on the reduction path is exact.
//!
//! # Key Components
//!
//! - [`rational`] - Arbitrary-precision rationals in lowest terms
//! - [`scalar`] - Scalar capability shared by exact and floating types
//! - [`vector`], [`matrix`] - Dense linear algebra, LU, inverse
//! - [`lattice`] - Gram-Schmidt, LLL, BKZ
//! - [`optimize`] - Exact two-phase simplex
//! - [`enumerate`] - Splittable lattice-point enumeration
//! - [`lcg`] - Generators and observation constraints
//! - [`reverse`] - The seed-reversal pipeline
//!
//! # Example
//!
//! ```
//! use lcg_lattice_core::{reverse_seeds, CallConstraint, Lcg};
//!
//! let lcg = Lcg::java();
//! let calls = [
//!     CallConstraint::top_bits(0x9a3f, 16, 48, 0).unwrap(),
//!     CallConstraint::top_bits(0x1c07, 16, 48, 0).unwrap(),
//!     CallConstraint::top_bits(0xe255, 16, 48, 0).unwrap(),
//! ];
//!
//! for seed in reverse_seeds(&calls, &lcg).unwrap().take(4) {
//!     println!("{:#x}", seed);
//! }
//! ```

pub mod enumerate;
pub mod error;
pub mod lattice;
pub mod lcg;
pub mod matrix;
pub mod optimize;
pub mod rational;
pub mod reverse;
pub mod scalar;
pub mod vector;

pub use enumerate::{box_constraints, enumerate, Enumeration, LatticePoint, ParEnumeration};
pub use error::{LatticeError, Result};
pub use lattice::{
    reduce, reduce_block, Bkz, BkzConfig, BkzStats, BlockReduction, GramSchmidt, Lll, LllConfig,
    LllStats, Reduction,
};
pub use lcg::{CallConstraint, Lcg};
pub use matrix::{LuDecomposition, Matrix};
pub use optimize::{Constraint, LinearProgram, Relation, Solution};
pub use rational::Rational;
pub use reverse::{reverse_seeds, ReverseConfig, SeedCandidates, SeedReverser};
pub use scalar::Scalar;
pub use vector::Vector;
