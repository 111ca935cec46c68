//! Error types for lattice reduction, enumeration and seed reversal

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LatticeError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Matrix is singular")]
    Singular,

    #[error("Linear program is infeasible")]
    Infeasible,

    #[error("Linear program is unbounded")]
    Unbounded,

    #[error("Constraint region contains no feasible point")]
    InfeasibleRegion,

    #[error("Constraint region is unbounded along coefficient {0}")]
    UnboundedRegion(usize),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, LatticeError>;

/// Fail with `DimensionMismatch` unless `actual == expected`
pub(crate) fn expect_dim(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(LatticeError::DimensionMismatch { expected, actual })
    }
}
