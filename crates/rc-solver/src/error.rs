//! Error types for solver operations.

use rc_core::RcError;
use thiserror::Error;

/// Structural problems that prevent a solve from starting.
///
/// Non-convergence is not an error here; it is reported through
/// [`crate::TerminationStatus`] so callers decide how to react.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("subsystem is not square: {equations} equations, {unknowns} unknowns")]
    NotSquare { equations: usize, unknowns: usize },

    #[error("invalid solver configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for RcError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::NotSquare { .. } => RcError::InvalidArg { what: "subsystem" },
            SolverError::InvalidConfig { .. } => RcError::InvalidArg {
                what: "solver config",
            },
            SolverError::Numeric { .. } => RcError::InvalidArg { what: "numeric" },
        }
    }
}
