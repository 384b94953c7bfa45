//! Nonlinear equation solving for equation-oriented models.
//!
//! The [`Solver`] trait is the capability the flowsheet layer calls through;
//! [`NewtonSolver`] is the in-process implementation: damped Newton in
//! scaled variables with a finite-difference Jacobian and bound projection.

pub mod config;
pub mod error;
pub mod jacobian;
pub mod newton;
pub mod solver;
pub mod status;

pub use config::SolverConfig;
pub use error::{SolverError, SolverResult};
pub use newton::{NewtonResult, newton_solve};
pub use solver::{NewtonSolver, Solver};
pub use status::{SolveReport, TerminationStatus};
