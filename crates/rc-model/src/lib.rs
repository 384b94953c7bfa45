//! Equation-oriented process model.
//!
//! A [`Model`] is an arena of named [`Variable`]s and [`Equation`]s. Each
//! equation is a residual closure over an ordered list of variables; a
//! variable is either fixed (known input) or free (unknown). Unit models,
//! property packages and flowsheets all add to the same model, and solvers
//! operate on [`Subsystem`]s carved out of it.

pub mod error;
pub mod expr;
pub mod model;
pub mod scaling;
pub mod subsystem;

pub use error::{ModelError, ModelResult};
pub use expr::LinearExpr;
pub use model::{Equation, Model, Residual, Variable};
pub use scaling::ScalingDefaults;
pub use subsystem::Subsystem;
