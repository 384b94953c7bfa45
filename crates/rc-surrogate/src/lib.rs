//! Response-surface models fitted to plant data.
//!
//! [`Surrogate`] is the evaluation capability unit models call through;
//! [`RbfSurrogate`] is a radial-basis-function fit that persists to JSON
//! with its training data and input bounds intact.

pub mod error;
pub mod io;
pub mod metrics;
pub mod rbf;
pub mod split;
pub mod traits;

pub use error::{SurrogateError, SurrogateResult};
pub use io::{load_json, save_json};
pub use metrics::{FitMetrics, fit_metrics};
pub use rbf::{BasisFunction, RbfOptions, RbfSurrogate};
pub use split::split_training_validation;
pub use traits::Surrogate;
