//! rc-core: shared foundation for the reclamation workspace.
//!
//! Contains:
//! - units (uom SI types + plant-unit constructors and readers)
//! - numeric (residual norm helper)
//! - ids (compact IDs for model variables, equations, blocks and ports)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{RcError, RcResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
