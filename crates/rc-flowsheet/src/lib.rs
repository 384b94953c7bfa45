//! Staged water-reclamation flowsheets.
//!
//! Provides:
//! - [`FlowsheetBuilder`]: assembles units and arcs into one shared model
//! - [`Flowsheet`]: typestate `Assembled → Scaled → Specified → Initialized → Solved`
//! - sequential block-by-block initialization
//! - [`Costing`]: unit costing against the flowsheet's ledger
//! - [`Driver`]: runs a flowsheet through every stage with an explicit solver
//! - [`recipes`]: RO train, UF train and system, UV, chemical addition,
//!   brine disposal, single RO module

pub mod builder;
pub mod conditions;
pub mod costing;
pub mod driver;
pub mod error;
pub mod flowsheet;
pub mod recipes;
pub mod report;

// Internal modules
mod initialize;

// Re-exports for public API
pub use builder::FlowsheetBuilder;
pub use conditions::FeedConditions;
pub use costing::Costing;
pub use driver::Driver;
pub use error::{FlowsheetError, FlowsheetResult};
pub use flowsheet::{Assembled, Flowsheet, Initialized, Scaled, Solved, Specified, Stage};
pub use report::{CostingSummary, Report};
