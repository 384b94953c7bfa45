//! rc-costing: water-treatment costing for equation-oriented flowsheets.
//!
//! - [`CostLedger`]: the registration/finalization capability units cost against
//! - [`ProcessCosting`]: the in-model ledger (aggregate flows, annual costs,
//!   total capital and operating cost, LCOW)
//! - [`CostDatabase`]: default unit costs, embedded as YAML
//! - [`methods`]: per-unit costing methods

pub mod database;
pub mod error;
pub mod ledger;
pub mod methods;

pub use database::{ChemicalCost, CostDatabase};
pub use error::{CostingError, CostingResult};
pub use ledger::{CostLedger, CostTotals, FlowKind, FlowTotals, LedgerParams, ProcessCosting};
pub use methods::{DeepWellCostMethod, PumpCostType};
