//! Treatment-process flowsheets.
//!
//! Each recipe assembles a fixed topology from an [`InputDocument`], runs it
//! through a [`Driver`](crate::Driver) and summarizes the solved state.
//! Top-level blocks are named [`FEED`], [`PRODUCT`] and [`DISPOSAL`]; units
//! inside a recipe carry its prefix (`ro_train.stage1.pump`).

pub mod brine_disposal;
pub mod chemical_addition;
pub mod ro_module;
pub mod ro_train;
pub mod uf_system;
pub mod uf_train;
pub mod uv_aop;

use rc_core::PackageId;
use rc_costing::{CostDatabase, LedgerParams, PumpCostType};
use rc_project::{InputDocument, ProjectError};
use rc_props::PropertyPackage;

use crate::error::FlowsheetResult;

pub const FEED: &str = "feed";
pub const PRODUCT: &str = "product";
pub const DISPOSAL: &str = "disposal";

/// Every recipe runs on one NaCl–water package.
pub fn nacl_package() -> PropertyPackage {
    PropertyPackage::nacl(PackageId(0))
}

pub(crate) fn section<'d, T>(value: Option<&'d T>, section: &'static str) -> FlowsheetResult<&'d T> {
    value.ok_or_else(|| ProjectError::MissingSection { section }.into())
}

/// Database prices overlaid with the document's `costing` section.
#[derive(Debug, Clone)]
pub struct CostInputs {
    pub db: CostDatabase,
    pub params: LedgerParams,
    pub pump_cost_type: PumpCostType,
}

impl CostInputs {
    pub fn from_document(doc: &InputDocument) -> FlowsheetResult<Self> {
        let db = CostDatabase::embedded()?;
        let mut params = LedgerParams::from_database(&db);
        let mut pump_cost_type = PumpCostType::HighPressure;
        if let Some(costing) = &doc.costing {
            costing.apply(&mut params);
            pump_cost_type = costing.pump_cost_type;
        }
        Ok(Self {
            db,
            params,
            pump_cost_type,
        })
    }
}
