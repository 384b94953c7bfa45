//! Costing attachment.

use rc_components::Unit;
use rc_core::VarId;
use rc_costing::methods::{
    cost_chemical_addition, cost_deep_well_injection, cost_pump, cost_reverse_osmosis, cost_uv_aop,
};
use rc_costing::{CostDatabase, CostLedger, CostTotals, DeepWellCostMethod, ProcessCosting, PumpCostType};
use rc_model::Model;
use rc_props::PropertyPackage;

use crate::error::{FlowsheetError, FlowsheetResult};
use crate::flowsheet::Parts;

/// Handle for costing the units of a specified flowsheet against its ledger.
///
/// Obtained from [`Flowsheet::attach_costing`](crate::Flowsheet::attach_costing).
/// Units are costed by block name; [`cost_process`](Self::cost_process)
/// finalizes the ledger.
pub struct Costing<'a> {
    parts: &'a mut Parts,
    db: &'a CostDatabase,
}

type Resolved<'p, T> = (&'p mut ProcessCosting, &'p mut Model, &'p PropertyPackage, &'p T);

fn resolve<'p, T>(
    parts: &'p mut Parts,
    block: &str,
    expected: &str,
    select: impl Fn(&'p Unit) -> Option<&'p T>,
) -> FlowsheetResult<Resolved<'p, T>> {
    let Parts {
        model,
        pkg,
        graph,
        units,
        costing,
        ..
    } = parts;
    let ledger = costing
        .as_mut()
        .ok_or_else(|| FlowsheetError::configuration("no costing block is attached"))?;
    let units: &'p Vec<Unit> = units;
    let pkg: &'p PropertyPackage = pkg;
    let unit = graph
        .find_block(block)
        .and_then(|b| select(&units[b.idx()]))
        .ok_or_else(|| FlowsheetError::configuration(format!("block '{block}' is not a {expected}")))?;
    Ok((ledger, model, pkg, unit))
}

impl<'a> Costing<'a> {
    pub(crate) fn new(parts: &'a mut Parts, db: &'a CostDatabase) -> Self {
        Self { parts, db }
    }

    pub fn database(&self) -> &CostDatabase {
        self.db
    }

    pub fn ledger(&self) -> Option<&ProcessCosting> {
        self.parts.costing.as_ref()
    }

    pub fn pump(&mut self, block: &str, cost_type: PumpCostType) -> FlowsheetResult<VarId> {
        let db = self.db;
        let (ledger, model, pkg, pump) = resolve(self.parts, block, "pump", Unit::as_pump)?;
        Ok(cost_pump(ledger, model, pkg, db, pump, cost_type)?)
    }

    pub fn reverse_osmosis(&mut self, block: &str) -> FlowsheetResult<VarId> {
        let db = self.db;
        let (ledger, model, _, ro) = resolve(self.parts, block, "reverse osmosis stage", Unit::as_ro)?;
        Ok(cost_reverse_osmosis(ledger, model, db, ro)?)
    }

    /// `chem_cost` [$/kg] and `chem_purity` override the cost database.
    pub fn chemical_addition(
        &mut self,
        block: &str,
        chem_cost: Option<f64>,
        chem_purity: Option<f64>,
    ) -> FlowsheetResult<()> {
        let db = self.db;
        let (ledger, model, _, unit) =
            resolve(self.parts, block, "chemical addition", Unit::as_chemical)?;
        cost_chemical_addition(ledger, model, db, unit, chem_cost, chem_purity)?;
        Ok(())
    }

    pub fn deep_well_injection(
        &mut self,
        block: &str,
        method: DeepWellCostMethod,
    ) -> FlowsheetResult<Option<VarId>> {
        let db = self.db;
        let (ledger, model, _, unit) =
            resolve(self.parts, block, "deep-well injection", Unit::as_deep_well)?;
        Ok(cost_deep_well_injection(ledger, model, db, unit, method)?)
    }

    pub fn uv_aop(&mut self, block: &str) -> FlowsheetResult<()> {
        let (ledger, model, _, unit) = resolve(self.parts, block, "UV reactor", Unit::as_uv)?;
        cost_uv_aop(ledger, model, unit)?;
        Ok(())
    }

    /// Finalize the ledger: aggregate flows, annual costs and totals.
    pub fn cost_process(&mut self) -> FlowsheetResult<CostTotals> {
        let Parts { model, costing, .. } = &mut *self.parts;
        let ledger = costing
            .as_mut()
            .ok_or_else(|| FlowsheetError::configuration("no costing block is attached"))?;
        let totals = ledger.finalize(model)?;
        tracing::info!(flows = totals.flows.len(), "finalized process costing");
        Ok(totals)
    }

    /// Levelized cost of water on the flow entering `product_block`.
    pub fn add_lcow(&mut self, product_block: &str) -> FlowsheetResult<VarId> {
        let Parts {
            model,
            pkg,
            graph,
            units,
            costing,
            ..
        } = &mut *self.parts;
        let ledger = costing
            .as_mut()
            .ok_or_else(|| FlowsheetError::configuration("no costing block is attached"))?;
        let inlet = graph
            .find_block(product_block)
            .and_then(|b| units[b.idx()].as_product())
            .map(|p| p.inlet().clone())
            .ok_or_else(|| {
                FlowsheetError::configuration(format!("block '{product_block}' is not a product"))
            })?;
        let flow = pkg.touch_flow_vol(model, &inlet)?;
        Ok(ledger.add_lcow(model, flow)?)
    }
}
