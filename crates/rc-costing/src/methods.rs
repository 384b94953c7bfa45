//! Unit costing methods.
//!
//! Each method adds the unit's capital cost (if any) to the model, registers
//! its consumption flows with the ledger and returns the capital variable.

use rc_core::VarId;
use rc_components::{ChemicalAddition, DeepWellInjection, Pump, ReverseOsmosis0D, UvAop, UnitOp};
use rc_model::{LinearExpr, Model};
use rc_props::PropertyPackage;
use serde::{Deserialize, Serialize};

use crate::database::CostDatabase;
use crate::error::{CostingError, CostingResult};
use crate::ledger::{COST_SCALE, CostLedger, FlowKind};

pub const ELECTRICITY: &str = "electricity";
pub const DEEP_WELL_INJECTION: &str = "deep_well_injection";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PumpCostType {
    /// Priced on inlet volumetric flow
    LowPressure,
    /// Priced on mechanical work
    HighPressure,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cost_method", rename_all = "snake_case")]
pub enum DeepWellCostMethod {
    /// All-in $/m³ charged on the injected volume; `None` takes the database value.
    AsOpex { dwi_lcow: Option<f64> },
    /// Capital per m³/day of capacity plus an operating $/m³.
    AsCapex,
}

fn capital_var(model: &mut Model, unit: &str) -> CostingResult<VarId> {
    let id = model.add_var(format!("{unit}.costing.capital_cost"), 0.0, "$")?;
    model.set_scale(id, COST_SCALE)?;
    Ok(id)
}

pub fn cost_pump<L: CostLedger>(
    ledger: &mut L,
    model: &mut Model,
    pkg: &PropertyPackage,
    db: &CostDatabase,
    pump: &Pump,
    cost_type: PumpCostType,
) -> CostingResult<VarId> {
    let capital = capital_var(model, pump.name())?;
    let e = match cost_type {
        PumpCostType::LowPressure => {
            let params = *pkg.params();
            let per_lps = db.pump.low_pressure;
            let inlet = pump.inlet();
            model.add_eq(
                format!("{}.costing.eq_capital_cost", pump.name()),
                vec![capital, inlet.flow_mass_h2o, inlet.flow_mass_nacl],
                move |v| v[0] - per_lps * 1e3 * params.flow_vol(v[1], v[2]),
            )
        }
        PumpCostType::HighPressure => {
            let per_w = db.pump.high_pressure;
            model.add_eq(
                format!("{}.costing.eq_capital_cost", pump.name()),
                vec![capital, pump.work_mechanical],
                move |v| v[0] - per_w * v[1],
            )
        }
    };
    model.set_eq_scale_var(e, capital);
    ledger.track_equation(e);
    ledger.add_capital(capital)?;
    let price = ledger.electricity_cost(model);
    ledger.register(
        model,
        ELECTRICITY,
        FlowKind::Electricity,
        LinearExpr::sum([pump.work_mechanical]),
        price,
    )?;
    Ok(capital)
}

pub fn cost_reverse_osmosis<L: CostLedger>(
    ledger: &mut L,
    model: &mut Model,
    db: &CostDatabase,
    ro: &ReverseOsmosis0D,
) -> CostingResult<VarId> {
    let capital = capital_var(model, ro.name())?;
    let per_m2 = db.reverse_osmosis.membrane_cost;
    let e = model.add_eq(
        format!("{}.costing.eq_capital_cost", ro.name()),
        vec![capital, ro.area],
        move |v| v[0] - per_m2 * v[1],
    );
    model.set_eq_scale_var(e, capital);
    ledger.track_equation(e);
    ledger.add_capital(capital)?;
    Ok(capital)
}

/// Registers the chemical solution and its metering-pump electricity.
///
/// `chem_cost` [$/kg solution] and `chem_purity` override the database; an
/// overridden purity is fixed on the unit.
pub fn cost_chemical_addition<L: CostLedger>(
    ledger: &mut L,
    model: &mut Model,
    db: &CostDatabase,
    unit: &ChemicalAddition,
    chem_cost: Option<f64>,
    chem_purity: Option<f64>,
) -> CostingResult<()> {
    let chemical = unit.chemical();
    let unit_cost = match chem_cost {
        Some(c) => c,
        None => db.chemical(chemical)?.cost,
    };
    if let Some(purity) = chem_purity {
        if !(purity > 0.0 && purity <= 1.0) {
            return Err(CostingError::InvalidArg {
                what: format!("purity of {chemical} must be in (0, 1], got {purity}"),
            });
        }
        model.fix(unit.purity, purity)?;
    }
    ledger.register(
        model,
        chemical,
        FlowKind::Mass,
        LinearExpr::sum([unit.flow_mass_soln]),
        unit_cost,
    )?;
    let price = ledger.electricity_cost(model);
    ledger.register(
        model,
        ELECTRICITY,
        FlowKind::Electricity,
        LinearExpr::sum([unit.electricity]),
        price,
    )
}

pub fn cost_deep_well_injection<L: CostLedger>(
    ledger: &mut L,
    model: &mut Model,
    db: &CostDatabase,
    unit: &DeepWellInjection,
    method: DeepWellCostMethod,
) -> CostingResult<Option<VarId>> {
    match method {
        DeepWellCostMethod::AsOpex { dwi_lcow } => {
            let lcow = dwi_lcow.unwrap_or(db.deep_well_injection.dwi_lcow);
            ledger.register(
                model,
                DEEP_WELL_INJECTION,
                FlowKind::Volume,
                LinearExpr::sum([unit.flow_vol]),
                lcow,
            )?;
            Ok(None)
        }
        DeepWellCostMethod::AsCapex => {
            let capital = capital_var(model, unit.name())?;
            let per_daily_m3 = db.deep_well_injection.capital_per_daily_m3;
            let e = model.add_eq(
                format!("{}.costing.eq_capital_cost", unit.name()),
                vec![capital, unit.flow_vol],
                move |v| v[0] - per_daily_m3 * 86_400.0 * v[1],
            );
            model.set_eq_scale_var(e, capital);
            ledger.track_equation(e);
            ledger.add_capital(capital)?;
            ledger.register(
                model,
                DEEP_WELL_INJECTION,
                FlowKind::Volume,
                LinearExpr::sum([unit.flow_vol]),
                db.deep_well_injection.opex_per_m3,
            )?;
            Ok(Some(capital))
        }
    }
}

/// UV power is in kW; the ledger takes W.
pub fn cost_uv_aop<L: CostLedger>(
    ledger: &mut L,
    model: &mut Model,
    unit: &UvAop,
) -> CostingResult<()> {
    let price = ledger.electricity_cost(model);
    ledger.register(
        model,
        ELECTRICITY,
        FlowKind::Electricity,
        LinearExpr::term(unit.power_kw, 1e3),
        price,
    )
}
