//! Process-wide costing ledger.
//!
//! Unit costing methods register consumption flows and capital costs with a
//! [`CostLedger`]. [`CostLedger::finalize`] then adds the aggregate and total
//! cost variables to the model; nothing can be registered afterwards.

use std::collections::BTreeMap;

use rc_core::constants::{HOURS_PER_YEAR, SECONDS_PER_YEAR};
use rc_core::{EqId, VarId};
use rc_model::{LinearExpr, Model};

use crate::database::CostDatabase;
use crate::error::{CostingError, CostingResult};

/// Scaling factor for dollar-valued variables.
pub const COST_SCALE: f64 = 1e-4;

/// How a registered flow is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    /// W, priced per kWh
    Electricity,
    /// kg/s, priced per kg
    Mass,
    /// m³/s, priced per m³
    Volume,
}

impl FlowKind {
    /// Converts a flow quantity times its unit cost into $/yr.
    pub fn annual_factor(self) -> f64 {
        match self {
            FlowKind::Electricity => 1e-3 * HOURS_PER_YEAR,
            FlowKind::Mass | FlowKind::Volume => SECONDS_PER_YEAR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerParams {
    /// $/kWh
    pub electricity_cost: f64,
    pub utilization_factor: f64,
    /// Fraction of total capital spent per year on maintenance, labor and chemicals
    pub maintenance_labor_chemical_factor: f64,
    pub capital_recovery_factor: f64,
}

impl LedgerParams {
    pub fn from_database(db: &CostDatabase) -> Self {
        Self {
            electricity_cost: db.electricity_cost,
            utilization_factor: db.utilization_factor,
            maintenance_labor_chemical_factor: db.maintenance_labor_chemical_factor,
            capital_recovery_factor: db.capital_recovery_factor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowTotals {
    /// Sum of registered quantities, in the flow kind's SI unit
    pub aggregate: VarId,
    /// [$/yr]
    pub annual_cost: VarId,
}

/// Variables created by [`CostLedger::finalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct CostTotals {
    /// [$]
    pub total_capital_cost: VarId,
    /// [$/yr]
    pub total_operating_cost: VarId,
    pub flows: BTreeMap<String, FlowTotals>,
}

/// Shared costing capability.
pub trait CostLedger {
    /// Add `quantity` to the named flow, priced at `unit_cost`.
    ///
    /// A flow keeps the kind and unit cost it was first registered with.
    fn register(
        &mut self,
        model: &mut Model,
        flow: &str,
        kind: FlowKind,
        quantity: LinearExpr,
        unit_cost: f64,
    ) -> CostingResult<()>;

    /// Count a unit's capital cost variable [$] towards the total.
    fn add_capital(&mut self, capital: VarId) -> CostingResult<()>;

    /// Record an equation as part of the costing block.
    fn track_equation(&mut self, eq: EqId);

    /// Build aggregates and totals. Runs once.
    fn finalize(&mut self, model: &mut Model) -> CostingResult<CostTotals>;

    fn is_finalized(&self) -> bool;

    /// Current electricity price [$/kWh].
    fn electricity_cost(&self, model: &Model) -> f64;

    /// Every equation belonging to the costing block.
    fn equations(&self) -> &[EqId];
}

#[derive(Debug, Clone)]
struct RegisteredFlow {
    kind: FlowKind,
    unit_cost: f64,
    unit_cost_var: VarId,
    quantity: LinearExpr,
}

/// Water-treatment costing ledger living in the process model.
#[derive(Debug, Clone)]
pub struct ProcessCosting {
    prefix: String,
    pub electricity_cost: VarId,
    pub utilization_factor: VarId,
    pub maintenance_labor_chemical_factor: VarId,
    pub capital_recovery_factor: VarId,
    flows: BTreeMap<String, RegisteredFlow>,
    capital: Vec<VarId>,
    eqs: Vec<EqId>,
    totals: Option<CostTotals>,
    lcow: Option<VarId>,
}

impl ProcessCosting {
    pub fn build(model: &mut Model, prefix: &str, params: &LedgerParams) -> CostingResult<Self> {
        let mut fixed = |name: &str, value: f64, units: &'static str| -> CostingResult<VarId> {
            let id = model.add_var(format!("{prefix}.{name}"), value, units)?;
            model.fix(id, value)?;
            model.set_scale(id, 1.0)?;
            Ok(id)
        };
        Ok(Self {
            prefix: prefix.to_string(),
            electricity_cost: fixed("electricity_cost", params.electricity_cost, "$/kWh")?,
            utilization_factor: fixed("utilization_factor", params.utilization_factor, "-")?,
            maintenance_labor_chemical_factor: fixed(
                "maintenance_labor_chemical_factor",
                params.maintenance_labor_chemical_factor,
                "1/yr",
            )?,
            capital_recovery_factor: fixed(
                "capital_recovery_factor",
                params.capital_recovery_factor,
                "1/yr",
            )?,
            flows: BTreeMap::new(),
            capital: Vec::new(),
            eqs: Vec::new(),
            totals: None,
            lcow: None,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn registered_flows(&self) -> impl Iterator<Item = &str> {
        self.flows.keys().map(String::as_str)
    }

    pub fn is_registered(&self, flow: &str) -> bool {
        self.flows.contains_key(flow)
    }

    pub fn totals(&self) -> Option<&CostTotals> {
        self.totals.as_ref()
    }

    pub fn lcow(&self) -> Option<VarId> {
        self.lcow
    }

    /// Levelized cost of water on `product_flow_vol` [m³/s]:
    ///
    /// ```text
    /// LCOW = (crf · capital + opex) / (util · annual product volume)
    /// ```
    pub fn add_lcow(&mut self, model: &mut Model, product_flow_vol: VarId) -> CostingResult<VarId> {
        let totals = self.totals.as_ref().ok_or(CostingError::NotFinalized)?;
        let lcow = model.add_var(format!("{}.LCOW", self.prefix), 0.0, "$/m3")?;
        model.set_scale(lcow, 1.0)?;
        let e = model.add_eq(
            format!("{}.eq_LCOW", self.prefix),
            vec![
                lcow,
                self.utilization_factor,
                product_flow_vol,
                self.capital_recovery_factor,
                totals.total_capital_cost,
                totals.total_operating_cost,
            ],
            |v| v[0] * v[1] * v[2] * SECONDS_PER_YEAR - (v[3] * v[4] + v[5]),
        );
        model.set_eq_scale(e, COST_SCALE);
        self.eqs.push(e);
        self.lcow = Some(lcow);
        Ok(lcow)
    }

    fn cost_var(&self, model: &mut Model, name: String) -> CostingResult<VarId> {
        let id = model.add_var(name, 0.0, "$")?;
        model.set_scale(id, COST_SCALE)?;
        Ok(id)
    }
}

impl CostLedger for ProcessCosting {
    fn register(
        &mut self,
        model: &mut Model,
        flow: &str,
        kind: FlowKind,
        quantity: LinearExpr,
        unit_cost: f64,
    ) -> CostingResult<()> {
        if self.totals.is_some() {
            return Err(CostingError::Finalized {
                flow: flow.to_string(),
            });
        }
        if !(unit_cost.is_finite() && unit_cost >= 0.0) {
            return Err(CostingError::InvalidArg {
                what: format!("unit cost of '{flow}' must be non-negative, got {unit_cost}"),
            });
        }
        if let Some(existing) = self.flows.get_mut(flow) {
            if existing.kind != kind {
                return Err(CostingError::ConflictingKind {
                    flow: flow.to_string(),
                    existing: existing.kind,
                    new: kind,
                });
            }
            if (existing.unit_cost - unit_cost).abs() > 1e-12 * existing.unit_cost.abs().max(1.0) {
                return Err(CostingError::ConflictingUnitCost {
                    flow: flow.to_string(),
                    existing: existing.unit_cost,
                    new: unit_cost,
                });
            }
            for (v, c) in quantity.terms() {
                existing.quantity.push(*v, *c);
            }
            return Ok(());
        }

        let unit_cost_var = if kind == FlowKind::Electricity {
            let current = model.value(self.electricity_cost);
            if (current - unit_cost).abs() > 1e-12 {
                return Err(CostingError::ConflictingUnitCost {
                    flow: flow.to_string(),
                    existing: current,
                    new: unit_cost,
                });
            }
            self.electricity_cost
        } else {
            let id = model.add_var(format!("{}.{flow}_cost", self.prefix), unit_cost, "$/unit")?;
            model.fix(id, unit_cost)?;
            model.set_scale(id, 1.0)?;
            id
        };
        tracing::debug!(flow, ?kind, unit_cost, "registered costing flow");
        self.flows.insert(
            flow.to_string(),
            RegisteredFlow {
                kind,
                unit_cost,
                unit_cost_var,
                quantity,
            },
        );
        Ok(())
    }

    fn add_capital(&mut self, capital: VarId) -> CostingResult<()> {
        if self.totals.is_some() {
            return Err(CostingError::Finalized {
                flow: "capital_cost".to_string(),
            });
        }
        self.capital.push(capital);
        Ok(())
    }

    fn track_equation(&mut self, eq: EqId) {
        self.eqs.push(eq);
    }

    fn finalize(&mut self, model: &mut Model) -> CostingResult<CostTotals> {
        if let Some(totals) = &self.totals {
            return Ok(totals.clone());
        }
        let prefix = self.prefix.clone();
        let mut flows = BTreeMap::new();
        let mut annual_costs = Vec::with_capacity(self.flows.len());

        for (name, flow) in &self.flows {
            let aggregate = model.add_var(format!("{prefix}.aggregate_flow_{name}"), 0.0, "SI")?;
            let mut vars = vec![aggregate];
            let coeffs: Vec<f64> = flow.quantity.terms().iter().map(|(_, c)| *c).collect();
            vars.extend(flow.quantity.terms().iter().map(|(v, _)| *v));
            let e = model.add_eq(format!("{prefix}.eq_aggregate_flow_{name}"), vars, move |v| {
                v[0] - v[1..].iter().zip(&coeffs).map(|(x, c)| x * c).sum::<f64>()
            });
            self.eqs.push(e);

            let annual_cost = self.cost_var(model, format!("{prefix}.aggregate_flow_costs_{name}"))?;
            let factor = flow.kind.annual_factor();
            let e = model.add_eq(
                format!("{prefix}.eq_aggregate_flow_costs_{name}"),
                vec![annual_cost, flow.unit_cost_var, aggregate],
                move |v| v[0] - v[1] * factor * v[2],
            );
            model.set_eq_scale_var(e, annual_cost);
            self.eqs.push(e);

            annual_costs.push(annual_cost);
            flows.insert(name.clone(), FlowTotals { aggregate, annual_cost });
        }

        let total_capital_cost = self.cost_var(model, format!("{prefix}.total_capital_cost"))?;
        let mut vars = vec![total_capital_cost];
        vars.extend(&self.capital);
        let e = model.add_eq(format!("{prefix}.eq_total_capital_cost"), vars, |v| {
            v[0] - v[1..].iter().sum::<f64>()
        });
        model.set_eq_scale_var(e, total_capital_cost);
        self.eqs.push(e);

        // v: opex, util, mlc, capital, flow costs...
        let total_operating_cost = self.cost_var(model, format!("{prefix}.total_operating_cost"))?;
        let mut vars = vec![
            total_operating_cost,
            self.utilization_factor,
            self.maintenance_labor_chemical_factor,
            total_capital_cost,
        ];
        vars.extend(&annual_costs);
        let e = model.add_eq(format!("{prefix}.eq_total_operating_cost"), vars, |v| {
            v[0] - (v[1] * v[4..].iter().sum::<f64>() + v[2] * v[3])
        });
        model.set_eq_scale_var(e, total_operating_cost);
        self.eqs.push(e);

        tracing::info!(
            flows = self.flows.len(),
            capital_items = self.capital.len(),
            "costing finalized"
        );
        let totals = CostTotals {
            total_capital_cost,
            total_operating_cost,
            flows,
        };
        self.totals = Some(totals.clone());
        Ok(totals)
    }

    fn is_finalized(&self) -> bool {
        self.totals.is_some()
    }

    fn electricity_cost(&self, model: &Model) -> f64 {
        model.value(self.electricity_cost)
    }

    fn equations(&self) -> &[EqId] {
        &self.eqs
    }
}
