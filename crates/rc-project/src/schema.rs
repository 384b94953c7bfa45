//! Input document schema.
//!
//! Documents are written in plant units (psi absolute, m², mg/L); the
//! `to_*` conversions produce the SI configs the unit models take.

use std::collections::BTreeMap;

use rc_components::{ChemicalConfig, PumpConfig, PumpSpec, RoConfig, UfConfig};
use rc_core::constants::ATM_PA;
use rc_core::units::psi;
use rc_core::units::read::to_pa;
use rc_costing::{DeepWellCostMethod, LedgerParams, PumpCostType};
use rc_solver::SolverConfig;
use serde::{Deserialize, Serialize};

/// One plant configuration, keyed by section. Every section is optional;
/// a recipe fails if the section it needs is absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InputDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ro_train: Option<RoTrainDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uf_train: Option<UfTrainDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv_aop: Option<UvAopDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chemical_addition: Option<ChemicalAdditionDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brine_disposal: Option<BrineDisposalDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costing: Option<CostingDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ro_module: Option<RoModuleDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverConfig>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PumpDef {
    pub efficiency: f64,
    /// Absolute outlet pressure [psi]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlet_pressure_psi: Option<f64>,
    /// Pressure rise [psi]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_p_psi: Option<f64>,
}

impl PumpDef {
    /// `None` when neither or both pressure specs are given.
    pub fn to_config(&self) -> Option<PumpConfig> {
        let spec = match (self.outlet_pressure_psi, self.delta_p_psi) {
            (Some(p), None) => PumpSpec::OutletPressure {
                value: to_pa(psi(p)),
            },
            (None, Some(dp)) => PumpSpec::DeltaP {
                value: to_pa(psi(dp)),
            },
            _ => return None,
        };
        Some(PumpConfig {
            efficiency: self.efficiency,
            spec,
        })
    }
}

fn default_permeate_pressure_pa() -> f64 {
    ATM_PA
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MembraneDef {
    pub area_m2: f64,
    /// Water permeability [m/(s·Pa)]
    pub a_comp: f64,
    /// Salt permeability [m/s]
    pub b_comp: f64,
    /// Feed-side pressure change [psi], negative for a drop
    pub delta_p_psi: f64,
    #[serde(default = "default_permeate_pressure_pa")]
    pub permeate_pressure_pa: f64,
}

impl MembraneDef {
    pub fn to_config(&self) -> RoConfig {
        RoConfig {
            a_comp: self.a_comp,
            b_comp: self.b_comp,
            area: self.area_m2,
            delta_p: to_pa(psi(self.delta_p_psi)),
            permeate_pressure: self.permeate_pressure_pa,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoStageDef {
    pub name: String,
    pub pump: PumpDef,
    pub membrane: MembraneDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoTrainDef {
    pub stages: Vec<RoStageDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UfUnitDef {
    pub recovery: f64,
    #[serde(default)]
    pub salt_rejection: f64,
    /// Product-side pressure change [psi]
    pub delta_p_psi: f64,
}

impl UfUnitDef {
    pub fn to_config(&self) -> UfConfig {
        UfConfig {
            recovery: self.recovery,
            salt_rejection: self.salt_rejection,
            delta_p: to_pa(psi(self.delta_p_psi)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UfTrainDef {
    pub pump: PumpDef,
    pub unit: UfUnitDef,
}

fn default_uv_output() -> String {
    "UV1_kW".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UvAopDef {
    /// Surrogate artifact, resolved against the data directory
    pub surrogate: String,
    #[serde(default = "default_uv_output")]
    pub output: String,
}

fn default_lift_height_m() -> f64 {
    rc_components::chemical_addition::DEFAULT_LIFT_HEIGHT_M
}

fn default_pump_efficiency() -> f64 {
    rc_components::chemical_addition::DEFAULT_PUMP_EFFICIENCY
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChemicalDoseDef {
    pub dose_mg_per_l: f64,
    /// Overrides the cost database
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purity: Option<f64>,
    /// Overrides the cost database [kg/m³]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution_density: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChemicalAdditionDef {
    #[serde(default = "default_lift_height_m")]
    pub lift_height_m: f64,
    #[serde(default = "default_pump_efficiency")]
    pub pump_efficiency: f64,
    pub chemicals: BTreeMap<String, ChemicalDoseDef>,
}

impl ChemicalAdditionDef {
    /// SI config for `chemical`; purity and density fall back to the given
    /// defaults when the document does not override them.
    pub fn to_config(
        &self,
        chemical: &str,
        default_purity: f64,
        default_density: f64,
    ) -> Option<ChemicalConfig> {
        let dose = self.chemicals.get(chemical)?;
        Some(ChemicalConfig {
            chemical: Some(chemical.to_string()),
            dose: dose.dose_mg_per_l * 1e-3,
            purity: dose.purity.unwrap_or(default_purity),
            solution_density: dose.solution_density.unwrap_or(default_density),
            lift_height: self.lift_height_m,
            pump_efficiency: self.pump_efficiency,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BrineDisposalDef {
    #[serde(flatten)]
    pub cost_method: DeepWellCostMethod,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CostingDef {
    /// $/kWh
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electricity_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utilization_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_labor_chemical_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_recovery_factor: Option<f64>,
    #[serde(default = "default_pump_cost_type")]
    pub pump_cost_type: PumpCostType,
}

impl CostingDef {
    /// Overlays the document's values on `params`.
    pub fn apply(&self, params: &mut LedgerParams) {
        if let Some(v) = self.electricity_cost {
            params.electricity_cost = v;
        }
        if let Some(v) = self.utilization_factor {
            params.utilization_factor = v;
        }
        if let Some(v) = self.maintenance_labor_chemical_factor {
            params.maintenance_labor_chemical_factor = v;
        }
        if let Some(v) = self.capital_recovery_factor {
            params.capital_recovery_factor = v;
        }
    }
}

fn default_pump_cost_type() -> PumpCostType {
    PumpCostType::HighPressure
}

/// Single RO stage used for membrane-property inversion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RoModuleDef {
    pub membrane: MembraneDef,
}
