//! Default economic data.
//!
//! The database ships inside the crate as YAML and can be replaced by a
//! caller-supplied document with the same layout.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CostingError, CostingResult};

const DEFAULT_COSTS: &str = include_str!("../data/default_costs.yaml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemicalCost {
    /// $/kg of delivered solution
    pub cost: f64,
    /// Mass fraction of active chemical in the solution
    pub purity: f64,
    /// [kg/m³]
    pub solution_density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpCosts {
    /// $ per L/s of inlet flow
    pub low_pressure: f64,
    /// $ per W of work
    pub high_pressure: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoCosts {
    /// $/m²
    pub membrane_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepWellCosts {
    /// $/m³ injected, all-in
    pub dwi_lcow: f64,
    /// $ per m³/day of capacity
    pub capital_per_daily_m3: f64,
    /// $/m³ injected, operating only
    pub opex_per_m3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostDatabase {
    /// $/kWh
    pub electricity_cost: f64,
    pub utilization_factor: f64,
    pub maintenance_labor_chemical_factor: f64,
    pub capital_recovery_factor: f64,
    pub pump: PumpCosts,
    pub reverse_osmosis: RoCosts,
    pub deep_well_injection: DeepWellCosts,
    pub chemicals: BTreeMap<String, ChemicalCost>,
}

impl CostDatabase {
    /// The database embedded in this crate.
    pub fn embedded() -> CostingResult<Self> {
        Self::from_yaml(DEFAULT_COSTS)
    }

    pub fn from_yaml(text: &str) -> CostingResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn chemical(&self, name: &str) -> CostingResult<&ChemicalCost> {
        self.chemicals
            .get(name)
            .ok_or_else(|| CostingError::UnknownChemical {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_database_loads() {
        let db = CostDatabase::embedded().unwrap();
        assert_eq!(db.electricity_cost, 0.07);
        assert_eq!(db.deep_well_injection.dwi_lcow, 0.49);
        assert_eq!(db.chemicals.len(), 7);
        assert_eq!(db.chemical("sodium_hypochlorite").unwrap().purity, 0.125);
        assert!(matches!(
            db.chemical("unobtainium"),
            Err(CostingError::UnknownChemical { .. })
        ));
    }
}
