//! Chemical dosing annual cost against the calibrated database.

use approx::assert_relative_eq;
use rc_components::{ChemicalAddition, ChemicalConfig, UnitOp};
use rc_core::PackageId;
use rc_core::units::{g_per_l, gpm, k, pa};
use rc_costing::methods::cost_chemical_addition;
use rc_costing::{CostDatabase, CostLedger, LedgerParams, ProcessCosting};
use rc_model::Model;
use rc_props::{PropertyPackage, StateValues};
use rc_solver::{NewtonSolver, Solver};

fn annual_cost(chemical: &str, dose_mg_per_l: f64) -> f64 {
    let db = CostDatabase::embedded().unwrap();
    let data = db.chemical(chemical).unwrap().clone();
    let pkg = PropertyPackage::nacl(PackageId(0));
    let mut m = Model::new();
    let unit = ChemicalAddition::build(
        &mut m,
        &pkg,
        "chem",
        &ChemicalConfig {
            chemical: Some(chemical.to_string()),
            dose: dose_mg_per_l * 1e-3,
            purity: data.purity,
            solution_density: data.solution_density,
            lift_height: 30.48,
            pump_efficiency: 0.81,
        },
    )
    .unwrap();
    let feed = StateValues::from_flow_and_conc(gpm(2637.0), g_per_l(0.5), k(302.0), pa(101_325.0)).unwrap();
    pkg.fix_state(&mut m, unit.inlet(), &feed).unwrap();
    unit.guess_outlets(&mut m, &pkg).unwrap();

    let mut ledger = ProcessCosting::build(&mut m, "costing", &LedgerParams::from_database(&db)).unwrap();
    cost_chemical_addition(&mut ledger, &mut m, &db, &unit, None, None).unwrap();
    let totals = ledger.finalize(&mut m).unwrap();
    assert_eq!(m.degrees_of_freedom(), 0);

    let report = NewtonSolver::default().solve(&mut m).unwrap();
    assert!(report.status.is_optimal());
    m.value(totals.total_operating_cost)
}

#[test]
fn chemical_operating_costs() {
    let cases = [
        ("ammonium_sulfate", 0.8, 2662.0),
        ("sodium_hypochlorite", 3.0, 27074.0),
        ("sulfuric_acid", 60.0, 106556.0),
        ("scale_inhibitor", 3.0, 54393.0),
        ("calcium_hydroxide", 100.0, 567705.0),
        ("sodium_hydroxide", 5.0, 37373.0),
        ("sodium_bisulfite", 2.0, 29499.0),
    ];
    for (chemical, dose, expected) in cases {
        let cost = annual_cost(chemical, dose);
        assert_relative_eq!(cost, expected, max_relative = 0.15);
    }
}

#[test]
fn costing_is_deterministic() {
    let a = annual_cost("sulfuric_acid", 60.0);
    let b = annual_cost("sulfuric_acid", 60.0);
    assert_eq!(a.to_bits(), b.to_bits());
}
