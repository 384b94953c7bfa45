//! Plant scenarios against the calibrated input documents.

use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use rc_core::constants::{ATM_PA, SECONDS_PER_YEAR};
use rc_core::units::gpm;
use rc_core::units::read::{to_gpm, to_kw, to_m3ps};
use rc_flowsheet::recipes::{
    brine_disposal, chemical_addition, ro_train, uf_system, uf_train, uv_aop,
};
use rc_flowsheet::{Driver, FeedConditions, FlowsheetError};
use rc_project::{InputDocument, load_yaml};
use rc_solver::SolverConfig;

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn doc(name: &str) -> InputDocument {
    let path = data_dir().join(name);
    load_yaml(&path).unwrap_or_else(|e| panic!("failed to load {name}: {e}"))
}

fn driver() -> Driver {
    Driver::new(&SolverConfig::default()).unwrap()
}

#[test]
fn ro_train_8_19_21() {
    let (fs, summary) = ro_train::run(
        &driver(),
        &doc("wrd_inputs_8_19_21.yaml"),
        ro_train::default_feed(),
        false,
    )
    .unwrap();

    assert_eq!(fs.degrees_of_freedom(), 0);
    assert!(fs.report().unwrap().status.is_optimal());
    assert_eq!(summary.stages.len(), 3);
    assert_relative_eq!(to_kw(summary.total_pump_power), 196.25 + 22.7 + 29.3, max_relative = 0.15);
    assert_relative_eq!(to_gpm(summary.product_flow), 1608.0 + 635.0 + 198.0, max_relative = 0.15);

    let stage_sum: f64 = summary.stages.iter().map(|s| to_gpm(s.permeate_flow)).sum();
    assert_relative_eq!(stage_sum, to_gpm(summary.product_flow), max_relative = 1e-6);
    assert_relative_eq!(
        to_gpm(summary.product_flow) + to_gpm(summary.disposal_flow),
        2637.0,
        max_relative = 1e-3
    );
}

#[test]
fn ro_train_3_13_21() {
    let feed = FeedConditions::plant(2452.0, 0.503, 295.0, ATM_PA);
    let (_, summary) = ro_train::run(
        &driver(),
        &doc("wrd_ro_inputs_3_13_21.yaml"),
        feed,
        false,
    )
    .unwrap();
    assert_relative_eq!(to_kw(summary.total_pump_power), 189.6 + 22.8 + 24.9, max_relative = 0.15);
    assert_relative_eq!(to_gpm(summary.product_flow), 1404.7 + 617.0 + 279.0, max_relative = 0.15);
}

#[test]
fn ro_train_costing_adds_lcow() {
    let (_, summary) = ro_train::run(
        &driver(),
        &doc("wrd_inputs_8_19_21.yaml"),
        ro_train::default_feed(),
        true,
    )
    .unwrap();
    let costing = summary.costing.expect("costing summary");
    assert!(costing.total_capital_cost > 0.0);
    assert!(costing.flows.contains_key("electricity"));
    let lcow = costing.lcow.expect("lcow");
    assert!(lcow > 0.0 && lcow.is_finite());
}

#[test]
fn identical_inputs_give_identical_results() {
    let run = || {
        ro_train::run(
            &driver(),
            &doc("wrd_inputs_8_19_21.yaml"),
            ro_train::default_feed(),
            false,
        )
        .unwrap()
        .1
    };
    let (a, b) = (run(), run());
    assert_eq!(to_kw(a.total_pump_power).to_bits(), to_kw(b.total_pump_power).to_bits());
    assert_eq!(to_gpm(a.product_flow).to_bits(), to_gpm(b.product_flow).to_bits());
}

#[test]
fn uf_system_three_trains() {
    let (fs, summary) = uf_system::run(
        &driver(),
        &doc("wrd_inputs_8_19_21.yaml"),
        uf_system::default_feed(),
        &uf_system::DEFAULT_SPLITS,
        false,
    )
    .unwrap();
    assert_eq!(fs.degrees_of_freedom(), 0);
    assert_eq!(summary.train_power.len(), 3);
    assert_relative_eq!(to_kw(summary.total_pump_power), 180.0, max_relative = 0.15);
    // trains 1 and 2 carry the same share
    assert_relative_eq!(
        to_kw(summary.train_power[0]),
        to_kw(summary.train_power[1]),
        max_relative = 1e-9
    );
}

#[test]
fn uf_system_rejects_bad_splits() {
    let err = uf_system::run(
        &driver(),
        &doc("wrd_inputs_8_19_21.yaml"),
        uf_system::default_feed(),
        &[0.5, 0.4],
        false,
    )
    .unwrap_err();
    assert!(err.is_configuration(), "{err}");
}

#[test]
fn uf_train_3_13_21() {
    let input = doc("wrd_inputs_3_13_21.yaml");
    for (qin, expected_kw) in [(2452.0, 108.0), (3955.0, 175.0), (1785.0, 79.0)] {
        let feed = uf_train::default_feed().with_flow(gpm(qin));
        let (_, summary) = uf_train::run(&driver(), &input, feed, false).unwrap();
        assert_relative_eq!(to_kw(summary.pump_power), expected_kw, max_relative = 0.15);
        assert_relative_eq!(to_gpm(summary.product_flow), 0.95 * qin, max_relative = 1e-3);
    }
}

#[test]
fn chemical_operating_costs() {
    let input = doc("wrd_inputs_8_19_21.yaml");
    let cases = [
        ("ammonium_sulfate", 2662.0),
        ("sodium_hypochlorite", 27074.0),
        ("sulfuric_acid", 106556.0),
        ("scale_inhibitor", 54393.0),
        ("calcium_hydroxide", 567705.0),
        ("sodium_hydroxide", 37373.0),
        ("sodium_bisulfite", 29499.0),
    ];
    for (chemical, expected) in cases {
        let (_, summary) = chemical_addition::run(
            &driver(),
            &input,
            chemical_addition::default_feed(),
            Some(chemical),
            None,
        )
        .unwrap();
        assert_relative_eq!(summary.costing.total_operating_cost, expected, max_relative = 0.15);
        assert!(summary.chemical_cost > 0.0);
    }
}

#[test]
fn chemical_addition_requires_a_chemical() {
    let input = doc("wrd_inputs_8_19_21.yaml");
    for chemical in [None, Some("  ")] {
        let err = chemical_addition::run(
            &driver(),
            &input,
            chemical_addition::default_feed(),
            chemical,
            Some(1.0),
        )
        .unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("Must specify a chemical for addition."));
    }
}

#[test]
fn chemical_dose_override() {
    let input = doc("wrd_inputs_8_19_21.yaml");
    let (_, base) = chemical_addition::run(
        &driver(),
        &input,
        chemical_addition::default_feed(),
        Some("sulfuric_acid"),
        None,
    )
    .unwrap();
    let (_, doubled) = chemical_addition::run(
        &driver(),
        &input,
        chemical_addition::default_feed(),
        Some("sulfuric_acid"),
        Some(120.0),
    )
    .unwrap();
    assert_relative_eq!(doubled.dose_mg_per_l, 120.0, max_relative = 1e-9);
    assert_relative_eq!(doubled.chemical_cost, 2.0 * base.chemical_cost, max_relative = 1e-6);
}

#[test]
fn brine_disposal_as_opex() {
    let (fs, summary) = brine_disposal::run(
        &driver(),
        &doc("wrd_inputs_8_19_21.yaml"),
        brine_disposal::default_feed(),
        true,
    )
    .unwrap();
    assert_eq!(fs.degrees_of_freedom(), 0);
    let q = to_m3ps(gpm(2637.0));
    assert_relative_eq!(to_m3ps(summary.flow), q, max_relative = 1e-6);

    let costing = summary.costing.expect("costing summary");
    assert_relative_eq!(
        costing.total_operating_cost,
        0.9 * 0.49 * q * SECONDS_PER_YEAR,
        max_relative = 1e-6
    );
}

#[test]
fn uv_power_from_surrogate() {
    let mut input = doc("wrd_inputs_8_19_21.yaml");
    if let Some(uv) = input.uv_aop.as_mut() {
        uv.surrogate = data_dir().join(&uv.surrogate).display().to_string();
    }
    let (fs, summary) = uv_aop::run(&driver(), &input, uv_aop::default_feed(), false).unwrap();
    assert_eq!(fs.degrees_of_freedom(), 0);
    assert_relative_eq!(rc_core::units::read::to_mgd(summary.flow), 1.757, max_relative = 1e-3);
    assert_relative_eq!(to_kw(summary.power), 41.19, max_relative = 0.05);
}

#[test]
fn missing_section_is_a_configuration_error() {
    let err = uv_aop::run(
        &driver(),
        &doc("wrd_inputs_3_13_21.yaml"),
        uv_aop::default_feed(),
        false,
    )
    .unwrap_err();
    assert!(matches!(err, FlowsheetError::Project(_)));
    assert!(err.is_configuration());
}

#[test]
fn reports_render_fixed_width() {
    let (_, summary) = uf_system::run(
        &driver(),
        &doc("wrd_inputs_8_19_21.yaml"),
        uf_system::default_feed(),
        &uf_system::DEFAULT_SPLITS,
        false,
    )
    .unwrap();
    let text = summary.report().to_string();
    assert!(text.contains("Total UF pump power (kW)"));
    assert!(text.contains("uf_train3 pump power (kW)"));
}
