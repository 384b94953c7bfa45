//! Chemical dosing: feed → chemical addition → product, costed against the
//! chemical's database price.

use rc_components::chemical_addition::{DEFAULT_LIFT_HEIGHT_M, DEFAULT_PUMP_EFFICIENCY};
use rc_components::{ChemicalAddition, ChemicalConfig, Feed, Product};
use rc_core::constants::ATM_PA;
use rc_core::units::{Power, VolumeRate, watts};
use rc_costing::CostDatabase;
use rc_project::InputDocument;
use rc_props::PropertyPackage;
use rc_solver::Solver;

use super::{CostInputs, FEED, PRODUCT};
use crate::builder::FlowsheetBuilder;
use crate::conditions::FeedConditions;
use crate::driver::Driver;
use crate::error::{FlowsheetError, FlowsheetResult};
use crate::flowsheet::{Assembled, Flowsheet, Solved};
use crate::report::{CostingSummary, Report};

pub const DEFAULT_INPUT: &str = "wrd_inputs_8_19_21.yaml";
pub const UNIT: &str = "chemical_addition.unit";
pub const MISSING_CHEMICAL: &str = "Must specify a chemical for addition.";

pub fn default_feed() -> FeedConditions {
    FeedConditions::plant(2637.0, 0.5, 302.0, ATM_PA)
}

/// Resolve the dosing config for `chemical`.
///
/// `dose_mg_per_l` overrides the document's dose; purity and solution
/// density come from the document when it sets them and from `db`
/// otherwise.
pub fn chemical_config(
    doc: &InputDocument,
    db: &CostDatabase,
    chemical: Option<&str>,
    dose_mg_per_l: Option<f64>,
) -> FlowsheetResult<ChemicalConfig> {
    let chemical = chemical
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| FlowsheetError::configuration(MISSING_CHEMICAL))?;
    let prices = db.chemical(chemical)?;
    let def = doc.chemical_addition.as_ref();

    let mut config = match def.and_then(|d| d.to_config(chemical, prices.purity, prices.solution_density)) {
        Some(config) => config,
        None => ChemicalConfig {
            chemical: Some(chemical.to_string()),
            dose: f64::NAN,
            purity: prices.purity,
            solution_density: prices.solution_density,
            lift_height: def.map_or(DEFAULT_LIFT_HEIGHT_M, |d| d.lift_height_m),
            pump_efficiency: def.map_or(DEFAULT_PUMP_EFFICIENCY, |d| d.pump_efficiency),
        },
    };
    if let Some(dose) = dose_mg_per_l {
        config.dose = dose * 1e-3;
    }
    if config.dose.is_nan() {
        return Err(FlowsheetError::configuration(format!(
            "no dose given for chemical '{chemical}'"
        )));
    }
    Ok(config)
}

pub fn build(pkg: PropertyPackage, config: &ChemicalConfig) -> FlowsheetResult<(Flowsheet<Assembled>, ChemicalAddition)> {
    if config.chemical.as_deref().is_none_or(|c| c.trim().is_empty()) {
        return Err(FlowsheetError::configuration(MISSING_CHEMICAL));
    }
    let mut b = FlowsheetBuilder::new(pkg);
    b.add(FEED, Feed::build)?;
    let unit = b.add(UNIT, |m, p, n| ChemicalAddition::build(m, p, n, config))?;
    b.add(PRODUCT, Product::build)?;
    b.connect((FEED, "outlet"), (UNIT, "inlet"))?;
    b.connect((UNIT, "outlet"), (PRODUCT, "inlet"))?;
    Ok((b.build()?, unit))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChemicalSummary {
    pub chemical: String,
    pub flow: VolumeRate,
    /// Dose of active chemical [mg/L]
    pub dose_mg_per_l: f64,
    /// Delivered solution [kg/s]
    pub solution_flow_mass: f64,
    pub pump_power: Power,
    /// Annual cost of the chemical alone [$/yr]
    pub chemical_cost: f64,
    pub costing: CostingSummary,
}

impl ChemicalSummary {
    pub fn report(&self) -> Report {
        let mut r = Report::new(format!("{} Addition Report", self.chemical));
        r.flow("Treated flow", self.flow)
            .row("Dose", format!("{:.3}", self.dose_mg_per_l), "mg/L")
            .row("Solution flow", format!("{:.4e}", self.solution_flow_mass), "kg/s")
            .power("Metering pump power", self.pump_power)
            .row("Chemical cost", format!("{:.2}", self.chemical_cost), "$/yr")
            .costing(&self.costing);
        r
    }
}

/// Dose and cost one chemical; costing is always attached.
pub fn run<S: Solver>(
    driver: &Driver<S>,
    doc: &InputDocument,
    feed: FeedConditions,
    chemical: Option<&str>,
    dose_mg_per_l: Option<f64>,
) -> FlowsheetResult<(Flowsheet<Solved>, ChemicalSummary)> {
    let inputs = CostInputs::from_document(doc)?;
    let config = chemical_config(doc, &inputs.db, chemical, dose_mg_per_l)?;
    let (fs, unit) = build(super::nacl_package(), &config)?;

    let solved = driver.run(fs, &[(FEED, feed)], |fs| {
        let mut c = fs.attach_costing(&inputs.db, &inputs.params)?;
        c.chemical_addition(UNIT, None, None)?;
        c.cost_process()?;
        Ok(())
    })?;

    let costing = CostingSummary::from_flowsheet(&solved)
        .ok_or_else(|| FlowsheetError::configuration("chemical costing was not finalized"))?;
    let name = unit.chemical().to_string();
    let flow = solved
        .flow_vol(UNIT, "inlet")
        .ok_or_else(|| FlowsheetError::configuration(format!("solved flowsheet has no {UNIT}")))?;
    let summary = ChemicalSummary {
        flow,
        dose_mg_per_l: solved.value(unit.dose) * 1e3,
        solution_flow_mass: solved.value(unit.flow_mass_soln),
        pump_power: watts(solved.value(unit.electricity)),
        chemical_cost: costing.flows.get(&name).copied().unwrap_or(0.0),
        costing,
        chemical: name,
    };
    tracing::info!(
        chemical = %summary.chemical,
        operating_cost = summary.costing.total_operating_cost,
        "chemical addition solved"
    );
    Ok((solved, summary))
}
