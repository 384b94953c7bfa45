//! Brine disposal by deep-well injection.

use rc_components::{DeepWellInjection, Feed, StateJunction};
use rc_core::constants::ATM_PA;
use rc_core::units::VolumeRate;
use rc_costing::DeepWellCostMethod;
use rc_project::InputDocument;
use rc_props::PropertyPackage;
use rc_solver::Solver;

use super::{CostInputs, FEED};
use crate::builder::FlowsheetBuilder;
use crate::conditions::FeedConditions;
use crate::driver::Driver;
use crate::error::{FlowsheetError, FlowsheetResult};
use crate::flowsheet::{Assembled, Flowsheet, Solved};
use crate::report::{CostingSummary, Report};

pub const DEFAULT_INPUT: &str = "wrd_inputs_8_19_21.yaml";
pub const JUNCTION: &str = "brine_disposal.feed";
pub const UNIT: &str = "brine_disposal.unit";

pub fn default_feed() -> FeedConditions {
    FeedConditions::plant(2637.0, 0.5, 302.0, ATM_PA)
}

pub fn build(pkg: PropertyPackage) -> FlowsheetResult<Flowsheet<Assembled>> {
    let mut b = FlowsheetBuilder::new(pkg);
    b.add(FEED, Feed::build)?;
    b.add(JUNCTION, StateJunction::build)?;
    b.add(UNIT, DeepWellInjection::build)?;
    b.connect((FEED, "outlet"), (JUNCTION, "inlet"))?;
    b.connect((JUNCTION, "outlet"), (UNIT, "inlet"))?;
    b.build()
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrineSummary {
    pub flow: VolumeRate,
    pub method: DeepWellCostMethod,
    pub costing: Option<CostingSummary>,
}

impl BrineSummary {
    pub fn report(&self) -> Report {
        let mut r = Report::new("Brine Disposal Report");
        r.flow("Injected flow", self.flow);
        let method = match self.method {
            DeepWellCostMethod::AsOpex { .. } => "as_opex",
            DeepWellCostMethod::AsCapex => "as_capex",
        };
        r.row("Cost method", method, "-");
        if let Some(costing) = &self.costing {
            r.costing(costing);
        }
        r
    }
}

/// The document's `brine_disposal` method applies when present; otherwise
/// the database's all-in injection price is charged as operating cost.
pub fn run<S: Solver>(
    driver: &Driver<S>,
    doc: &InputDocument,
    feed: FeedConditions,
    costing: bool,
) -> FlowsheetResult<(Flowsheet<Solved>, BrineSummary)> {
    let method = doc
        .brine_disposal
        .map(|d| d.cost_method)
        .unwrap_or(DeepWellCostMethod::AsOpex { dwi_lcow: None });
    let fs = build(super::nacl_package())?;
    let cost_inputs = costing.then(|| CostInputs::from_document(doc)).transpose()?;

    let solved = driver.run(fs, &[(FEED, feed)], |fs| {
        let Some(inputs) = &cost_inputs else {
            return Ok(());
        };
        let mut c = fs.attach_costing(&inputs.db, &inputs.params)?;
        c.deep_well_injection(UNIT, method)?;
        c.cost_process()?;
        Ok(())
    })?;

    let flow = solved
        .flow_vol(UNIT, "inlet")
        .ok_or_else(|| FlowsheetError::configuration(format!("solved flowsheet has no {UNIT}")))?;
    let summary = BrineSummary {
        flow,
        method,
        costing: CostingSummary::from_flowsheet(&solved),
    };
    tracing::info!(?method, "brine disposal solved");
    Ok((solved, summary))
}
