//! UV advanced oxidation: feed → UV reactor → product, power from a fitted
//! surrogate of flow.

use std::sync::Arc;

use rc_components::{Feed, Product, UvAop};
use rc_core::units::read::{to_kw, to_mgd};
use rc_core::units::{Power, VolumeRate, kw, m3ps};
use rc_project::{InputDocument, UvAopDef, resolve_data_file};
use rc_props::PropertyPackage;
use rc_solver::Solver;
use rc_surrogate::{Surrogate, load_json};

use super::{CostInputs, FEED, PRODUCT, section};
use crate::builder::FlowsheetBuilder;
use crate::conditions::FeedConditions;
use crate::driver::Driver;
use crate::error::{FlowsheetError, FlowsheetResult};
use crate::flowsheet::{Assembled, Flowsheet, Solved};
use crate::report::{CostingSummary, Report};

pub const DEFAULT_INPUT: &str = "wrd_inputs_8_19_21.yaml";
pub const UNIT: &str = "uv_aop.unit";

pub fn default_feed() -> FeedConditions {
    FeedConditions::plant(0.0, 1.084, 298.15, rc_core::constants::ATM_PA).with_flow(m3ps(0.077))
}

/// Load the artifact named in `def` from the data directory.
pub fn load_surrogate(def: &UvAopDef) -> FlowsheetResult<Arc<dyn Surrogate>> {
    let path = resolve_data_file(&def.surrogate)?;
    let surrogate = load_json(&path)?;
    tracing::debug!(path = %path.display(), "loaded UV power surrogate");
    Ok(Arc::new(surrogate))
}

pub fn build(
    pkg: PropertyPackage,
    surrogate: Arc<dyn Surrogate>,
    output: &str,
) -> FlowsheetResult<(Flowsheet<Assembled>, UvAop)> {
    let mut b = FlowsheetBuilder::new(pkg);
    b.add(FEED, Feed::build)?;
    let unit = b.add(UNIT, |m, p, n| UvAop::build(m, p, n, surrogate, output))?;
    b.add(PRODUCT, Product::build)?;
    b.connect((FEED, "outlet"), (UNIT, "inlet"))?;
    b.connect((UNIT, "outlet"), (PRODUCT, "inlet"))?;
    Ok((b.build()?, unit))
}

#[derive(Debug, Clone, PartialEq)]
pub struct UvSummary {
    pub flow: VolumeRate,
    pub power: Power,
    pub costing: Option<CostingSummary>,
}

impl UvSummary {
    pub fn report(&self) -> Report {
        let mut r = Report::new("UV Report");
        r.flow("Total flow rate", self.flow).power("Power consumption", self.power);
        if let Some(costing) = &self.costing {
            r.costing(costing);
        }
        r
    }
}

pub fn run<S: Solver>(
    driver: &Driver<S>,
    doc: &InputDocument,
    feed: FeedConditions,
    costing: bool,
) -> FlowsheetResult<(Flowsheet<Solved>, UvSummary)> {
    let def = section(doc.uv_aop.as_ref(), "uv_aop")?;
    let surrogate = load_surrogate(def)?;
    let (fs, unit) = build(super::nacl_package(), surrogate, &def.output)?;
    let cost_inputs = costing.then(|| CostInputs::from_document(doc)).transpose()?;

    let solved = driver.run(fs, &[(FEED, feed)], |fs| {
        let Some(inputs) = &cost_inputs else {
            return Ok(());
        };
        let mut c = fs.attach_costing(&inputs.db, &inputs.params)?;
        c.uv_aop(UNIT)?;
        c.cost_process()?;
        c.add_lcow(PRODUCT)?;
        Ok(())
    })?;

    let flow = solved
        .flow_vol(UNIT, "inlet")
        .ok_or_else(|| FlowsheetError::configuration(format!("solved UV flowsheet has no {UNIT}")))?;
    let summary = UvSummary {
        flow,
        power: kw(solved.value(unit.power_kw)),
        costing: CostingSummary::from_flowsheet(&solved),
    };
    if !unit.surrogate().in_bounds(&[to_mgd(flow)]) {
        tracing::warn!(flow_mgd = to_mgd(flow), "UV flow outside the surrogate's training range");
    }
    tracing::info!(power_kw = to_kw(summary.power), "UV reactor solved");
    Ok((solved, summary))
}
