//! Parallel UF trains behind a splitter.

use rc_components::{Feed, Mixer, Product, Separator, validate_split_fractions};
use rc_core::constants::ATM_PA;
use rc_core::units::read::to_kw;
use rc_core::units::{Power, VolumeRate, watts};
use rc_model::LinearExpr;
use rc_project::{InputDocument, UfTrainDef};
use rc_props::PropertyPackage;
use rc_solver::Solver;

use super::uf_train::{UfTrainBlocks, add_uf_train};
use super::{CostInputs, DISPOSAL, FEED, PRODUCT, section};
use crate::builder::FlowsheetBuilder;
use crate::conditions::FeedConditions;
use crate::driver::Driver;
use crate::error::{FlowsheetError, FlowsheetResult};
use crate::flowsheet::{Assembled, Flowsheet, Solved};
use crate::report::{CostingSummary, Report};

pub const DEFAULT_INPUT: &str = "wrd_inputs_8_19_21.yaml";
pub const DEFAULT_SPLITS: [f64; 3] = [0.4, 0.4, 0.2];
pub const SPLITTER: &str = "uf_system.splitter";
pub const PRODUCT_MIXER: &str = "uf_system.product_mixer";
pub const DISPOSAL_MIXER: &str = "uf_system.disposal_mixer";
pub const TOTAL_PUMP_POWER: &str = "total_uf_pump_power";

pub fn default_feed() -> FeedConditions {
    FeedConditions::plant(10416.0, 0.5, 302.0, ATM_PA)
}

pub fn train_prefix(n: usize) -> String {
    format!("uf_train{n}")
}

/// One identical train per split fraction; fractions must lie in [0, 1] and
/// sum to one.
pub fn build(
    pkg: PropertyPackage,
    def: &UfTrainDef,
    splits: &[f64],
) -> FlowsheetResult<(Flowsheet<Assembled>, Vec<UfTrainBlocks>)> {
    validate_split_fractions(splits).map_err(|e| FlowsheetError::configuration(e.to_string()))?;
    let n = splits.len();

    let mut b = FlowsheetBuilder::new(pkg);
    b.add(FEED, Feed::build)?;
    b.add(SPLITTER, |m, p, name| Separator::build(m, p, name, splits))?;
    b.connect((FEED, "outlet"), (SPLITTER, "inlet"))?;

    let mut trains = Vec::with_capacity(n);
    let mut power = LinearExpr::default();
    for k in 1..=n {
        let train = add_uf_train(&mut b, &train_prefix(k), def)?;
        power.push(train.work_mechanical, 1.0);
        trains.push(train);
    }

    b.add(PRODUCT_MIXER, |m, p, name| Mixer::build(m, p, name, n))?;
    b.add(DISPOSAL_MIXER, |m, p, name| Mixer::build(m, p, name, n))?;
    for (k, train) in trains.iter().enumerate() {
        let (outlet, inlet) = (format!("outlet_{}", k + 1), format!("inlet_{}", k + 1));
        b.connect((SPLITTER, &outlet), (&train.feed, "inlet"))?;
        b.connect((&train.product, "outlet"), (PRODUCT_MIXER, &inlet))?;
        b.connect((&train.disposal, "outlet"), (DISPOSAL_MIXER, &inlet))?;
    }
    b.add(PRODUCT, Product::build)?;
    b.add(DISPOSAL, Product::build)?;
    b.connect((PRODUCT_MIXER, "outlet"), (PRODUCT, "inlet"))?;
    b.connect((DISPOSAL_MIXER, "outlet"), (DISPOSAL, "inlet"))?;

    b.add_expression(TOTAL_PUMP_POWER, power)?;
    Ok((b.build()?, trains))
}

#[derive(Debug, Clone, PartialEq)]
pub struct UfSystemSummary {
    pub feed: FeedConditions,
    pub train_power: Vec<Power>,
    pub total_pump_power: Power,
    pub product_flow: VolumeRate,
    pub disposal_flow: VolumeRate,
    pub costing: Option<CostingSummary>,
}

impl UfSystemSummary {
    pub fn report(&self) -> Report {
        let mut r = Report::new("UF System Report");
        r.flow("Feed flow", self.feed.flow);
        for (k, p) in self.train_power.iter().enumerate() {
            r.power(&format!("{} pump power", train_prefix(k + 1)), *p);
        }
        r.power("Total UF pump power", self.total_pump_power)
            .flow("Product flow", self.product_flow)
            .flow("Disposal flow", self.disposal_flow);
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
    splits: &[f64],
    costing: bool,
) -> FlowsheetResult<(Flowsheet<Solved>, UfSystemSummary)> {
    let def = section(doc.uf_train.as_ref(), "uf_train")?;
    let (fs, trains) = build(super::nacl_package(), def, splits)?;
    let cost_inputs = costing.then(|| CostInputs::from_document(doc)).transpose()?;

    let solved = driver.run(fs, &[(FEED, feed)], |fs| {
        let Some(inputs) = &cost_inputs else {
            return Ok(());
        };
        let mut c = fs.attach_costing(&inputs.db, &inputs.params)?;
        for train in &trains {
            c.pump(&train.pump, inputs.pump_cost_type)?;
        }
        c.cost_process()?;
        c.add_lcow(PRODUCT)?;
        Ok(())
    })?;

    let pkg = solved.package().params();
    let missing = |block: &str| FlowsheetError::configuration(format!("solved UF system has no {block}"));
    let product = solved.state_values(PRODUCT, "inlet").ok_or_else(|| missing(PRODUCT))?;
    let disposal = solved.state_values(DISPOSAL, "inlet").ok_or_else(|| missing(DISPOSAL))?;
    let total = solved
        .expression(TOTAL_PUMP_POWER)
        .ok_or_else(|| missing(TOTAL_PUMP_POWER))?;
    let summary = UfSystemSummary {
        feed,
        train_power: trains
            .iter()
            .map(|t| watts(solved.value(t.work_mechanical)))
            .collect(),
        total_pump_power: watts(total),
        product_flow: product.flow_vol(pkg),
        disposal_flow: disposal.flow_vol(pkg),
        costing: CostingSummary::from_flowsheet(&solved),
    };
    tracing::info!(
        trains = trains.len(),
        power_kw = to_kw(summary.total_pump_power),
        "UF system solved"
    );
    Ok((solved, summary))
}
