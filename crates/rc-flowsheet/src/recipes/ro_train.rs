//! Multi-stage reverse-osmosis train.
//!
//! ```text
//! feed → stage1.pump → stage1.ro ─retentate→ stage2.pump → … → stageN.ro ─retentate→ disposal
//!                          └─permeate──────────────┴──────────────┴→ permeate_mixer → product
//! ```

use rc_components::{Feed, Mixer, Product, Pump, ReverseOsmosis0D};
use rc_core::constants::ATM_PA;
use rc_core::units::read::{to_gpm, to_kw};
use rc_core::units::{Concentration, Power, Pressure, VolumeRate, pa, watts};
use rc_model::LinearExpr;
use rc_project::{InputDocument, RoTrainDef};
use rc_props::PropertyPackage;
use rc_solver::Solver;

use super::{CostInputs, FEED, section};
use crate::builder::FlowsheetBuilder;
use crate::conditions::FeedConditions;
use crate::driver::Driver;
use crate::error::{FlowsheetError, FlowsheetResult};
use crate::flowsheet::{Assembled, Flowsheet, Solved};
use crate::report::{CostingSummary, Report};

pub const PREFIX: &str = "ro_train";
pub const DEFAULT_INPUT: &str = "wrd_inputs_8_19_21.yaml";
pub const PERMEATE_MIXER: &str = "ro_train.permeate_mixer";
pub const PRODUCT: &str = "ro_train.product";
pub const DISPOSAL: &str = "ro_train.disposal";
pub const TOTAL_PUMP_POWER: &str = "ro_train.total_pump_power";

pub fn default_feed() -> FeedConditions {
    FeedConditions::plant(2637.0, 0.5, 302.0, ATM_PA)
}

pub fn pump_block(stage: &str) -> String {
    format!("{PREFIX}.{stage}.pump")
}

pub fn ro_block(stage: &str) -> String {
    format!("{PREFIX}.{stage}.ro")
}

pub fn build(pkg: PropertyPackage, def: &RoTrainDef) -> FlowsheetResult<Flowsheet<Assembled>> {
    if def.stages.is_empty() {
        return Err(FlowsheetError::configuration("RO train has no stages"));
    }
    let mut b = FlowsheetBuilder::new(pkg);
    b.add(FEED, Feed::build)?;

    let mut power = LinearExpr::default();
    let mut upstream = (FEED.to_string(), "outlet");
    for stage in &def.stages {
        let pump_cfg = stage.pump.to_config().ok_or_else(|| {
            FlowsheetError::configuration(format!(
                "stage '{}' needs exactly one pump pressure spec",
                stage.name
            ))
        })?;
        let ro_cfg = stage.membrane.to_config();
        let (pump_name, ro_name) = (pump_block(&stage.name), ro_block(&stage.name));

        let pump = b.add(&pump_name, |m, p, n| Pump::build(m, p, n, &pump_cfg))?;
        power.push(pump.work_mechanical, 1.0);
        b.add(&ro_name, |m, p, n| ReverseOsmosis0D::build(m, p, n, &ro_cfg))?;

        b.connect((&upstream.0, upstream.1), (&pump_name, "inlet"))?;
        b.connect((&pump_name, "outlet"), (&ro_name, "inlet"))?;
        upstream = (ro_name, "retentate");
    }

    let stages = def.stages.len();
    b.add(PERMEATE_MIXER, |m, p, n| Mixer::build(m, p, n, stages))?;
    for (k, stage) in def.stages.iter().enumerate() {
        let inlet = format!("inlet_{}", k + 1);
        b.connect((&ro_block(&stage.name), "permeate"), (PERMEATE_MIXER, &inlet))?;
    }
    b.add(PRODUCT, Product::build)?;
    b.add(DISPOSAL, Product::build)?;
    b.connect((PERMEATE_MIXER, "outlet"), (PRODUCT, "inlet"))?;
    b.connect((&upstream.0, upstream.1), (DISPOSAL, "inlet"))?;

    b.add_expression(TOTAL_PUMP_POWER, power)?;
    b.build()
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageSummary {
    pub name: String,
    pub pump_power: Power,
    pub feed_pressure: Pressure,
    pub permeate_flow: VolumeRate,
    pub recovery: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoTrainSummary {
    pub feed: FeedConditions,
    pub total_pump_power: Power,
    pub product_flow: VolumeRate,
    pub product_conc: Concentration,
    pub disposal_flow: VolumeRate,
    pub stages: Vec<StageSummary>,
    pub costing: Option<CostingSummary>,
}

impl RoTrainSummary {
    pub fn report(&self) -> Report {
        let mut r = Report::new("RO Train Report");
        r.flow("Feed flow", self.feed.flow);
        for s in &self.stages {
            r.pressure(&format!("{} feed pressure", s.name), s.feed_pressure);
            r.power(&format!("{} pump power", s.name), s.pump_power);
            r.flow(&format!("{} permeate", s.name), s.permeate_flow);
            r.row(format!("{} recovery", s.name), format!("{:.4}", s.recovery), "-");
        }
        r.power("Total pump power", self.total_pump_power);
        r.flow("Product flow", self.product_flow);
        r.conc("Product concentration", self.product_conc);
        r.flow("Disposal flow", self.disposal_flow);
        if let Some(costing) = &self.costing {
            r.costing(costing);
        }
        r
    }
}

pub fn summarize(
    fs: &Flowsheet<Solved>,
    def: &RoTrainDef,
    feed: FeedConditions,
) -> FlowsheetResult<RoTrainSummary> {
    let missing = |what: &str| FlowsheetError::configuration(format!("solved RO train has no {what}"));
    let pkg = fs.package().params();

    let mut stages = Vec::with_capacity(def.stages.len());
    for stage in &def.stages {
        let (pump_name, ro_name) = (pump_block(&stage.name), ro_block(&stage.name));
        let pump = fs
            .unit(&pump_name)
            .and_then(|u| u.as_pump())
            .ok_or_else(|| missing(&pump_name))?;
        let ro = fs
            .unit(&ro_name)
            .and_then(|u| u.as_ro())
            .ok_or_else(|| missing(&ro_name))?;
        let inlet = fs
            .state_values(&ro_name, "inlet")
            .ok_or_else(|| missing(&ro_name))?;
        let permeate = fs
            .state_values(&ro_name, "permeate")
            .ok_or_else(|| missing(&ro_name))?;
        stages.push(StageSummary {
            name: stage.name.clone(),
            pump_power: watts(fs.value(pump.work_mechanical)),
            feed_pressure: pa(inlet.pressure),
            permeate_flow: permeate.flow_vol(pkg),
            recovery: fs.value(ro.recovery_vol),
        });
    }

    let product = fs.state_values(PRODUCT, "inlet").ok_or_else(|| missing(PRODUCT))?;
    let disposal = fs.state_values(DISPOSAL, "inlet").ok_or_else(|| missing(DISPOSAL))?;
    let total = fs.expression(TOTAL_PUMP_POWER).ok_or_else(|| missing(TOTAL_PUMP_POWER))?;

    Ok(RoTrainSummary {
        feed,
        total_pump_power: watts(total),
        product_flow: product.flow_vol(pkg),
        product_conc: product.conc_mass(pkg),
        disposal_flow: disposal.flow_vol(pkg),
        stages,
        costing: CostingSummary::from_flowsheet(fs),
    })
}

/// Assemble, drive and summarize the RO train described by `doc`.
///
/// With `costing`, stage pumps and membranes are costed and the LCOW is
/// taken on the combined permeate.
pub fn run<S: Solver>(
    driver: &Driver<S>,
    doc: &InputDocument,
    feed: FeedConditions,
    costing: bool,
) -> FlowsheetResult<(Flowsheet<Solved>, RoTrainSummary)> {
    let def = section(doc.ro_train.as_ref(), "ro_train")?;
    let fs = build(super::nacl_package(), def)?;
    let cost_inputs = costing.then(|| CostInputs::from_document(doc)).transpose()?;

    let solved = driver.run(fs, &[(FEED, feed)], |fs| {
        let Some(inputs) = &cost_inputs else {
            return Ok(());
        };
        let mut c = fs.attach_costing(&inputs.db, &inputs.params)?;
        for stage in &def.stages {
            c.pump(&pump_block(&stage.name), inputs.pump_cost_type)?;
            c.reverse_osmosis(&ro_block(&stage.name))?;
        }
        c.cost_process()?;
        c.add_lcow(PRODUCT)?;
        Ok(())
    })?;

    let summary = summarize(&solved, def, feed)?;
    tracing::info!(
        power_kw = to_kw(summary.total_pump_power),
        product_gpm = to_gpm(summary.product_flow),
        "RO train solved"
    );
    Ok((solved, summary))
}
