//! One ultrafiltration train: feed junction → pump → UF unit → product
//! junction, with the UF byproduct leaving through a disposal junction.

use rc_components::{Feed, Product, Pump, StateJunction, Ultrafiltration};
use rc_core::VarId;
use rc_core::constants::ATM_PA;
use rc_core::units::read::to_kw;
use rc_core::units::{Power, VolumeRate, watts};
use rc_model::LinearExpr;
use rc_project::{InputDocument, UfTrainDef};
use rc_props::PropertyPackage;
use rc_solver::Solver;

use super::{CostInputs, DISPOSAL, FEED, PRODUCT, section};
use crate::builder::FlowsheetBuilder;
use crate::conditions::FeedConditions;
use crate::driver::Driver;
use crate::error::{FlowsheetError, FlowsheetResult};
use crate::flowsheet::{Assembled, Flowsheet, Solved};
use crate::report::{CostingSummary, Report};

pub const PREFIX: &str = "uf_train";
pub const DEFAULT_INPUT: &str = "wrd_inputs_3_13_21.yaml";

pub fn default_feed() -> FeedConditions {
    FeedConditions::plant(2452.0, 0.5, 302.0, ATM_PA)
}

/// Block names of one train under `prefix`.
#[derive(Debug, Clone, PartialEq)]
pub struct UfTrainBlocks {
    pub feed: String,
    pub pump: String,
    pub unit: String,
    pub product: String,
    pub disposal: String,
    pub work_mechanical: VarId,
}

impl UfTrainBlocks {
    pub fn power_expression(prefix: &str) -> String {
        format!("{prefix}.pump_power")
    }
}

/// Add a train's blocks under `prefix` to `b`; the train is entered at
/// `{prefix}.feed` and left at `{prefix}.product` and `{prefix}.disposal`.
pub fn add_uf_train(
    b: &mut FlowsheetBuilder,
    prefix: &str,
    def: &UfTrainDef,
) -> FlowsheetResult<UfTrainBlocks> {
    let pump_cfg = def.pump.to_config().ok_or_else(|| {
        FlowsheetError::configuration(format!("{prefix}: pump needs exactly one pressure spec"))
    })?;
    let unit_cfg = def.unit.to_config();
    let names = [
        format!("{prefix}.feed"),
        format!("{prefix}.pump"),
        format!("{prefix}.unit"),
        format!("{prefix}.product"),
        format!("{prefix}.disposal"),
    ];
    let [feed, pump_name, unit, product, disposal] = names;

    b.add(&feed, StateJunction::build)?;
    let pump = b.add(&pump_name, |m, p, n| Pump::build(m, p, n, &pump_cfg))?;
    b.add(&unit, |m, p, n| Ultrafiltration::build(m, p, n, &unit_cfg))?;
    b.add(&product, StateJunction::build)?;
    b.add(&disposal, StateJunction::build)?;

    b.connect((&feed, "outlet"), (&pump_name, "inlet"))?;
    b.connect((&pump_name, "outlet"), (&unit, "inlet"))?;
    b.connect((&unit, "product"), (&product, "inlet"))?;
    b.connect((&unit, "byproduct"), (&disposal, "inlet"))?;
    b.add_expression(
        UfTrainBlocks::power_expression(prefix),
        LinearExpr::sum([pump.work_mechanical]),
    )?;

    Ok(UfTrainBlocks {
        feed,
        pump: pump_name,
        unit,
        product,
        disposal,
        work_mechanical: pump.work_mechanical,
    })
}

pub fn build(pkg: PropertyPackage, def: &UfTrainDef) -> FlowsheetResult<(Flowsheet<Assembled>, UfTrainBlocks)> {
    let mut b = FlowsheetBuilder::new(pkg);
    b.add(FEED, Feed::build)?;
    let train = add_uf_train(&mut b, PREFIX, def)?;
    b.add(PRODUCT, Product::build)?;
    b.add(DISPOSAL, Product::build)?;
    b.connect((FEED, "outlet"), (&train.feed, "inlet"))?;
    b.connect((&train.product, "outlet"), (PRODUCT, "inlet"))?;
    b.connect((&train.disposal, "outlet"), (DISPOSAL, "inlet"))?;
    Ok((b.build()?, train))
}

#[derive(Debug, Clone, PartialEq)]
pub struct UfTrainSummary {
    pub feed: FeedConditions,
    pub pump_power: Power,
    pub product_flow: VolumeRate,
    pub disposal_flow: VolumeRate,
    pub costing: Option<CostingSummary>,
}

impl UfTrainSummary {
    pub fn report(&self) -> Report {
        let mut r = Report::new("UF Train Report");
        r.flow("Feed flow", self.feed.flow)
            .power("Pump power", self.pump_power)
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
    costing: bool,
) -> FlowsheetResult<(Flowsheet<Solved>, UfTrainSummary)> {
    let def = section(doc.uf_train.as_ref(), "uf_train")?;
    let (fs, train) = build(super::nacl_package(), def)?;
    let cost_inputs = costing.then(|| CostInputs::from_document(doc)).transpose()?;

    let solved = driver.run(fs, &[(FEED, feed)], |fs| {
        let Some(inputs) = &cost_inputs else {
            return Ok(());
        };
        let mut c = fs.attach_costing(&inputs.db, &inputs.params)?;
        c.pump(&train.pump, inputs.pump_cost_type)?;
        c.cost_process()?;
        c.add_lcow(PRODUCT)?;
        Ok(())
    })?;

    let pkg = solved.package().params();
    let missing = |block: &str| FlowsheetError::configuration(format!("solved UF train has no {block}"));
    let product = solved.state_values(PRODUCT, "inlet").ok_or_else(|| missing(PRODUCT))?;
    let disposal = solved.state_values(DISPOSAL, "inlet").ok_or_else(|| missing(DISPOSAL))?;
    let summary = UfTrainSummary {
        feed,
        pump_power: watts(solved.value(train.work_mechanical)),
        product_flow: product.flow_vol(pkg),
        disposal_flow: disposal.flow_vol(pkg),
        costing: CostingSummary::from_flowsheet(&solved),
    };
    tracing::info!(power_kw = to_kw(summary.pump_power), "UF train solved");
    Ok((solved, summary))
}
