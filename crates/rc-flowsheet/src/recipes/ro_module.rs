//! A single RO stage between measured feed and concentrate pressures, used
//! to back out membrane permeabilities from plant readings.

use rc_components::{Feed, Product, ReverseOsmosis0D, RoConfig};
use rc_core::units::psi;
use rc_core::units::read::to_pa;
use rc_project::{InputDocument, MembraneDef};
use rc_props::PropertyPackage;
use rc_solver::Solver;

use super::{DISPOSAL, FEED, PRODUCT};
use crate::builder::FlowsheetBuilder;
use crate::conditions::FeedConditions;
use crate::driver::Driver;
use crate::error::{FlowsheetError, FlowsheetResult};
use crate::flowsheet::{Assembled, Flowsheet, Solved};

pub const UNIT: &str = "ro_module.unit";
/// Readings are taken at this temperature [K].
pub const MODULE_TEMPERATURE_K: f64 = 298.0;

/// One stage's instrument readings, in plant units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageReading {
    pub feed_flow_gpm: f64,
    pub feed_conc_g_per_l: f64,
    /// [psig]
    pub feed_pressure: f64,
    /// [psig]
    pub concentrate_pressure: f64,
    pub permeate_flow_gpm: f64,
    pub permeate_conc_g_per_l: f64,
}

impl StageReading {
    pub fn recovery(&self) -> f64 {
        self.permeate_flow_gpm / self.feed_flow_gpm
    }

    pub fn feed(&self) -> FeedConditions {
        FeedConditions::plant_gauge(
            self.feed_flow_gpm,
            self.feed_conc_g_per_l,
            MODULE_TEMPERATURE_K,
            self.feed_pressure,
        )
    }
}

/// Water and salt permeability [m/(s·Pa)], [m/s].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MembraneProps {
    pub a_comp: f64,
    pub b_comp: f64,
}

/// Membrane of `stage` (counted from 1): the `ro_module` section wins,
/// otherwise the matching RO-train stage is used.
pub fn membrane_for_stage(doc: &InputDocument, stage: usize) -> FlowsheetResult<MembraneDef> {
    if let Some(module) = &doc.ro_module {
        return Ok(module.membrane);
    }
    let train = super::section(doc.ro_train.as_ref(), "ro_train")?;
    stage
        .checked_sub(1)
        .and_then(|k| train.stages.get(k))
        .map(|s| s.membrane)
        .ok_or_else(|| {
            FlowsheetError::configuration(format!(
                "stage {stage} not in RO train of {} stages",
                train.stages.len()
            ))
        })
}

pub fn build(pkg: PropertyPackage, config: &RoConfig) -> FlowsheetResult<(Flowsheet<Assembled>, ReverseOsmosis0D)> {
    let mut b = FlowsheetBuilder::new(pkg);
    b.add(FEED, Feed::build)?;
    let ro = b.add(UNIT, |m, p, n| ReverseOsmosis0D::build(m, p, n, config))?;
    b.add(PRODUCT, Product::build)?;
    b.add(DISPOSAL, Product::build)?;
    b.connect((FEED, "outlet"), (UNIT, "inlet"))?;
    b.connect((UNIT, "permeate"), (PRODUCT, "inlet"))?;
    b.connect((UNIT, "retentate"), (DISPOSAL, "inlet"))?;
    Ok((b.build()?, ro))
}

/// Solve the stage forward with the membrane's permeabilities; the pressure
/// drop is taken from the readings.
pub fn solve_module<S: Solver>(
    driver: &Driver<S>,
    membrane: &MembraneDef,
    reading: &StageReading,
) -> FlowsheetResult<(Flowsheet<Solved>, ReverseOsmosis0D)> {
    let config = RoConfig {
        delta_p: to_pa(psi(reading.concentrate_pressure - reading.feed_pressure)),
        ..membrane.to_config()
    };
    let (fs, ro) = build(super::nacl_package(), &config)?;
    let solved = driver.run_plain(fs, &[(FEED, reading.feed())])?;
    Ok((solved, ro))
}

/// Swap A and B for the measured recovery and permeate concentration and
/// solve again from the forward solution.
pub fn invert<S: Solver>(
    driver: &Driver<S>,
    solved: Flowsheet<Solved>,
    ro: &ReverseOsmosis0D,
    reading: &StageReading,
) -> FlowsheetResult<(Flowsheet<Solved>, MembraneProps)> {
    let recovery = reading.recovery();
    if !(recovery > 0.0 && recovery < 1.0) {
        return Err(FlowsheetError::configuration(format!(
            "measured recovery {recovery} is outside (0, 1)"
        )));
    }
    let resolved = driver.resolve(solved, |fs| {
        fs.unfix(ro.a_comp);
        fs.unfix(ro.b_comp);
        fs.fix(ro.recovery_vol, recovery)?;
        // g/L and kg/m³ coincide
        fs.fix(ro.conc_mass_permeate, reading.permeate_conc_g_per_l)?;
        Ok(())
    })?;
    let props = MembraneProps {
        a_comp: resolved.value(ro.a_comp),
        b_comp: resolved.value(ro.b_comp),
    };
    Ok((resolved, props))
}

/// Forward solve then inversion for one reading.
pub fn membrane_props<S: Solver>(
    driver: &Driver<S>,
    membrane: &MembraneDef,
    reading: &StageReading,
) -> FlowsheetResult<MembraneProps> {
    let (solved, ro) = solve_module(driver, membrane, reading)?;
    let (_, props) = invert(driver, solved, &ro, reading)?;
    tracing::debug!(a = props.a_comp, b = props.b_comp, "inverted membrane properties");
    Ok(props)
}
