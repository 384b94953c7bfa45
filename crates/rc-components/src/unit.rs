//! The unit-operation interface.

use rc_core::EqId;
use rc_graph::PortKind;
use rc_model::{Model, ScalingDefaults};
use rc_props::{PropertyPackage, StateBlock};

use crate::error::ComponentResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Feed,
    Product,
    StateJunction,
    Pump,
    ReverseOsmosis,
    Ultrafiltration,
    UvAop,
    ChemicalAddition,
    DeepWellInjection,
    Separator,
    Mixer,
}

/// A unit port and the state variables behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitPort {
    pub name: String,
    pub kind: PortKind,
    pub state: StateBlock,
}

impl UnitPort {
    pub(crate) fn build(
        model: &mut Model,
        pkg: &PropertyPackage,
        unit: &str,
        name: &str,
        kind: PortKind,
    ) -> ComponentResult<Self> {
        let state = pkg.build_state(model, &format!("{unit}.{name}"))?;
        Ok(Self {
            name: name.to_string(),
            kind,
            state,
        })
    }
}

/// A unit model living inside a shared [`Model`].
///
/// Construction adds the unit's state blocks, variables and equations to
/// the model and fixes its design variables.
pub trait UnitOp {
    fn name(&self) -> &str;

    fn kind(&self) -> UnitKind;

    fn ports(&self) -> &[UnitPort];

    /// Equations owned by this unit.
    fn equations(&self) -> &[EqId];

    fn port(&self, name: &str) -> Option<&UnitPort> {
        self.ports().iter().find(|p| p.name == name)
    }

    /// Seed outlet values from the current inlet values before a local solve.
    fn guess_outlets(&self, model: &mut Model, pkg: &PropertyPackage) -> ComponentResult<()> {
        copy_inlet_to_outlets(self.ports(), model, pkg)
    }
}

/// Values of the first inlet copied onto every outlet.
pub fn copy_inlet_to_outlets(
    ports: &[UnitPort],
    model: &mut Model,
    pkg: &PropertyPackage,
) -> ComponentResult<()> {
    let Some(inlet) = ports.iter().find(|p| p.kind == PortKind::Inlet) else {
        return Ok(());
    };
    let values = pkg.read_state(model, &inlet.state);
    for out in ports.iter().filter(|p| p.kind == PortKind::Outlet) {
        write_free(model, &out.state, &values.as_array())?;
    }
    Ok(())
}

/// Write values into the non-fixed variables of a state.
pub(crate) fn write_free(model: &mut Model, sb: &StateBlock, values: &[f64; 4]) -> ComponentResult<()> {
    for (id, v) in sb.vars().into_iter().zip(values) {
        if !model.is_fixed(id) {
            model.set_value(id, *v)?;
        }
    }
    Ok(())
}

pub const TAG_WORK: &str = "work";
pub const TAG_EFFICIENCY: &str = "efficiency";
pub const TAG_AREA: &str = "area";
pub const TAG_A_COMP: &str = "A_comp";
pub const TAG_B_COMP: &str = "B_comp";
pub const TAG_RECOVERY: &str = "recovery";
pub const TAG_POWER_KW: &str = "power_kw";
pub const TAG_FLOW_MGD: &str = "flow_mgd";
pub const TAG_DOSE: &str = "dose";
pub const TAG_SOLN_MASS: &str = "flow_mass_soln";
pub const TAG_SOLN_VOL: &str = "flow_vol_soln";
pub const TAG_ELECTRICITY: &str = "electricity";
pub const TAG_FRACTION: &str = "fraction";

/// Default scaling factors for unit-model variables.
pub fn default_scaling() -> ScalingDefaults {
    ScalingDefaults::new()
        .with(TAG_WORK, 1e-5)
        .with(TAG_EFFICIENCY, 1.0)
        .with(TAG_AREA, 1e-4)
        .with(TAG_A_COMP, 1e12)
        .with(TAG_B_COMP, 1e8)
        .with(TAG_RECOVERY, 1.0)
        .with(TAG_POWER_KW, 1e-2)
        .with(TAG_FLOW_MGD, 1.0)
        .with(TAG_DOSE, 1e3)
        .with(TAG_SOLN_MASS, 1e2)
        .with(TAG_SOLN_VOL, 1e5)
        .with(TAG_ELECTRICITY, 1e-1)
        .with(TAG_FRACTION, 1.0)
}
