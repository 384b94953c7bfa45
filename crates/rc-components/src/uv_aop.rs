//! UV advanced-oxidation reactor with surrogate power demand.

use std::fmt;
use std::sync::Arc;

use rc_core::units::mgd;
use rc_core::units::read::to_m3ps;
use rc_core::{EqId, VarId};
use rc_graph::PortKind;
use rc_model::Model;
use rc_props::{PropertyPackage, StateBlock};
use rc_surrogate::Surrogate;

use crate::common::{equate_states, tagged};
use crate::error::{ComponentError, ComponentResult};
use crate::unit::{TAG_FLOW_MGD, TAG_POWER_KW, UnitKind, UnitOp, UnitPort, copy_inlet_to_outlets};

pub const DEFAULT_POWER_OUTPUT: &str = "UV1_kW";

/// Pass-through reactor whose power draw comes from a one-input surrogate
/// of flow in MGD.
#[derive(Clone)]
pub struct UvAop {
    name: String,
    ports: Vec<UnitPort>,
    eqs: Vec<EqId>,
    surrogate: Arc<dyn Surrogate>,
    output: usize,
    pub flow_mgd: VarId,
    pub power_kw: VarId,
}

impl fmt::Debug for UvAop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UvAop")
            .field("name", &self.name)
            .field("surrogate_inputs", &self.surrogate.input_labels())
            .field("output", &self.output)
            .finish()
    }
}

impl UvAop {
    pub fn build(
        model: &mut Model,
        pkg: &PropertyPackage,
        name: &str,
        surrogate: Arc<dyn Surrogate>,
        output_label: &str,
    ) -> ComponentResult<Self> {
        if surrogate.input_labels().len() != 1 {
            return Err(ComponentError::InvalidArg {
                what: format!(
                    "{name}: power surrogate must take one input, found {}",
                    surrogate.input_labels().len()
                ),
            });
        }
        let output = surrogate.output_index(output_label).ok_or_else(|| ComponentError::Missing {
            what: format!("{name}: surrogate has no output named {output_label}"),
        })?;

        let inlet = UnitPort::build(model, pkg, name, "inlet", PortKind::Inlet)?;
        let outlet = UnitPort::build(model, pkg, name, "outlet", PortKind::Outlet)?;
        let mut eqs = equate_states(model, name, &outlet.state, &inlet.state);

        let flow_mgd = tagged(model, format!("{name}.flow_mgd"), 1.0, "MGD", TAG_FLOW_MGD)?;
        model.set_bounds(flow_mgd, Some(0.0), None)?;
        let power_kw = tagged(model, format!("{name}.power_consumption"), 0.0, "kW", TAG_POWER_KW)?;
        model.set_bounds(power_kw, Some(0.0), None)?;

        let m3ps_per_mgd = to_m3ps(mgd(1.0));
        let params = *pkg.params();
        let i = &inlet.state;
        let e = model.add_eq(
            format!("{name}.eq_flow_mgd"),
            vec![flow_mgd, i.flow_mass_h2o, i.flow_mass_nacl],
            move |v| v[0] * m3ps_per_mgd - params.flow_vol(v[1], v[2]),
        );
        model.set_eq_scale(e, 1e1);
        eqs.push(e);

        let s = Arc::clone(&surrogate);
        let e = model.add_eq(
            format!("{name}.eq_power_use"),
            vec![power_kw, flow_mgd],
            move |v| match s.evaluate(&v[1..2]) {
                Ok(out) => v[0] - out[output],
                Err(_) => f64::NAN,
            },
        );
        model.set_eq_scale_var(e, power_kw);
        eqs.push(e);

        Ok(Self {
            name: name.to_string(),
            ports: vec![inlet, outlet],
            eqs,
            surrogate,
            output,
            flow_mgd,
            power_kw,
        })
    }

    pub fn inlet(&self) -> &StateBlock {
        &self.ports[0].state
    }

    pub fn outlet(&self) -> &StateBlock {
        &self.ports[1].state
    }

    pub fn surrogate(&self) -> &dyn Surrogate {
        self.surrogate.as_ref()
    }
}

impl UnitOp for UvAop {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> UnitKind {
        UnitKind::UvAop
    }

    fn ports(&self) -> &[UnitPort] {
        &self.ports
    }

    fn equations(&self) -> &[EqId] {
        &self.eqs
    }

    fn guess_outlets(&self, model: &mut Model, pkg: &PropertyPackage) -> ComponentResult<()> {
        copy_inlet_to_outlets(&self.ports, model, pkg)?;
        let s = pkg.read_state(model, self.inlet());
        let q = pkg.params().flow_vol(s.flow_mass_h2o, s.flow_mass_nacl);
        let flow = q / to_m3ps(mgd(1.0));
        let (lo, hi) = self.surrogate.input_bounds()[0];
        if flow < lo || flow > hi {
            tracing::warn!(
                unit = %self.name,
                flow_mgd = flow,
                lo,
                hi,
                "UV flow outside surrogate training range"
            );
        }
        model.set_value(self.flow_mgd, flow)?;
        let power = self.surrogate.evaluate(&[flow])?[self.output];
        model.set_value(self.power_kw, power.max(0.0))?;
        Ok(())
    }
}
