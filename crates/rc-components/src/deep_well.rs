//! Brine disposal by deep-well injection.

use rc_core::{EqId, VarId};
use rc_graph::PortKind;
use rc_model::Model;
use rc_props::{PropertyPackage, StateBlock};

use crate::error::ComponentResult;
use crate::unit::{UnitKind, UnitOp, UnitPort};

/// Terminal block; its injected volume is what costing charges for.
#[derive(Debug, Clone)]
pub struct DeepWellInjection {
    name: String,
    ports: Vec<UnitPort>,
    eqs: Vec<EqId>,
    pub flow_vol: VarId,
}

impl DeepWellInjection {
    pub fn build(model: &mut Model, pkg: &PropertyPackage, name: &str) -> ComponentResult<Self> {
        let inlet = UnitPort::build(model, pkg, name, "inlet", PortKind::Inlet)?;
        let before = model.num_eqs();
        let flow_vol = pkg.touch_flow_vol(model, &inlet.state)?;
        let eqs = model.eq_ids_since(before).collect();
        Ok(Self {
            name: name.to_string(),
            ports: vec![inlet],
            eqs,
            flow_vol,
        })
    }

    pub fn inlet(&self) -> &StateBlock {
        &self.ports[0].state
    }
}

impl UnitOp for DeepWellInjection {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> UnitKind {
        UnitKind::DeepWellInjection
    }

    fn ports(&self) -> &[UnitPort] {
        &self.ports
    }

    fn equations(&self) -> &[EqId] {
        &self.eqs
    }
}
