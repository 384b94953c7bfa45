//! Feed, product and pass-through junction blocks.

use rc_core::EqId;
use rc_graph::PortKind;
use rc_model::Model;
use rc_props::{PropertyPackage, StateBlock};

use crate::common::equate_states;
use crate::error::ComponentResult;
use crate::unit::{UnitKind, UnitOp, UnitPort};

/// Source of material; its outlet state is fixed by the caller.
#[derive(Debug, Clone)]
pub struct Feed {
    name: String,
    ports: Vec<UnitPort>,
}

impl Feed {
    pub fn build(model: &mut Model, pkg: &PropertyPackage, name: &str) -> ComponentResult<Self> {
        let outlet = UnitPort::build(model, pkg, name, "outlet", PortKind::Outlet)?;
        Ok(Self {
            name: name.to_string(),
            ports: vec![outlet],
        })
    }

    pub fn outlet(&self) -> &StateBlock {
        &self.ports[0].state
    }
}

impl UnitOp for Feed {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> UnitKind {
        UnitKind::Feed
    }

    fn ports(&self) -> &[UnitPort] {
        &self.ports
    }

    fn equations(&self) -> &[EqId] {
        &[]
    }
}

/// Sink of material.
#[derive(Debug, Clone)]
pub struct Product {
    name: String,
    ports: Vec<UnitPort>,
}

impl Product {
    pub fn build(model: &mut Model, pkg: &PropertyPackage, name: &str) -> ComponentResult<Self> {
        let inlet = UnitPort::build(model, pkg, name, "inlet", PortKind::Inlet)?;
        Ok(Self {
            name: name.to_string(),
            ports: vec![inlet],
        })
    }

    pub fn inlet(&self) -> &StateBlock {
        &self.ports[0].state
    }
}

impl UnitOp for Product {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> UnitKind {
        UnitKind::Product
    }

    fn ports(&self) -> &[UnitPort] {
        &self.ports
    }

    fn equations(&self) -> &[EqId] {
        &[]
    }
}

/// Pass-through block: outlet state equals inlet state.
#[derive(Debug, Clone)]
pub struct StateJunction {
    name: String,
    ports: Vec<UnitPort>,
    eqs: Vec<EqId>,
}

impl StateJunction {
    pub fn build(model: &mut Model, pkg: &PropertyPackage, name: &str) -> ComponentResult<Self> {
        let inlet = UnitPort::build(model, pkg, name, "inlet", PortKind::Inlet)?;
        let outlet = UnitPort::build(model, pkg, name, "outlet", PortKind::Outlet)?;
        let eqs = equate_states(model, name, &outlet.state, &inlet.state);
        Ok(Self {
            name: name.to_string(),
            ports: vec![inlet, outlet],
            eqs,
        })
    }

    pub fn inlet(&self) -> &StateBlock {
        &self.ports[0].state
    }

    pub fn outlet(&self) -> &StateBlock {
        &self.ports[1].state
    }
}

impl UnitOp for StateJunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> UnitKind {
        UnitKind::StateJunction
    }

    fn ports(&self) -> &[UnitPort] {
        &self.ports
    }

    fn equations(&self) -> &[EqId] {
        &self.eqs
    }
}
