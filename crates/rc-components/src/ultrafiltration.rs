//! Ultrafiltration unit with fixed recovery and salt rejection.

use rc_core::{EqId, VarId};
use rc_graph::PortKind;
use rc_model::Model;
use rc_props::package::TAG_PRESSURE;
use rc_props::{PropertyPackage, StateBlock};
use serde::{Deserialize, Serialize};

use crate::common::{check_range, equate, fixed_tagged};
use crate::error::ComponentResult;
use crate::unit::{TAG_FRACTION, TAG_RECOVERY, UnitKind, UnitOp, UnitPort, write_free};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UfConfig {
    /// Fraction of inlet water leaving in the product
    pub recovery: f64,
    /// Fraction of inlet salt held back from the product
    #[serde(default)]
    pub salt_rejection: f64,
    /// Product-side pressure change [Pa]
    pub delta_p: f64,
}

#[derive(Debug, Clone)]
pub struct Ultrafiltration {
    name: String,
    ports: Vec<UnitPort>,
    eqs: Vec<EqId>,
    pub recovery: VarId,
    pub salt_rejection: VarId,
    pub delta_p: VarId,
}

impl Ultrafiltration {
    pub fn build(
        model: &mut Model,
        pkg: &PropertyPackage,
        name: &str,
        config: &UfConfig,
    ) -> ComponentResult<Self> {
        let rec = check_range(config.recovery, f64::MIN_POSITIVE, 1.0, "UF recovery")?;
        let rej = check_range(config.salt_rejection, 0.0, 1.0, "UF salt rejection")?;

        let inlet = UnitPort::build(model, pkg, name, "inlet", PortKind::Inlet)?;
        let product = UnitPort::build(model, pkg, name, "product", PortKind::Outlet)?;
        let byproduct = UnitPort::build(model, pkg, name, "byproduct", PortKind::Outlet)?;

        let recovery = fixed_tagged(model, format!("{name}.recovery_frac_mass_h2o"), rec, "-", TAG_RECOVERY)?;
        let salt_rejection = fixed_tagged(model, format!("{name}.rejection_frac_mass_nacl"), rej, "-", TAG_FRACTION)?;
        let delta_p = fixed_tagged(model, format!("{name}.deltaP"), config.delta_p, "Pa", TAG_PRESSURE)?;

        let (i, p, b) = (&inlet.state, &product.state, &byproduct.state);
        let mut eqs = Vec::with_capacity(8);

        let e = model.add_eq(
            format!("{name}.eq_product_h2o"),
            vec![p.flow_mass_h2o, recovery, i.flow_mass_h2o],
            |v| v[0] - v[1] * v[2],
        );
        model.set_eq_scale_var(e, i.flow_mass_h2o);
        eqs.push(e);

        let e = model.add_eq(
            format!("{name}.eq_product_nacl"),
            vec![p.flow_mass_nacl, recovery, salt_rejection, i.flow_mass_nacl],
            |v| v[0] - v[1] * (1.0 - v[2]) * v[3],
        );
        model.set_eq_scale_var(e, i.flow_mass_nacl);
        eqs.push(e);

        let e = model.add_eq(
            format!("{name}.eq_balance_h2o"),
            vec![i.flow_mass_h2o, p.flow_mass_h2o, b.flow_mass_h2o],
            |v| v[0] - v[1] - v[2],
        );
        model.set_eq_scale_var(e, i.flow_mass_h2o);
        eqs.push(e);

        let e = model.add_eq(
            format!("{name}.eq_balance_nacl"),
            vec![i.flow_mass_nacl, p.flow_mass_nacl, b.flow_mass_nacl],
            |v| v[0] - v[1] - v[2],
        );
        model.set_eq_scale_var(e, i.flow_mass_nacl);
        eqs.push(e);

        let e = model.add_eq(
            format!("{name}.eq_product_pressure"),
            vec![p.pressure, i.pressure, delta_p],
            |v| v[0] - v[1] - v[2],
        );
        model.set_eq_scale_var(e, p.pressure);
        eqs.push(e);

        eqs.push(equate(model, format!("{name}.eq_byproduct_pressure"), b.pressure, i.pressure));
        eqs.push(equate(model, format!("{name}.eq_product_temperature"), p.temperature, i.temperature));
        eqs.push(equate(model, format!("{name}.eq_byproduct_temperature"), b.temperature, i.temperature));

        Ok(Self {
            name: name.to_string(),
            ports: vec![inlet, product, byproduct],
            eqs,
            recovery,
            salt_rejection,
            delta_p,
        })
    }

    pub fn inlet(&self) -> &StateBlock {
        &self.ports[0].state
    }

    pub fn product(&self) -> &StateBlock {
        &self.ports[1].state
    }

    pub fn byproduct(&self) -> &StateBlock {
        &self.ports[2].state
    }
}

impl UnitOp for Ultrafiltration {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> UnitKind {
        UnitKind::Ultrafiltration
    }

    fn ports(&self) -> &[UnitPort] {
        &self.ports
    }

    fn equations(&self) -> &[EqId] {
        &self.eqs
    }

    fn guess_outlets(&self, model: &mut Model, pkg: &PropertyPackage) -> ComponentResult<()> {
        let s = pkg.read_state(model, self.inlet());
        let rec = model.value(self.recovery);
        let rej = model.value(self.salt_rejection);
        let dp = model.value(self.delta_p);
        let mw = rec * s.flow_mass_h2o;
        let ms = rec * (1.0 - rej) * s.flow_mass_nacl;
        write_free(model, self.product(), &[mw, ms, s.temperature, s.pressure + dp])?;
        write_free(
            model,
            self.byproduct(),
            &[s.flow_mass_h2o - mw, s.flow_mass_nacl - ms, s.temperature, s.pressure],
        )
    }
}
