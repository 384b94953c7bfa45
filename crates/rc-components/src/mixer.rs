//! Stream mixer.

use rc_core::EqId;
use rc_graph::PortKind;
use rc_model::Model;
use rc_props::{PropertyPackage, StateBlock};

use crate::error::{ComponentError, ComponentResult};
use crate::unit::{UnitKind, UnitOp, UnitPort, write_free};

/// Combines `inlet_1..inlet_n` into one outlet. Temperature and pressure
/// are mass-flow weighted averages of the inlets.
#[derive(Debug, Clone)]
pub struct Mixer {
    name: String,
    ports: Vec<UnitPort>,
    eqs: Vec<EqId>,
}

impl Mixer {
    pub fn build(
        model: &mut Model,
        pkg: &PropertyPackage,
        name: &str,
        inlets: usize,
    ) -> ComponentResult<Self> {
        if inlets == 0 {
            return Err(ComponentError::InvalidArg {
                what: format!("{name}: mixer needs at least one inlet"),
            });
        }
        let mut ports = Vec::with_capacity(inlets + 1);
        for n in 1..=inlets {
            ports.push(UnitPort::build(model, pkg, name, &format!("inlet_{n}"), PortKind::Inlet)?);
        }
        let outlet = UnitPort::build(model, pkg, name, "outlet", PortKind::Outlet)?;
        let ins: Vec<&StateBlock> = ports.iter().map(|p| &p.state).collect();
        let o = &outlet.state;
        let mut eqs = Vec::with_capacity(4);

        let mut vars = vec![o.flow_mass_h2o];
        vars.extend(ins.iter().map(|s| s.flow_mass_h2o));
        let e = model.add_eq(format!("{name}.eq_mix_h2o"), vars, |v| {
            v[0] - v[1..].iter().sum::<f64>()
        });
        model.set_eq_scale_var(e, o.flow_mass_h2o);
        eqs.push(e);

        let mut vars = vec![o.flow_mass_nacl];
        vars.extend(ins.iter().map(|s| s.flow_mass_nacl));
        let e = model.add_eq(format!("{name}.eq_mix_nacl"), vars, |v| {
            v[0] - v[1..].iter().sum::<f64>()
        });
        model.set_eq_scale_var(e, o.flow_mass_nacl);
        eqs.push(e);

        // v: out, then (h2o, nacl, x) per inlet
        for (label, out, pick) in [
            ("temperature", o.temperature, 2usize),
            ("pressure", o.pressure, 3usize),
        ] {
            let mut vars = vec![out];
            for s in &ins {
                vars.extend([s.flow_mass_h2o, s.flow_mass_nacl, s.vars()[pick]]);
            }
            let e = model.add_eq(format!("{name}.eq_mix_{label}"), vars, |v| {
                let (mut total, mut weighted) = (0.0, 0.0);
                for c in v[1..].chunks_exact(3) {
                    let m = c[0] + c[1];
                    total += m;
                    weighted += m * c[2];
                }
                v[0] * total - weighted
            });
            model.set_eq_scale_var(e, out);
            eqs.push(e);
        }

        ports.push(outlet);
        Ok(Self {
            name: name.to_string(),
            ports,
            eqs,
        })
    }

    /// Inlet `n`, counted from 1.
    pub fn inlet(&self, n: usize) -> Option<&StateBlock> {
        if n == 0 || n >= self.ports.len() {
            return None;
        }
        Some(&self.ports[n - 1].state)
    }

    pub fn outlet(&self) -> &StateBlock {
        &self.ports[self.ports.len() - 1].state
    }

    pub fn num_inlets(&self) -> usize {
        self.ports.len() - 1
    }
}

impl UnitOp for Mixer {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> UnitKind {
        UnitKind::Mixer
    }

    fn ports(&self) -> &[UnitPort] {
        &self.ports
    }

    fn equations(&self) -> &[EqId] {
        &self.eqs
    }

    fn guess_outlets(&self, model: &mut Model, pkg: &PropertyPackage) -> ComponentResult<()> {
        let (mut mw, mut ms, mut mt, mut mp) = (0.0, 0.0, 0.0, 0.0);
        for port in &self.ports[..self.ports.len() - 1] {
            let s = pkg.read_state(model, &port.state);
            let m = s.flow_mass_h2o + s.flow_mass_nacl;
            mw += s.flow_mass_h2o;
            ms += s.flow_mass_nacl;
            mt += m * s.temperature;
            mp += m * s.pressure;
        }
        let total = mw + ms;
        if total <= 0.0 {
            return Ok(());
        }
        write_free(model, self.outlet(), &[mw, ms, mt / total, mp / total])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::PackageId;
    use rc_core::units::{g_per_l, gpm, k, pa};
    use rc_props::StateValues;
    use rc_solver::{NewtonSolver, Solver};

    #[test]
    fn weighted_temperature_and_pressure() {
        let pkg = PropertyPackage::nacl(PackageId(0));
        let mut m = Model::new();
        let mix = Mixer::build(&mut m, &pkg, "mix", 2).unwrap();
        assert_eq!(mix.num_inlets(), 2);
        assert!(mix.inlet(3).is_none());

        let a = StateValues::from_flow_and_conc(gpm(300.0), g_per_l(0.0), k(300.0), pa(2.0e5)).unwrap();
        let b = StateValues::from_flow_and_conc(gpm(100.0), g_per_l(0.0), k(280.0), pa(1.0e5)).unwrap();
        pkg.fix_state(&mut m, mix.inlet(1).unwrap(), &a).unwrap();
        pkg.fix_state(&mut m, mix.inlet(2).unwrap(), &b).unwrap();
        assert_eq!(m.degrees_of_freedom(), 0);

        mix.guess_outlets(&mut m, &pkg).unwrap();
        let report = NewtonSolver::default().solve(&mut m).unwrap();
        assert!(report.status.is_optimal());

        let out = pkg.read_state(&m, mix.outlet());
        assert!((out.flow_mass_h2o - a.flow_mass_h2o - b.flow_mass_h2o).abs() < 1e-9);
        assert!((out.temperature - 295.0).abs() < 1e-6);
        assert!((out.pressure - 1.75e5).abs() < 1e-3);
    }

    #[test]
    fn zero_inlets_rejected() {
        let pkg = PropertyPackage::nacl(PackageId(0));
        let mut m = Model::new();
        assert!(Mixer::build(&mut m, &pkg, "mix", 0).is_err());
    }
}
