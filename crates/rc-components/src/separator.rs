//! Stream splitter with fixed split fractions.

use rc_core::{EqId, VarId};
use rc_graph::PortKind;
use rc_model::Model;
use rc_props::{PropertyPackage, StateBlock};

use crate::common::{check_range, equate, fixed_tagged};
use crate::error::{ComponentError, ComponentResult};
use crate::unit::{TAG_FRACTION, UnitKind, UnitOp, UnitPort, write_free};

/// Allowed deviation of the split fractions from summing to one.
pub const SPLIT_SUM_TOLERANCE: f64 = 1e-6;

/// Check that `fractions` is a usable split: non-empty, each in [0, 1],
/// summing to one.
pub fn validate_split_fractions(fractions: &[f64]) -> ComponentResult<()> {
    if fractions.is_empty() {
        return Err(ComponentError::InvalidArg {
            what: "split fractions must not be empty".into(),
        });
    }
    for f in fractions {
        check_range(*f, 0.0, 1.0, "split fraction")?;
    }
    let sum: f64 = fractions.iter().sum();
    if (sum - 1.0).abs() > SPLIT_SUM_TOLERANCE {
        return Err(ComponentError::InvalidArg {
            what: format!("split fractions sum to {sum}, expected 1"),
        });
    }
    Ok(())
}

/// Splits one inlet across `outlet_1..outlet_n` in fixed fractions. Outlets
/// share the inlet composition, temperature and pressure.
#[derive(Debug, Clone)]
pub struct Separator {
    name: String,
    ports: Vec<UnitPort>,
    eqs: Vec<EqId>,
    pub split_fractions: Vec<VarId>,
}

impl Separator {
    pub fn build(
        model: &mut Model,
        pkg: &PropertyPackage,
        name: &str,
        fractions: &[f64],
    ) -> ComponentResult<Self> {
        validate_split_fractions(fractions)?;

        let inlet = UnitPort::build(model, pkg, name, "inlet", PortKind::Inlet)?;
        let mut ports = vec![inlet];
        let mut split_fractions = Vec::with_capacity(fractions.len());
        let mut eqs = Vec::with_capacity(4 * fractions.len());

        for (k, f) in fractions.iter().enumerate() {
            let n = k + 1;
            let outlet = UnitPort::build(model, pkg, name, &format!("outlet_{n}"), PortKind::Outlet)?;
            let frac = fixed_tagged(model, format!("{name}.split_fraction_{n}"), *f, "-", TAG_FRACTION)?;
            let (i, o) = (&ports[0].state, &outlet.state);

            let e = model.add_eq(
                format!("{name}.eq_split_h2o_{n}"),
                vec![o.flow_mass_h2o, frac, i.flow_mass_h2o],
                |v| v[0] - v[1] * v[2],
            );
            model.set_eq_scale_var(e, i.flow_mass_h2o);
            eqs.push(e);

            let e = model.add_eq(
                format!("{name}.eq_split_nacl_{n}"),
                vec![o.flow_mass_nacl, frac, i.flow_mass_nacl],
                |v| v[0] - v[1] * v[2],
            );
            model.set_eq_scale_var(e, i.flow_mass_nacl);
            eqs.push(e);

            eqs.push(equate(model, format!("{name}.eq_temperature_{n}"), o.temperature, i.temperature));
            eqs.push(equate(model, format!("{name}.eq_pressure_{n}"), o.pressure, i.pressure));

            split_fractions.push(frac);
            ports.push(outlet);
        }

        Ok(Self {
            name: name.to_string(),
            ports,
            eqs,
            split_fractions,
        })
    }

    pub fn inlet(&self) -> &StateBlock {
        &self.ports[0].state
    }

    /// Outlet `n`, counted from 1.
    pub fn outlet(&self, n: usize) -> Option<&StateBlock> {
        if n == 0 {
            return None;
        }
        self.ports.get(n).map(|p| &p.state)
    }

    pub fn num_outlets(&self) -> usize {
        self.ports.len() - 1
    }
}

impl UnitOp for Separator {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> UnitKind {
        UnitKind::Separator
    }

    fn ports(&self) -> &[UnitPort] {
        &self.ports
    }

    fn equations(&self) -> &[EqId] {
        &self.eqs
    }

    fn guess_outlets(&self, model: &mut Model, pkg: &PropertyPackage) -> ComponentResult<()> {
        let s = pkg.read_state(model, self.inlet());
        for (port, frac) in self.ports[1..].iter().zip(&self.split_fractions) {
            let f = model.value(*frac);
            write_free(
                model,
                &port.state,
                &[f * s.flow_mass_h2o, f * s.flow_mass_nacl, s.temperature, s.pressure],
            )?;
        }
        Ok(())
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
    fn fractions_must_sum_to_one() {
        assert!(validate_split_fractions(&[0.4, 0.4, 0.2]).is_ok());
        assert!(validate_split_fractions(&[0.4, 0.4, 0.4]).is_err());
        assert!(validate_split_fractions(&[0.5, 0.5 + 1e-9]).is_ok());
        assert!(validate_split_fractions(&[]).is_err());
        assert!(validate_split_fractions(&[1.2, -0.2]).is_err());
    }

    #[test]
    fn three_way_split() {
        let pkg = PropertyPackage::nacl(PackageId(0));
        let mut m = Model::new();
        let sep = Separator::build(&mut m, &pkg, "split", &[0.4, 0.4, 0.2]).unwrap();
        assert_eq!(sep.num_outlets(), 3);
        assert_eq!(sep.equations().len(), 12);
        assert!(sep.outlet(0).is_none());

        let feed =
            StateValues::from_flow_and_conc(gpm(10_416.0), g_per_l(0.5), k(298.0), pa(101_325.0)).unwrap();
        pkg.fix_state(&mut m, sep.inlet(), &feed).unwrap();
        assert_eq!(m.degrees_of_freedom(), 0);
        NewtonSolver::default().solve(&mut m).unwrap();

        let third = sep.outlet(3).unwrap();
        let s = pkg.read_state(&m, third);
        assert!((s.flow_mass_h2o - 0.2 * feed.flow_mass_h2o).abs() < 1e-9);
        assert!((s.pressure - feed.pressure).abs() < 1e-6);
    }
}
