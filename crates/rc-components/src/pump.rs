//! Pump component model.

use rc_core::{EqId, VarId};
use rc_graph::PortKind;
use rc_model::Model;
use rc_props::{PropertyPackage, StateBlock};
use serde::{Deserialize, Serialize};

use crate::common::{check_range, equate, fixed_tagged, tagged};
use crate::error::{ComponentError, ComponentResult};
use crate::unit::{TAG_EFFICIENCY, TAG_WORK, UnitKind, UnitOp, UnitPort, write_free};

/// How the pump's pressure rise is specified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PumpSpec {
    /// Absolute outlet pressure [Pa]
    OutletPressure { value: f64 },
    /// Pressure rise [Pa]
    DeltaP { value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PumpConfig {
    /// Overall efficiency (0 < eta <= 1)
    pub efficiency: f64,
    pub spec: PumpSpec,
}

/// Isothermal liquid pump.
///
/// ## Model
///
/// ```text
/// P_out = P_in + ΔP
/// W · η = Q_in · ΔP
/// ```
///
/// Component flows and temperature pass through unchanged. `W` is the
/// mechanical work drawn from the motor [W].
#[derive(Debug, Clone)]
pub struct Pump {
    name: String,
    ports: Vec<UnitPort>,
    eqs: Vec<EqId>,
    pub work_mechanical: VarId,
    pub efficiency: VarId,
    pub delta_p: VarId,
}

impl Pump {
    pub fn build(
        model: &mut Model,
        pkg: &PropertyPackage,
        name: &str,
        config: &PumpConfig,
    ) -> ComponentResult<Self> {
        let eta = check_range(config.efficiency, f64::MIN_POSITIVE, 1.0, "pump efficiency")?;

        let inlet = UnitPort::build(model, pkg, name, "inlet", PortKind::Inlet)?;
        let outlet = UnitPort::build(model, pkg, name, "outlet", PortKind::Outlet)?;
        let work = tagged(model, format!("{name}.work_mechanical"), 0.0, "W", TAG_WORK)?;
        let efficiency = fixed_tagged(model, format!("{name}.efficiency_pump"), eta, "-", TAG_EFFICIENCY)?;
        let delta_p = model.add_var(format!("{name}.deltaP"), 0.0, "Pa")?;
        model.set_tag(delta_p, rc_props::package::TAG_PRESSURE);

        match config.spec {
            PumpSpec::OutletPressure { value } => {
                if !(value.is_finite() && value > 0.0) {
                    return Err(ComponentError::InvalidArg {
                        what: format!("{name}: outlet pressure must be positive"),
                    });
                }
                model.fix(outlet.state.pressure, value)?;
            }
            PumpSpec::DeltaP { value } => model.fix(delta_p, value)?,
        }

        let (i, o) = (&inlet.state, &outlet.state);
        let mut eqs = vec![
            equate(model, format!("{name}.eq_flow_mass_h2o"), o.flow_mass_h2o, i.flow_mass_h2o),
            equate(model, format!("{name}.eq_flow_mass_nacl"), o.flow_mass_nacl, i.flow_mass_nacl),
            equate(model, format!("{name}.eq_temperature"), o.temperature, i.temperature),
        ];

        let e = model.add_eq(
            format!("{name}.eq_pressure"),
            vec![o.pressure, i.pressure, delta_p],
            |v| v[0] - v[1] - v[2],
        );
        model.set_eq_scale_var(e, o.pressure);
        eqs.push(e);

        let params = *pkg.params();
        let e = model.add_eq(
            format!("{name}.eq_work"),
            vec![work, efficiency, delta_p, i.flow_mass_h2o, i.flow_mass_nacl],
            move |v| v[0] * v[1] - params.flow_vol(v[3], v[4]) * v[2],
        );
        model.set_eq_scale_var(e, work);
        eqs.push(e);

        Ok(Self {
            name: name.to_string(),
            ports: vec![inlet, outlet],
            eqs,
            work_mechanical: work,
            efficiency,
            delta_p,
        })
    }

    pub fn inlet(&self) -> &StateBlock {
        &self.ports[0].state
    }

    pub fn outlet(&self) -> &StateBlock {
        &self.ports[1].state
    }
}

impl UnitOp for Pump {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> UnitKind {
        UnitKind::Pump
    }

    fn ports(&self) -> &[UnitPort] {
        &self.ports
    }

    fn equations(&self) -> &[EqId] {
        &self.eqs
    }

    fn guess_outlets(&self, model: &mut Model, pkg: &PropertyPackage) -> ComponentResult<()> {
        let s = pkg.read_state(model, self.inlet());
        let p_out = if model.is_fixed(self.outlet().pressure) {
            model.value(self.outlet().pressure)
        } else {
            s.pressure + model.value(self.delta_p)
        };
        write_free(
            model,
            self.outlet(),
            &[s.flow_mass_h2o, s.flow_mass_nacl, s.temperature, p_out],
        )?;
        let dp = p_out - s.pressure;
        if !model.is_fixed(self.delta_p) {
            model.set_value(self.delta_p, dp)?;
        }
        let q = pkg.params().flow_vol(s.flow_mass_h2o, s.flow_mass_nacl);
        model.set_value(self.work_mechanical, q * dp / model.value(self.efficiency))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::PackageId;
    use rc_core::units::read::to_pa;
    use rc_core::units::{g_per_l, gpm, k, pa, psi};
    use rc_props::StateValues;
    use rc_solver::{NewtonSolver, Solver};

    fn pump_model(spec: PumpSpec) -> (Model, PropertyPackage, Pump) {
        let pkg = PropertyPackage::nacl(PackageId(0));
        let mut m = Model::new();
        let pump = Pump::build(
            &mut m,
            &pkg,
            "p1",
            &PumpConfig {
                efficiency: 0.8,
                spec,
            },
        )
        .unwrap();
        let feed = StateValues::from_flow_and_conc(gpm(2637.0), g_per_l(0.5), k(298.0), pa(101_325.0))
            .unwrap();
        pkg.fix_state(&mut m, pump.inlet(), &feed).unwrap();
        (m, pkg, pump)
    }

    #[test]
    fn rejects_bad_efficiency() {
        let pkg = PropertyPackage::nacl(PackageId(0));
        let mut m = Model::new();
        let cfg = PumpConfig {
            efficiency: 1.2,
            spec: PumpSpec::DeltaP { value: 1.0e5 },
        };
        assert!(Pump::build(&mut m, &pkg, "p", &cfg).is_err());
    }

    #[test]
    fn hydraulic_work_over_efficiency() {
        let (mut m, pkg, pump) = pump_model(PumpSpec::OutletPressure {
            value: to_pa(psi(151.0)),
        });
        assert_eq!(m.degrees_of_freedom(), 0);
        pump.guess_outlets(&mut m, &pkg).unwrap();
        let report = NewtonSolver::default().solve(&mut m).unwrap();
        assert!(report.status.is_optimal());

        let q = 2637.0 * 3.785_411_784e-3 / 60.0;
        let dp = to_pa(psi(151.0)) - 101_325.0;
        let expected = q * dp / 0.8;
        assert!((m.value(pump.work_mechanical) - expected).abs() / expected < 1e-6);
        assert!((m.value(pump.delta_p) - dp).abs() < 1e-3);
    }

    #[test]
    fn delta_p_spec_sets_outlet_pressure() {
        let (mut m, pkg, pump) = pump_model(PumpSpec::DeltaP { value: 2.0e5 });
        assert_eq!(m.degrees_of_freedom(), 0);
        pump.guess_outlets(&mut m, &pkg).unwrap();
        NewtonSolver::default().solve(&mut m).unwrap();
        assert!((m.value(pump.outlet().pressure) - 301_325.0).abs() < 1e-3);
    }
}
