//! Zero-dimensional reverse-osmosis stage.

use rc_core::constants::ATM_PA;
use rc_core::{EqId, VarId};
use rc_graph::PortKind;
use rc_model::Model;
use rc_props::package::{TAG_CONC_MASS, TAG_PRESSURE};
use rc_props::{PropertyPackage, StateBlock};
use serde::{Deserialize, Serialize};

use crate::common::{check_non_negative, check_positive, equate, fixed_tagged, tagged};
use crate::error::ComponentResult;
use crate::unit::{
    TAG_A_COMP, TAG_AREA, TAG_B_COMP, TAG_RECOVERY, UnitKind, UnitOp, UnitPort, write_free,
};

fn default_permeate_pressure() -> f64 {
    ATM_PA
}

/// Design of one RO stage, SI units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoConfig {
    /// Water permeability [m/(s·Pa)]
    pub a_comp: f64,
    /// Salt permeability [m/s]
    pub b_comp: f64,
    /// Membrane area [m²]
    pub area: f64,
    /// Feed-side pressure change, negative for a drop [Pa]
    pub delta_p: f64,
    /// Absolute permeate pressure [Pa]
    #[serde(default = "default_permeate_pressure")]
    pub permeate_pressure: f64,
}

/// RO stage with averaged feed-side driving force.
///
/// ```text
/// ṁ_wp = A · ρ_w · area · (P̄_f − P_p − (π̄_f − π_p))
/// ṁ_sp = B · area · (C̄_f − C_p)
/// ```
///
/// Feed-side averages are taken over inlet and retentate.
#[derive(Debug, Clone)]
pub struct ReverseOsmosis0D {
    name: String,
    ports: Vec<UnitPort>,
    eqs: Vec<EqId>,
    pub a_comp: VarId,
    pub b_comp: VarId,
    pub area: VarId,
    pub delta_p: VarId,
    pub recovery_vol: VarId,
    pub conc_mass_permeate: VarId,
}

impl ReverseOsmosis0D {
    pub fn build(
        model: &mut Model,
        pkg: &PropertyPackage,
        name: &str,
        config: &RoConfig,
    ) -> ComponentResult<Self> {
        let inlet = UnitPort::build(model, pkg, name, "inlet", PortKind::Inlet)?;
        let retentate = UnitPort::build(model, pkg, name, "retentate", PortKind::Outlet)?;
        let permeate = UnitPort::build(model, pkg, name, "permeate", PortKind::Outlet)?;

        check_non_negative(config.a_comp, "A_comp")?;
        check_non_negative(config.b_comp, "B_comp")?;
        check_positive(config.area, "membrane area")?;
        check_positive(config.permeate_pressure, "permeate pressure")?;

        let a_comp = fixed_tagged(model, format!("{name}.A_comp"), config.a_comp, "m/s/Pa", TAG_A_COMP)?;
        let b_comp = fixed_tagged(model, format!("{name}.B_comp"), config.b_comp, "m/s", TAG_B_COMP)?;
        let area = fixed_tagged(model, format!("{name}.area"), config.area, "m2", TAG_AREA)?;
        let delta_p = fixed_tagged(model, format!("{name}.deltaP"), config.delta_p, "Pa", TAG_PRESSURE)?;
        let recovery_vol = tagged(model, format!("{name}.recovery_vol"), 0.5, "-", TAG_RECOVERY)?;
        model.set_bounds(recovery_vol, Some(0.0), Some(1.0))?;
        let cp = tagged(model, format!("{name}.conc_mass_permeate"), 0.0, "kg/m3", TAG_CONC_MASS)?;
        model.set_bounds(cp, Some(0.0), None)?;
        model.fix(permeate.state.pressure, config.permeate_pressure)?;

        let (i, r, p) = (&inlet.state, &retentate.state, &permeate.state);
        let params = *pkg.params();
        let mut eqs = Vec::with_capacity(9);

        let e = model.add_eq(
            format!("{name}.eq_mass_balance_h2o"),
            vec![i.flow_mass_h2o, r.flow_mass_h2o, p.flow_mass_h2o],
            |v| v[0] - v[1] - v[2],
        );
        model.set_eq_scale_var(e, i.flow_mass_h2o);
        eqs.push(e);

        let e = model.add_eq(
            format!("{name}.eq_mass_balance_nacl"),
            vec![i.flow_mass_nacl, r.flow_mass_nacl, p.flow_mass_nacl],
            |v| v[0] - v[1] - v[2],
        );
        model.set_eq_scale_var(e, i.flow_mass_nacl);
        eqs.push(e);

        let e = model.add_eq(
            format!("{name}.eq_pressure_drop"),
            vec![r.pressure, i.pressure, delta_p],
            |v| v[0] - v[1] - v[2],
        );
        model.set_eq_scale_var(e, r.pressure);
        eqs.push(e);

        eqs.push(equate(model, format!("{name}.eq_temperature_retentate"), r.temperature, i.temperature));
        eqs.push(equate(model, format!("{name}.eq_temperature_permeate"), p.temperature, i.temperature));

        // v: A, area, mw_in, ms_in, T_in, P_in, mw_r, ms_r, T_r, P_r, mw_p, ms_p, T_p, P_p
        let e = model.add_eq(
            format!("{name}.eq_flux_mass_h2o"),
            vec![
                a_comp,
                area,
                i.flow_mass_h2o,
                i.flow_mass_nacl,
                i.temperature,
                i.pressure,
                r.flow_mass_h2o,
                r.flow_mass_nacl,
                r.temperature,
                r.pressure,
                p.flow_mass_h2o,
                p.flow_mass_nacl,
                p.temperature,
                p.pressure,
            ],
            move |v| {
                let pi_in = params.pressure_osm(params.conc_mass(v[2], v[3]), v[4]);
                let pi_r = params.pressure_osm(params.conc_mass(v[6], v[7]), v[8]);
                let pi_p = params.pressure_osm(params.conc_mass(v[10], v[11]), v[12]);
                let p_avg = 0.5 * (v[5] + v[9]);
                let pi_avg = 0.5 * (pi_in + pi_r);
                v[10] - v[0] * params.dens_solvent * v[1] * (p_avg - v[13] - (pi_avg - pi_p))
            },
        );
        model.set_eq_scale_var(e, p.flow_mass_h2o);
        eqs.push(e);

        let e = model.add_eq(
            format!("{name}.eq_flux_mass_nacl"),
            vec![
                b_comp,
                area,
                i.flow_mass_h2o,
                i.flow_mass_nacl,
                r.flow_mass_h2o,
                r.flow_mass_nacl,
                p.flow_mass_nacl,
                cp,
            ],
            move |v| {
                let c_avg = 0.5 * (params.conc_mass(v[2], v[3]) + params.conc_mass(v[4], v[5]));
                v[6] - v[0] * v[1] * (c_avg - v[7])
            },
        );
        model.set_eq_scale_var(e, p.flow_mass_nacl);
        eqs.push(e);

        let e = model.add_eq(
            format!("{name}.eq_recovery_vol"),
            vec![recovery_vol, i.flow_mass_h2o, i.flow_mass_nacl, p.flow_mass_h2o, p.flow_mass_nacl],
            move |v| v[0] * params.flow_vol(v[1], v[2]) - params.flow_vol(v[3], v[4]),
        );
        model.set_eq_scale(e, 1e1);
        eqs.push(e);

        let e = model.add_eq(
            format!("{name}.eq_conc_mass_permeate"),
            vec![cp, p.flow_mass_h2o, p.flow_mass_nacl],
            move |v| v[0] - params.conc_mass(v[1], v[2]),
        );
        model.set_eq_scale_var(e, cp);
        eqs.push(e);

        Ok(Self {
            name: name.to_string(),
            ports: vec![inlet, retentate, permeate],
            eqs,
            a_comp,
            b_comp,
            area,
            delta_p,
            recovery_vol,
            conc_mass_permeate: cp,
        })
    }

    pub fn inlet(&self) -> &StateBlock {
        &self.ports[0].state
    }

    pub fn retentate(&self) -> &StateBlock {
        &self.ports[1].state
    }

    pub fn permeate(&self) -> &StateBlock {
        &self.ports[2].state
    }
}

impl UnitOp for ReverseOsmosis0D {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> UnitKind {
        UnitKind::ReverseOsmosis
    }

    fn ports(&self) -> &[UnitPort] {
        &self.ports
    }

    fn equations(&self) -> &[EqId] {
        &self.eqs
    }

    /// Permeate flow from the inlet driving force, clamped to a plausible
    /// recovery range.
    fn guess_outlets(&self, model: &mut Model, pkg: &PropertyPackage) -> ComponentResult<()> {
        let params = pkg.params();
        let s = pkg.read_state(model, self.inlet());
        let a = model.value(self.a_comp);
        let b = model.value(self.b_comp);
        let area = model.value(self.area);
        let dp = model.value(self.delta_p);
        let p_perm = model.value(self.permeate().pressure);

        let c_in = params.conc_mass(s.flow_mass_h2o, s.flow_mass_nacl);
        let pi_in = params.pressure_osm(c_in, s.temperature);
        let jw = a * params.dens_solvent * area * (s.pressure + 0.5 * dp - p_perm - pi_in);
        let frac = (jw / s.flow_mass_h2o).clamp(0.05, 0.85);
        let mwp = frac * s.flow_mass_h2o;
        let msp = (b * area * c_in).min(0.5 * s.flow_mass_nacl);

        write_free(
            model,
            self.permeate(),
            &[mwp, msp, s.temperature, p_perm],
        )?;
        write_free(
            model,
            self.retentate(),
            &[
                s.flow_mass_h2o - mwp,
                s.flow_mass_nacl - msp,
                s.temperature,
                s.pressure + dp,
            ],
        )?;
        let q_in = params.flow_vol(s.flow_mass_h2o, s.flow_mass_nacl);
        let q_p = params.flow_vol(mwp, msp);
        if !model.is_fixed(self.recovery_vol) {
            model.set_value(self.recovery_vol, q_p / q_in)?;
        }
        if !model.is_fixed(self.conc_mass_permeate) {
            model.set_value(self.conc_mass_permeate, params.conc_mass(mwp, msp))?;
        }
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

    fn stage() -> (Model, PropertyPackage, ReverseOsmosis0D) {
        let pkg = PropertyPackage::nacl(PackageId(0));
        let mut m = Model::new();
        let ro = ReverseOsmosis0D::build(
            &mut m,
            &pkg,
            "ro",
            &RoConfig {
                a_comp: 4.2e-12,
                b_comp: 3.5e-8,
                area: 30_000.0,
                delta_p: -to_pa(psi(25.0)),
                permeate_pressure: ATM_PA,
            },
        )
        .unwrap();
        let feed =
            StateValues::from_flow_and_conc(gpm(2637.0), g_per_l(0.5), k(298.0), pa(to_pa(psi(151.0))))
                .unwrap();
        pkg.fix_state(&mut m, ro.inlet(), &feed).unwrap();
        m.calculate_scaling_factors(pkg.default_scaling());
        m.calculate_scaling_factors(&crate::unit::default_scaling());
        (m, pkg, ro)
    }

    #[test]
    fn nine_equations_square_with_fixed_inlet() {
        let (m, _, ro) = stage();
        assert_eq!(ro.equations().len(), 9);
        assert_eq!(m.degrees_of_freedom(), 0);
    }

    #[test]
    fn solved_stage_satisfies_balances() {
        let (mut m, pkg, ro) = stage();
        ro.guess_outlets(&mut m, &pkg).unwrap();
        let report = NewtonSolver::default().solve(&mut m).unwrap();
        assert!(report.status.is_optimal(), "{report:?}");

        let i = pkg.read_state(&m, ro.inlet());
        let r = pkg.read_state(&m, ro.retentate());
        let p = pkg.read_state(&m, ro.permeate());
        assert!((i.flow_mass_h2o - r.flow_mass_h2o - p.flow_mass_h2o).abs() < 1e-6);
        assert!((i.flow_mass_nacl - r.flow_mass_nacl - p.flow_mass_nacl).abs() < 1e-9);

        let rec = m.value(ro.recovery_vol);
        assert!(rec > 0.0 && rec < 1.0, "recovery {rec}");
        // permeate is cleaner than the feed
        assert!(m.value(ro.conc_mass_permeate) < 0.5);
        assert!((r.pressure - (i.pressure - to_pa(psi(25.0)))).abs() < 1e-6);
    }

    #[test]
    fn negative_area_is_rejected() {
        let pkg = PropertyPackage::nacl(PackageId(0));
        let mut m = Model::new();
        let cfg = RoConfig {
            a_comp: 4.2e-12,
            b_comp: 3.5e-8,
            area: -1.0,
            delta_p: 0.0,
            permeate_pressure: ATM_PA,
        };
        assert!(ReverseOsmosis0D::build(&mut m, &pkg, "ro", &cfg).is_err());
    }
}
