//! Chemical dosing into a passing stream.

use rc_core::constants::G0_MPS2;
use rc_core::{EqId, VarId};
use rc_graph::PortKind;
use rc_model::Model;
use rc_props::{PropertyPackage, StateBlock};
use serde::{Deserialize, Serialize};

use crate::common::{check_positive, check_range, equate_states, fixed_tagged, tagged};
use crate::error::{ComponentError, ComponentResult};
use crate::unit::{
    TAG_DOSE, TAG_EFFICIENCY, TAG_ELECTRICITY, TAG_FRACTION, TAG_SOLN_MASS, TAG_SOLN_VOL, UnitKind,
    UnitOp, UnitPort, copy_inlet_to_outlets,
};

/// Metering pump lift, 100 ft.
pub const DEFAULT_LIFT_HEIGHT_M: f64 = 30.48;
pub const DEFAULT_PUMP_EFFICIENCY: f64 = 0.81;

fn default_lift_height() -> f64 {
    DEFAULT_LIFT_HEIGHT_M
}

fn default_pump_efficiency() -> f64 {
    DEFAULT_PUMP_EFFICIENCY
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemicalConfig {
    #[serde(default)]
    pub chemical: Option<String>,
    /// Dose of active chemical [kg/m³]
    pub dose: f64,
    /// Mass fraction of active chemical in the delivered solution
    pub purity: f64,
    /// [kg/m³]
    pub solution_density: f64,
    /// [m]
    #[serde(default = "default_lift_height")]
    pub lift_height: f64,
    #[serde(default = "default_pump_efficiency")]
    pub pump_efficiency: f64,
}

/// Dosing point: the process stream passes through unchanged while the
/// solution feed and its metering-pump electricity are computed.
///
/// ```text
/// ṁ_soln · purity = dose · Q_in
/// Q_soln · ρ_soln = ṁ_soln
/// E · η = Q_soln · ρ_soln · g · h
/// ```
#[derive(Debug, Clone)]
pub struct ChemicalAddition {
    name: String,
    chemical: String,
    ports: Vec<UnitPort>,
    eqs: Vec<EqId>,
    pub dose: VarId,
    pub purity: VarId,
    pub solution_density: VarId,
    pub lift_height: VarId,
    pub pump_efficiency: VarId,
    pub flow_mass_soln: VarId,
    pub flow_vol_soln: VarId,
    /// Metering pump electricity [W]
    pub electricity: VarId,
}

impl ChemicalAddition {
    pub fn build(
        model: &mut Model,
        pkg: &PropertyPackage,
        name: &str,
        config: &ChemicalConfig,
    ) -> ComponentResult<Self> {
        let chemical = config
            .chemical
            .clone()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ComponentError::Missing {
                what: "Must specify a chemical for addition.".to_string(),
            })?;
        if !(config.dose.is_finite() && config.dose >= 0.0) {
            return Err(ComponentError::InvalidArg {
                what: format!("{name}: dose must be non-negative, got {}", config.dose),
            });
        }
        check_range(config.purity, f64::MIN_POSITIVE, 1.0, "chemical purity")?;
        check_positive(config.solution_density, "solution density")?;
        check_positive(config.lift_height, "lift height")?;
        check_range(config.pump_efficiency, f64::MIN_POSITIVE, 1.0, "metering pump efficiency")?;

        let inlet = UnitPort::build(model, pkg, name, "inlet", PortKind::Inlet)?;
        let outlet = UnitPort::build(model, pkg, name, "outlet", PortKind::Outlet)?;
        let mut eqs = equate_states(model, name, &outlet.state, &inlet.state);

        let dose = fixed_tagged(model, format!("{name}.chemical_dosage"), config.dose, "kg/m3", TAG_DOSE)?;
        let purity = fixed_tagged(model, format!("{name}.ratio_in_solution"), config.purity, "-", TAG_FRACTION)?;
        let solution_density = model.add_var(format!("{name}.solution_density"), config.solution_density, "kg/m3")?;
        model.fix(solution_density, config.solution_density)?;
        model.set_scale(solution_density, 1e-3)?;
        let lift_height = model.add_var(format!("{name}.lift_height"), config.lift_height, "m")?;
        model.fix(lift_height, config.lift_height)?;
        let pump_efficiency = fixed_tagged(
            model,
            format!("{name}.efficiency_pump"),
            config.pump_efficiency,
            "-",
            TAG_EFFICIENCY,
        )?;

        let flow_mass_soln = tagged(model, format!("{name}.flow_mass_solution"), 0.0, "kg/s", TAG_SOLN_MASS)?;
        model.set_bounds(flow_mass_soln, Some(0.0), None)?;
        let flow_vol_soln = tagged(model, format!("{name}.flow_vol_solution"), 0.0, "m3/s", TAG_SOLN_VOL)?;
        model.set_bounds(flow_vol_soln, Some(0.0), None)?;
        let electricity = tagged(model, format!("{name}.electricity"), 0.0, "W", TAG_ELECTRICITY)?;
        model.set_bounds(electricity, Some(0.0), None)?;

        let params = *pkg.params();
        let i = &inlet.state;

        let e = model.add_eq(
            format!("{name}.eq_flow_mass_solution"),
            vec![flow_mass_soln, purity, dose, i.flow_mass_h2o, i.flow_mass_nacl],
            move |v| v[0] * v[1] - v[2] * params.flow_vol(v[3], v[4]),
        );
        model.set_eq_scale_var(e, flow_mass_soln);
        eqs.push(e);

        let e = model.add_eq(
            format!("{name}.eq_flow_vol_solution"),
            vec![flow_vol_soln, solution_density, flow_mass_soln],
            |v| v[0] * v[1] - v[2],
        );
        model.set_eq_scale_var(e, flow_mass_soln);
        eqs.push(e);

        let e = model.add_eq(
            format!("{name}.eq_electricity"),
            vec![electricity, pump_efficiency, flow_vol_soln, solution_density, lift_height],
            |v| v[0] * v[1] - v[2] * v[3] * G0_MPS2 * v[4],
        );
        model.set_eq_scale_var(e, electricity);
        eqs.push(e);

        Ok(Self {
            name: name.to_string(),
            chemical,
            ports: vec![inlet, outlet],
            eqs,
            dose,
            purity,
            solution_density,
            lift_height,
            pump_efficiency,
            flow_mass_soln,
            flow_vol_soln,
            electricity,
        })
    }

    pub fn chemical(&self) -> &str {
        &self.chemical
    }

    pub fn inlet(&self) -> &StateBlock {
        &self.ports[0].state
    }

    pub fn outlet(&self) -> &StateBlock {
        &self.ports[1].state
    }
}

impl UnitOp for ChemicalAddition {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> UnitKind {
        UnitKind::ChemicalAddition
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
        let soln = model.value(self.dose) * q / model.value(self.purity);
        let rho = model.value(self.solution_density);
        let elec = soln * G0_MPS2 * model.value(self.lift_height) / model.value(self.pump_efficiency);
        model.set_value(self.flow_mass_soln, soln)?;
        model.set_value(self.flow_vol_soln, soln / rho)?;
        model.set_value(self.electricity, elec)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rc_core::PackageId;
    use rc_core::units::{g_per_l, gpm, k, pa};
    use rc_props::StateValues;
    use rc_solver::{NewtonSolver, Solver};

    fn config(chemical: Option<&str>) -> ChemicalConfig {
        ChemicalConfig {
            chemical: chemical.map(str::to_string),
            dose: 3.0e-3,
            purity: 0.125,
            solution_density: 1200.0,
            lift_height: DEFAULT_LIFT_HEIGHT_M,
            pump_efficiency: DEFAULT_PUMP_EFFICIENCY,
        }
    }

    #[test]
    fn missing_chemical_is_reported_verbatim() {
        let pkg = PropertyPackage::nacl(PackageId(0));
        let mut m = Model::new();
        let err = ChemicalAddition::build(&mut m, &pkg, "chem", &config(None)).unwrap_err();
        assert_eq!(err.to_string(), "Must specify a chemical for addition.");
    }

    #[test]
    fn solution_flow_and_pump_power() {
        let pkg = PropertyPackage::nacl(PackageId(0));
        let mut m = Model::new();
        let chem =
            ChemicalAddition::build(&mut m, &pkg, "chem", &config(Some("sodium_hypochlorite"))).unwrap();
        let feed =
            StateValues::from_flow_and_conc(gpm(2637.0), g_per_l(0.5), k(298.0), pa(101_325.0)).unwrap();
        pkg.fix_state(&mut m, chem.inlet(), &feed).unwrap();
        assert_eq!(m.degrees_of_freedom(), 0);

        let report = NewtonSolver::default().solve(&mut m).unwrap();
        assert!(report.status.is_optimal());

        let q = 2637.0 * 3.785_411_784e-3 / 60.0;
        let soln = 3.0e-3 * q / 0.125;
        assert_relative_eq!(m.value(chem.flow_mass_soln), soln, max_relative = 1e-8);
        assert_relative_eq!(m.value(chem.flow_vol_soln), soln / 1200.0, max_relative = 1e-8);
        assert_relative_eq!(
            m.value(chem.electricity),
            soln * G0_MPS2 * 30.48 / 0.81,
            max_relative = 1e-8
        );
        assert_eq!(chem.chemical(), "sodium_hypochlorite");
    }
}
