pub use rc_core::PackageId;
use rc_core::VarId;
use rc_model::{Model, ScalingDefaults};

use crate::error::PropsResult;
use crate::nacl::NaClParams;
use crate::state::StateValues;

pub const TAG_FLOW_H2O: &str = "flow_mass_h2o";
pub const TAG_FLOW_NACL: &str = "flow_mass_nacl";
pub const TAG_TEMPERATURE: &str = "temperature";
pub const TAG_PRESSURE: &str = "pressure";
pub const TAG_FLOW_VOL: &str = "flow_vol";
pub const TAG_CONC_MASS: &str = "conc_mass";

/// The variables describing one material state.
#[derive(Debug, Clone, PartialEq)]
pub struct StateBlock {
    pub name: String,
    pub package: PackageId,
    pub flow_mass_h2o: VarId,
    pub flow_mass_nacl: VarId,
    pub temperature: VarId,
    pub pressure: VarId,
}

impl StateBlock {
    pub fn vars(&self) -> [VarId; 4] {
        [
            self.flow_mass_h2o,
            self.flow_mass_nacl,
            self.temperature,
            self.pressure,
        ]
    }
}

#[derive(Debug, Clone)]
pub struct PropertyPackage {
    id: PackageId,
    name: String,
    params: NaClParams,
    scaling: ScalingDefaults,
}

impl PropertyPackage {
    pub fn nacl(id: PackageId) -> Self {
        let scaling = ScalingDefaults::new()
            .with(TAG_FLOW_H2O, 1e-1)
            .with(TAG_FLOW_NACL, 1e2)
            .with(TAG_TEMPERATURE, 1e-2)
            .with(TAG_PRESSURE, 1e-5)
            .with(TAG_FLOW_VOL, 1e1)
            .with(TAG_CONC_MASS, 1.0);
        Self {
            id,
            name: "nacl".to_string(),
            params: NaClParams::default(),
            scaling,
        }
    }

    pub fn id(&self) -> PackageId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &NaClParams {
        &self.params
    }

    pub fn default_scaling(&self) -> &ScalingDefaults {
        &self.scaling
    }

    pub fn set_default_scaling(&mut self, tag: &str, factor: f64) {
        self.scaling.set(tag, factor);
    }

    /// Add the four state variables for `name` to the model.
    pub fn build_state(&self, model: &mut Model, name: &str) -> PropsResult<StateBlock> {
        let mut add = |suffix: &str,
                       value: f64,
                       units: &'static str,
                       tag: &'static str,
                       lower: Option<f64>,
                       upper: Option<f64>| {
            let id = model.add_var(format!("{name}.{suffix}"), value, units)?;
            model.set_tag(id, tag);
            model.set_bounds(id, lower, upper)?;
            Ok::<_, rc_model::ModelError>(id)
        };
        let flow_mass_h2o = add("flow_mass_h2o", 1.0, "kg/s", TAG_FLOW_H2O, Some(0.0), None)?;
        let flow_mass_nacl = add("flow_mass_nacl", 1e-3, "kg/s", TAG_FLOW_NACL, Some(0.0), None)?;
        let temperature = add(
            "temperature",
            298.15,
            "K",
            TAG_TEMPERATURE,
            Some(273.15),
            Some(373.15),
        )?;
        let pressure = add("pressure", 101_325.0, "Pa", TAG_PRESSURE, Some(1.0e3), Some(5.0e7))?;
        Ok(StateBlock {
            name: name.to_string(),
            package: self.id,
            flow_mass_h2o,
            flow_mass_nacl,
            temperature,
            pressure,
        })
    }

    /// Volumetric flow of a state, created with its defining equation on first use.
    pub fn touch_flow_vol(&self, model: &mut Model, sb: &StateBlock) -> PropsResult<VarId> {
        let name = format!("{}.flow_vol", sb.name);
        if let Some(id) = model.find(&name) {
            return Ok(id);
        }
        let p = self.params;
        let current = p.flow_vol(model.value(sb.flow_mass_h2o), model.value(sb.flow_mass_nacl));
        let id = model.add_var(name.clone(), current, "m3/s")?;
        model.set_tag(id, TAG_FLOW_VOL);
        model.set_bounds(id, Some(0.0), None)?;
        let eq = model.add_eq(
            format!("{name}_eq"),
            vec![id, sb.flow_mass_h2o, sb.flow_mass_nacl],
            move |v| v[0] - p.flow_vol(v[1], v[2]),
        );
        model.set_eq_scale_var(eq, id);
        Ok(id)
    }

    /// Mass concentration of a state, created with its defining equation on first use.
    pub fn touch_conc_mass(&self, model: &mut Model, sb: &StateBlock) -> PropsResult<VarId> {
        let name = format!("{}.conc_mass", sb.name);
        if let Some(id) = model.find(&name) {
            return Ok(id);
        }
        let p = self.params;
        let current = p.conc_mass(model.value(sb.flow_mass_h2o), model.value(sb.flow_mass_nacl));
        let id = model.add_var(name.clone(), current, "kg/m3")?;
        model.set_tag(id, TAG_CONC_MASS);
        model.set_bounds(id, Some(0.0), None)?;
        let eq = model.add_eq(
            format!("{name}_eq"),
            vec![id, sb.flow_mass_h2o, sb.flow_mass_nacl],
            move |v| v[0] - p.conc_mass(v[1], v[2]),
        );
        model.set_eq_scale_var(eq, id);
        Ok(id)
    }

    pub fn read_state(&self, model: &Model, sb: &StateBlock) -> StateValues {
        StateValues {
            flow_mass_h2o: model.value(sb.flow_mass_h2o),
            flow_mass_nacl: model.value(sb.flow_mass_nacl),
            temperature: model.value(sb.temperature),
            pressure: model.value(sb.pressure),
        }
    }

    /// Overwrite state values without changing which are fixed.
    pub fn write_state(&self, model: &mut Model, sb: &StateBlock, s: &StateValues) -> PropsResult<()> {
        for (id, v) in sb.vars().into_iter().zip(s.as_array()) {
            model.set_value(id, v)?;
        }
        Ok(())
    }

    pub fn fix_state(&self, model: &mut Model, sb: &StateBlock, s: &StateValues) -> PropsResult<()> {
        for (id, v) in sb.vars().into_iter().zip(s.as_array()) {
            model.fix(id, v)?;
        }
        Ok(())
    }

    /// Copy the values of `from` into `to`, leaving fixed flags untouched.
    pub fn propagate_state(&self, model: &mut Model, from: &StateBlock, to: &StateBlock) -> PropsResult<()> {
        let s = self.read_state(model, from);
        self.write_state(model, to, &s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::units::{g_per_l, gpm, k, pa};

    #[test]
    fn build_state_tags_and_bounds() {
        let pkg = PropertyPackage::nacl(PackageId(0));
        let mut m = Model::new();
        let sb = pkg.build_state(&mut m, "fs.feed.outlet").unwrap();
        assert_eq!(m.var(sb.pressure).name, "fs.feed.outlet.pressure");
        assert_eq!(m.var(sb.temperature).tag, Some(TAG_TEMPERATURE));
        assert_eq!(m.var(sb.flow_mass_h2o).lower, Some(0.0));

        m.calculate_scaling_factors(pkg.default_scaling());
        assert_eq!(m.var(sb.pressure).scale, Some(1e-5));
    }

    #[test]
    fn touch_is_idempotent_and_consistent() {
        let pkg = PropertyPackage::nacl(PackageId(0));
        let mut m = Model::new();
        let sb = pkg.build_state(&mut m, "s").unwrap();
        let values =
            StateValues::from_flow_and_conc(gpm(100.0), g_per_l(1.0), k(298.0), pa(2.0e5)).unwrap();
        pkg.fix_state(&mut m, &sb, &values).unwrap();

        let q1 = pkg.touch_flow_vol(&mut m, &sb).unwrap();
        let q2 = pkg.touch_flow_vol(&mut m, &sb).unwrap();
        assert_eq!(q1, q2);
        let c = pkg.touch_conc_mass(&mut m, &sb).unwrap();
        assert_eq!(m.num_eqs(), 2);
        assert_eq!(m.degrees_of_freedom(), 0);
        for e in m.eq_ids() {
            assert!(m.residual(e).abs() < 1e-12);
        }
        assert!((m.value(c) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn propagate_copies_values_only() {
        let pkg = PropertyPackage::nacl(PackageId(0));
        let mut m = Model::new();
        let a = pkg.build_state(&mut m, "a").unwrap();
        let b = pkg.build_state(&mut m, "b").unwrap();
        m.fix(a.pressure, 3.0e5).unwrap();
        pkg.propagate_state(&mut m, &a, &b).unwrap();
        assert_eq!(m.value(b.pressure), 3.0e5);
        assert!(!m.is_fixed(b.pressure));
    }

    #[test]
    fn scaling_defaults_can_be_overridden() {
        let mut pkg = PropertyPackage::nacl(PackageId(1));
        pkg.set_default_scaling(TAG_FLOW_H2O, 1.0);
        assert_eq!(pkg.default_scaling().get(TAG_FLOW_H2O), Some(1.0));
    }
}
