use std::collections::HashMap;

use rc_core::{EqId, Id, VarId};

use crate::error::{ModelError, ModelResult};
use crate::scaling::ScalingDefaults;
use crate::subsystem::Subsystem;

/// Residual of one equation, given the values of its variables in order.
pub type Residual = Box<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// A scalar model variable in SI units.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub value: f64,
    pub fixed: bool,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub scale: Option<f64>,
    pub units: &'static str,
    /// Key used to look up a default scaling factor.
    pub tag: Option<&'static str>,
}

impl Variable {
    pub fn scale_or_one(&self) -> f64 {
        self.scale.unwrap_or(1.0)
    }

    /// Clamp a candidate value into this variable's bounds.
    pub fn clamp(&self, v: f64) -> f64 {
        let v = match self.lower {
            Some(lo) if v < lo => lo,
            _ => v,
        };
        match self.upper {
            Some(hi) if v > hi => hi,
            _ => v,
        }
    }
}

pub struct Equation {
    pub name: String,
    vars: Vec<VarId>,
    residual: Residual,
    pub active: bool,
    pub scale: Option<f64>,
    /// Variable whose scaling factor applies when `scale` is unset.
    pub scale_var: Option<VarId>,
}

impl Equation {
    pub fn vars(&self) -> &[VarId] {
        &self.vars
    }
}

impl std::fmt::Debug for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Equation")
            .field("name", &self.name)
            .field("vars", &self.vars)
            .field("active", &self.active)
            .field("scale", &self.scale)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Model {
    vars: Vec<Variable>,
    eqs: Vec<Equation>,
    by_name: HashMap<String, VarId>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_var(
        &mut self,
        name: impl Into<String>,
        value: f64,
        units: &'static str,
    ) -> ModelResult<VarId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(ModelError::DuplicateVariable { name });
        }
        if !value.is_finite() {
            return Err(ModelError::NonFinite { name, value });
        }
        let id = Id::from_index(self.vars.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.vars.push(Variable {
            name,
            value,
            fixed: false,
            lower: None,
            upper: None,
            scale: None,
            units,
            tag: None,
        });
        Ok(id)
    }

    pub fn add_eq<F>(&mut self, name: impl Into<String>, vars: Vec<VarId>, residual: F) -> EqId
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        let id = Id::from_index(self.eqs.len() as u32);
        self.eqs.push(Equation {
            name: name.into(),
            vars,
            residual: Box::new(residual),
            active: true,
            scale: None,
            scale_var: None,
        });
        id
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn num_eqs(&self) -> usize {
        self.eqs.len()
    }

    pub fn var(&self, id: VarId) -> &Variable {
        &self.vars[id.idx()]
    }

    pub fn equation(&self, id: EqId) -> &Equation {
        &self.eqs[id.idx()]
    }

    pub fn eq_ids(&self) -> impl Iterator<Item = EqId> + '_ {
        (0..self.eqs.len()).map(|i| Id::from_index(i as u32))
    }

    /// Equations added after the model held `start` of them.
    pub fn eq_ids_since(&self, start: usize) -> impl Iterator<Item = EqId> + '_ {
        (start..self.eqs.len()).map(|i| Id::from_index(i as u32))
    }

    pub fn var_ids(&self) -> impl Iterator<Item = VarId> + '_ {
        (0..self.vars.len()).map(|i| Id::from_index(i as u32))
    }

    pub fn find(&self, name: &str) -> Option<VarId> {
        self.by_name.get(name).copied()
    }

    pub fn lookup(&self, name: &str) -> ModelResult<VarId> {
        self.find(name).ok_or_else(|| ModelError::UnknownVariable {
            name: name.to_string(),
        })
    }

    pub fn value(&self, id: VarId) -> f64 {
        self.vars[id.idx()].value
    }

    pub fn set_value(&mut self, id: VarId, value: f64) -> ModelResult<()> {
        let var = &mut self.vars[id.idx()];
        if !value.is_finite() {
            return Err(ModelError::NonFinite {
                name: var.name.clone(),
                value,
            });
        }
        var.value = value;
        Ok(())
    }

    pub fn is_fixed(&self, id: VarId) -> bool {
        self.vars[id.idx()].fixed
    }

    pub fn fix(&mut self, id: VarId, value: f64) -> ModelResult<()> {
        self.set_value(id, value)?;
        self.vars[id.idx()].fixed = true;
        Ok(())
    }

    pub fn fix_current(&mut self, id: VarId) {
        self.vars[id.idx()].fixed = true;
    }

    pub fn unfix(&mut self, id: VarId) {
        self.vars[id.idx()].fixed = false;
    }

    pub fn set_bounds(&mut self, id: VarId, lower: Option<f64>, upper: Option<f64>) -> ModelResult<()> {
        let var = &mut self.vars[id.idx()];
        if let (Some(lo), Some(hi)) = (lower, upper)
            && lo > hi
        {
            return Err(ModelError::InvalidBounds {
                name: var.name.clone(),
                lower: lo,
                upper: hi,
            });
        }
        var.lower = lower;
        var.upper = upper;
        Ok(())
    }

    pub fn set_scale(&mut self, id: VarId, factor: f64) -> ModelResult<()> {
        let var = &mut self.vars[id.idx()];
        if !(factor.is_finite() && factor > 0.0) {
            return Err(ModelError::InvalidScale {
                name: var.name.clone(),
                factor,
            });
        }
        var.scale = Some(factor);
        Ok(())
    }

    pub fn set_tag(&mut self, id: VarId, tag: &'static str) {
        self.vars[id.idx()].tag = Some(tag);
    }

    pub fn set_eq_scale(&mut self, id: EqId, factor: f64) {
        self.eqs[id.idx()].scale = Some(factor);
    }

    pub fn set_eq_scale_var(&mut self, id: EqId, var: VarId) {
        self.eqs[id.idx()].scale_var = Some(var);
    }

    pub fn set_active(&mut self, id: EqId, active: bool) {
        self.eqs[id.idx()].active = active;
    }

    /// Scaling factor applied to an equation's residual.
    pub fn eq_scale(&self, id: EqId) -> f64 {
        let eq = &self.eqs[id.idx()];
        eq.scale
            .or_else(|| eq.scale_var.and_then(|v| self.vars[v.idx()].scale))
            .unwrap_or(1.0)
    }

    /// Snapshot of every variable value, indexed by `VarId::idx`.
    pub fn values(&self) -> Vec<f64> {
        self.vars.iter().map(|v| v.value).collect()
    }

    /// Evaluate one equation's unscaled residual against a full value vector.
    pub fn eval(&self, id: EqId, values: &[f64]) -> f64 {
        let eq = &self.eqs[id.idx()];
        let args: Vec<f64> = eq.vars.iter().map(|v| values[v.idx()]).collect();
        (eq.residual)(&args)
    }

    /// Evaluate one equation at the current point.
    pub fn residual(&self, id: EqId) -> f64 {
        let eq = &self.eqs[id.idx()];
        let args: Vec<f64> = eq.vars.iter().map(|v| self.vars[v.idx()].value).collect();
        (eq.residual)(&args)
    }

    /// Free variables appearing in active equations minus active equations.
    pub fn degrees_of_freedom(&self) -> i64 {
        self.full_subsystem().degrees_of_freedom()
    }

    /// Every active equation with every free variable as unknown.
    pub fn full_subsystem(&self) -> Subsystem {
        let active: Vec<EqId> = self.eq_ids().filter(|e| self.eqs[e.idx()].active).collect();
        self.subsystem(&active, &[])
    }

    /// Extract the square-or-not block formed by `eqs`, treating `hold` as fixed.
    pub fn subsystem(&self, eqs: &[EqId], hold: &[VarId]) -> Subsystem {
        let mut seen = vec![false; self.vars.len()];
        for h in hold {
            seen[h.idx()] = true;
        }
        let mut unknowns = Vec::new();
        let mut equations = Vec::with_capacity(eqs.len());
        for &e in eqs {
            let eq = &self.eqs[e.idx()];
            if !eq.active {
                continue;
            }
            equations.push(e);
            for &v in &eq.vars {
                if !seen[v.idx()] && !self.vars[v.idx()].fixed {
                    seen[v.idx()] = true;
                    unknowns.push(v);
                }
            }
        }
        Subsystem::new(equations, unknowns)
    }

    /// Assign default scaling factors by tag to every unscaled variable.
    ///
    /// Returns the number of variables still without a scaling factor.
    pub fn calculate_scaling_factors(&mut self, defaults: &ScalingDefaults) -> usize {
        let mut missing = 0;
        for var in &mut self.vars {
            if var.scale.is_some() {
                continue;
            }
            match var.tag.and_then(|t| defaults.get(t)) {
                Some(f) => var.scale = Some(f),
                None => missing += 1,
            }
        }
        tracing::debug!(
            variables = self.vars.len(),
            missing,
            "calculated scaling factors"
        );
        missing
    }

    pub fn variables(&self) -> &[Variable] {
        &self.vars
    }

    pub fn equations(&self) -> &[Equation] {
        &self.eqs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_var_model() -> (Model, VarId, VarId) {
        let mut m = Model::new();
        let x = m.add_var("x", 1.0, "-").unwrap();
        let y = m.add_var("y", 2.0, "-").unwrap();
        m.add_eq("sum", vec![x, y], |v| v[0] + v[1] - 3.0);
        (m, x, y)
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut m = Model::new();
        m.add_var("a.b", 0.0, "-").unwrap();
        let err = m.add_var("a.b", 1.0, "-").unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateVariable {
                name: "a.b".into()
            }
        );
    }

    #[test]
    fn dof_counts_free_vars_in_active_equations() {
        let (mut m, x, _) = two_var_model();
        assert_eq!(m.degrees_of_freedom(), 1);
        m.fix(x, 1.0).unwrap();
        assert_eq!(m.degrees_of_freedom(), 0);
        m.unfix(x);
        assert_eq!(m.degrees_of_freedom(), 1);
    }

    #[test]
    fn unused_variables_do_not_count() {
        let (mut m, x, _) = two_var_model();
        m.add_var("orphan", 5.0, "-").unwrap();
        m.fix(x, 1.0).unwrap();
        assert_eq!(m.degrees_of_freedom(), 0);
    }

    #[test]
    fn inactive_equations_are_skipped() {
        let (mut m, _, _) = two_var_model();
        let e = m.eq_ids().next().unwrap();
        m.set_active(e, false);
        assert_eq!(m.degrees_of_freedom(), 0);
        assert!(m.full_subsystem().unknowns().is_empty());
    }

    #[test]
    fn residual_uses_current_values() {
        let (m, _, _) = two_var_model();
        let e = m.eq_ids().next().unwrap();
        assert_eq!(m.residual(e), 0.0);
    }

    #[test]
    fn equation_scale_falls_back_to_variable() {
        let (mut m, x, _) = two_var_model();
        let e = m.eq_ids().next().unwrap();
        assert_eq!(m.eq_scale(e), 1.0);
        m.set_scale(x, 1e-3).unwrap();
        m.set_eq_scale_var(e, x);
        assert_eq!(m.eq_scale(e), 1e-3);
        m.set_eq_scale(e, 10.0);
        assert_eq!(m.eq_scale(e), 10.0);
    }

    #[test]
    fn bounds_are_validated_and_clamp() {
        let (mut m, x, _) = two_var_model();
        assert!(m.set_bounds(x, Some(2.0), Some(1.0)).is_err());
        m.set_bounds(x, Some(0.0), Some(1.5)).unwrap();
        assert_eq!(m.var(x).clamp(-1.0), 0.0);
        assert_eq!(m.var(x).clamp(3.0), 1.5);
        assert_eq!(m.var(x).clamp(0.7), 0.7);
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let (mut m, x, _) = two_var_model();
        assert!(m.set_value(x, f64::NAN).is_err());
        assert!(m.add_var("z", f64::INFINITY, "-").is_err());
    }
}
