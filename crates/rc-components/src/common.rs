//! Helpers shared by unit models.

use rc_core::{EqId, VarId};
use rc_model::Model;
use rc_props::StateBlock;

use crate::error::{ComponentError, ComponentResult};

/// `a = b`, scaled like `a`.
pub fn equate(model: &mut Model, name: String, a: VarId, b: VarId) -> EqId {
    let eq = model.add_eq(name, vec![a, b], |v| v[0] - v[1]);
    model.set_eq_scale_var(eq, a);
    eq
}

/// Outlet state equal to inlet state, one equation per state variable.
pub fn equate_states(model: &mut Model, prefix: &str, out: &StateBlock, inlet: &StateBlock) -> Vec<EqId> {
    let labels = ["flow_mass_h2o", "flow_mass_nacl", "temperature", "pressure"];
    out.vars()
        .into_iter()
        .zip(inlet.vars())
        .zip(labels)
        .map(|((o, i), label)| equate(model, format!("{prefix}.eq_{label}"), o, i))
        .collect()
}

/// A variable carrying a scaling tag.
pub fn tagged(
    model: &mut Model,
    name: String,
    value: f64,
    units: &'static str,
    tag: &'static str,
) -> ComponentResult<VarId> {
    let id = model.add_var(name, value, units)?;
    model.set_tag(id, tag);
    Ok(id)
}

/// A fixed, tagged parameter.
pub fn fixed_tagged(
    model: &mut Model,
    name: String,
    value: f64,
    units: &'static str,
    tag: &'static str,
) -> ComponentResult<VarId> {
    let id = tagged(model, name, value, units, tag)?;
    model.fix(id, value)?;
    Ok(id)
}

pub fn check_range(value: f64, lo: f64, hi: f64, what: &str) -> ComponentResult<f64> {
    if value.is_finite() && value >= lo && value <= hi {
        Ok(value)
    } else {
        Err(ComponentError::InvalidArg {
            what: format!("{what} = {value} is outside [{lo}, {hi}]"),
        })
    }
}

pub fn check_positive(value: f64, what: &str) -> ComponentResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ComponentError::InvalidArg {
            what: format!("{what} must be positive, got {value}"),
        })
    }
}

pub fn check_non_negative(value: f64, what: &str) -> ComponentResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ComponentError::InvalidArg {
            what: format!("{what} must be non-negative, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_checks() {
        assert!(check_range(0.5, 0.0, 1.0, "eta").is_ok());
        assert!(check_range(1.5, 0.0, 1.0, "eta").is_err());
        assert!(check_range(f64::NAN, 0.0, 1.0, "eta").is_err());
        assert!(check_positive(0.0, "area").is_err());
    }

    #[test]
    fn fixed_tagged_is_fixed() {
        let mut m = Model::new();
        let a = fixed_tagged(&mut m, "u.area".into(), 30.0, "m2", "area").unwrap();
        assert!(m.is_fixed(a));
        assert_eq!(m.var(a).tag, Some("area"));
        assert_eq!(m.value(a), 30.0);
    }
}
