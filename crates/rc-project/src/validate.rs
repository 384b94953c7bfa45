//! Input document validation.

use std::collections::HashSet;

use crate::schema::{InputDocument, MembraneDef, PumpDef};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate name: {name} in {context}")]
    DuplicateName { name: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Empty section: {section}")]
    Empty { section: String },
}

fn invalid(field: impl Into<String>, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn in_unit_interval(field: String, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be in (0, 1]"))
    }
}

fn positive(field: String, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

fn non_negative(field: String, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be non-negative"))
    }
}

fn validate_pump(ctx: &str, pump: &PumpDef) -> Result<(), ValidationError> {
    in_unit_interval(format!("{ctx}.pump.efficiency"), pump.efficiency)?;
    match (pump.outlet_pressure_psi, pump.delta_p_psi) {
        (Some(p), None) => positive(format!("{ctx}.pump.outlet_pressure_psi"), p),
        (None, Some(dp)) => {
            if dp.is_finite() {
                Ok(())
            } else {
                Err(invalid(format!("{ctx}.pump.delta_p_psi"), dp, "must be finite"))
            }
        }
        _ => Err(ValidationError::InvalidValue {
            field: format!("{ctx}.pump"),
            value: "outlet_pressure_psi/delta_p_psi".to_string(),
            reason: "exactly one pressure spec is required".to_string(),
        }),
    }
}

fn validate_membrane(ctx: &str, m: &MembraneDef) -> Result<(), ValidationError> {
    positive(format!("{ctx}.membrane.area_m2"), m.area_m2)?;
    non_negative(format!("{ctx}.membrane.a_comp"), m.a_comp)?;
    non_negative(format!("{ctx}.membrane.b_comp"), m.b_comp)?;
    positive(format!("{ctx}.membrane.permeate_pressure_pa"), m.permeate_pressure_pa)?;
    if !m.delta_p_psi.is_finite() {
        return Err(invalid(format!("{ctx}.membrane.delta_p_psi"), m.delta_p_psi, "must be finite"));
    }
    Ok(())
}

pub fn validate_document(doc: &InputDocument) -> Result<(), ValidationError> {
    if let Some(ro) = &doc.ro_train {
        if ro.stages.is_empty() {
            return Err(ValidationError::Empty {
                section: "ro_train.stages".to_string(),
            });
        }
        let mut names = HashSet::new();
        for stage in &ro.stages {
            if !names.insert(stage.name.as_str()) {
                return Err(ValidationError::DuplicateName {
                    name: stage.name.clone(),
                    context: "ro_train.stages".to_string(),
                });
            }
            let ctx = format!("ro_train.{}", stage.name);
            validate_pump(&ctx, &stage.pump)?;
            validate_membrane(&ctx, &stage.membrane)?;
        }
    }

    if let Some(uf) = &doc.uf_train {
        validate_pump("uf_train", &uf.pump)?;
        in_unit_interval("uf_train.unit.recovery".to_string(), uf.unit.recovery)?;
        let rej = uf.unit.salt_rejection;
        if !(0.0..=1.0).contains(&rej) {
            return Err(invalid("uf_train.unit.salt_rejection", rej, "must be in [0, 1]"));
        }
    }

    if let Some(uv) = &doc.uv_aop
        && uv.surrogate.trim().is_empty()
    {
        return Err(ValidationError::Empty {
            section: "uv_aop.surrogate".to_string(),
        });
    }

    if let Some(chem) = &doc.chemical_addition {
        positive("chemical_addition.lift_height_m".to_string(), chem.lift_height_m)?;
        in_unit_interval("chemical_addition.pump_efficiency".to_string(), chem.pump_efficiency)?;
        for (name, dose) in &chem.chemicals {
            non_negative(format!("chemical_addition.{name}.dose_mg_per_l"), dose.dose_mg_per_l)?;
            if let Some(p) = dose.purity {
                in_unit_interval(format!("chemical_addition.{name}.purity"), p)?;
            }
            if let Some(d) = dose.solution_density {
                positive(format!("chemical_addition.{name}.solution_density"), d)?;
            }
        }
    }

    if let Some(costing) = &doc.costing {
        if let Some(v) = costing.electricity_cost {
            non_negative("costing.electricity_cost".to_string(), v)?;
        }
        if let Some(v) = costing.utilization_factor {
            in_unit_interval("costing.utilization_factor".to_string(), v)?;
        }
    }

    if let Some(module) = &doc.ro_module {
        validate_membrane("ro_module", &module.membrane)?;
    }

    if let Some(solver) = &doc.solver
        && let Err(e) = solver.validate()
    {
        return Err(ValidationError::InvalidValue {
            field: "solver".to_string(),
            value: String::new(),
            reason: e.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RoStageDef, RoTrainDef};

    fn stage(name: &str) -> RoStageDef {
        RoStageDef {
            name: name.to_string(),
            pump: PumpDef {
                efficiency: 0.8,
                outlet_pressure_psi: Some(151.0),
                delta_p_psi: None,
            },
            membrane: MembraneDef {
                area_m2: 30_000.0,
                a_comp: 4.2e-12,
                b_comp: 3.5e-8,
                delta_p_psi: -25.0,
                permeate_pressure_pa: 101_325.0,
            },
        }
    }

    #[test]
    fn duplicate_stage_names_rejected() {
        let doc = InputDocument {
            ro_train: Some(RoTrainDef {
                stages: vec![stage("stage1"), stage("stage1")],
            }),
            ..Default::default()
        };
        assert!(matches!(
            validate_document(&doc),
            Err(ValidationError::DuplicateName { .. })
        ));
    }

    #[test]
    fn empty_stage_list_rejected() {
        let doc = InputDocument {
            ro_train: Some(RoTrainDef { stages: vec![] }),
            ..Default::default()
        };
        assert!(matches!(validate_document(&doc), Err(ValidationError::Empty { .. })));
    }

    #[test]
    fn pump_needs_exactly_one_pressure_spec() {
        let mut s = stage("stage1");
        s.pump.delta_p_psi = Some(10.0);
        let doc = InputDocument {
            ro_train: Some(RoTrainDef { stages: vec![s] }),
            ..Default::default()
        };
        assert!(validate_document(&doc).is_err());
    }

    #[test]
    fn bad_efficiency_rejected() {
        let mut s = stage("stage1");
        s.pump.efficiency = 0.0;
        let doc = InputDocument {
            ro_train: Some(RoTrainDef { stages: vec![s] }),
            ..Default::default()
        };
        let err = validate_document(&doc).unwrap_err();
        assert!(err.to_string().contains("efficiency"));
    }
}
