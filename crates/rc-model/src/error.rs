use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("variable '{name}' is already defined")]
    DuplicateVariable { name: String },

    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },

    #[error("non-finite value {value} for variable '{name}'")]
    NonFinite { name: String, value: f64 },

    #[error("invalid bounds for '{name}': lower {lower} > upper {upper}")]
    InvalidBounds { name: String, lower: f64, upper: f64 },

    #[error("invalid scaling factor {factor} for '{name}'")]
    InvalidScale { name: String, factor: f64 },
}

pub type ModelResult<T> = Result<T, ModelError>;

impl From<ModelError> for rc_core::RcError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::DuplicateVariable { .. } | ModelError::UnknownVariable { .. } => {
                rc_core::RcError::InvalidArg { what: "model variable" }
            }
            ModelError::NonFinite { .. } => rc_core::RcError::InvalidArg {
                what: "non-finite model variable",
            },
            ModelError::InvalidBounds { .. } | ModelError::InvalidScale { .. } => {
                rc_core::RcError::InvalidArg { what: "variable metadata" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_value_maps_to_invalid_arg() {
        let err = ModelError::NonFinite {
            name: "flow".into(),
            value: f64::NAN,
        };
        let rc: rc_core::RcError = err.into();
        assert!(matches!(
            rc,
            rc_core::RcError::InvalidArg {
                what: "non-finite model variable"
            }
        ));
    }
}
