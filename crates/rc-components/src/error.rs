//! Error types for unit models.

use rc_core::error::RcError;
use rc_model::ModelError;
use rc_props::PropsError;
use rc_surrogate::SurrogateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComponentError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    /// Required configuration was not supplied.
    #[error("{what}")]
    Missing { what: String },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Property error: {0}")]
    Props(#[from] PropsError),

    #[error("Surrogate error: {0}")]
    Surrogate(#[from] SurrogateError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<ComponentError> for RcError {
    fn from(e: ComponentError) -> Self {
        match e {
            ComponentError::InvalidArg { .. } | ComponentError::Missing { .. } => {
                RcError::InvalidArg { what: "unit model" }
            }
            ComponentError::Model(e) => e.into(),
            ComponentError::Props(e) => e.into(),
            ComponentError::Surrogate(_) => RcError::InvalidArg { what: "surrogate" },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_message_is_verbatim() {
        let err = ComponentError::Missing {
            what: "Must specify a chemical for addition.".into(),
        };
        assert_eq!(err.to_string(), "Must specify a chemical for addition.");
    }

    #[test]
    fn error_conversion() {
        let err = ComponentError::InvalidArg { what: "eta".into() };
        let rc: RcError = err.into();
        assert!(matches!(rc, RcError::InvalidArg { .. }));
    }
}
