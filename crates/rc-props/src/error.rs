//! Property package errors.

use rc_core::RcError;
use rc_model::ModelError;
use thiserror::Error;

pub type PropsResult<T> = Result<T, PropsError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropsError {
    /// Non-physical values (negative flow, concentration, etc.).
    #[error("Non-physical value for {what}: {value}")]
    NonPhysical { what: &'static str, value: f64 },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

impl From<PropsError> for RcError {
    fn from(err: PropsError) -> Self {
        match err {
            PropsError::NonPhysical { what, .. } => RcError::InvalidArg { what },
            PropsError::Model(e) => e.into(),
        }
    }
}
