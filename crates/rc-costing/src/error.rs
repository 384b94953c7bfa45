use rc_core::error::RcError;
use rc_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CostingError {
    #[error("Costing already finalized; cannot register flow '{flow}'")]
    Finalized { flow: String },

    #[error("Flow '{flow}' registered with unit cost {new}, already {existing}")]
    ConflictingUnitCost { flow: String, existing: f64, new: f64 },

    #[error("Flow '{flow}' registered as {new:?}, already {existing:?}")]
    ConflictingKind {
        flow: String,
        existing: crate::ledger::FlowKind,
        new: crate::ledger::FlowKind,
    },

    #[error("No cost data for chemical '{name}'")]
    UnknownChemical { name: String },

    #[error("Costing not finalized")]
    NotFinalized,

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Cost database error: {0}")]
    Database(#[from] serde_yaml::Error),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

pub type CostingResult<T> = Result<T, CostingError>;

impl From<CostingError> for RcError {
    fn from(e: CostingError) -> Self {
        match e {
            CostingError::Model(e) => e.into(),
            _ => RcError::InvalidArg { what: "costing" },
        }
    }
}
