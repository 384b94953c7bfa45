//! Flowsheet error types.

use rc_components::ComponentError;
use rc_costing::CostingError;
use rc_graph::GraphError;
use rc_model::ModelError;
use rc_project::ProjectError;
use rc_props::PropsError;
use rc_solver::{SolverError, TerminationStatus};
use rc_surrogate::SurrogateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowsheetError {
    /// Missing input section, missing chemical, bad split fractions, ...
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Wiring error: {0}")]
    Wiring(#[from] GraphError),

    #[error("Solver terminated with status: {status}")]
    NonOptimalTermination { status: TerminationStatus },

    #[error("Initialization of '{block}' failed: {status}")]
    InitializationFailed {
        block: String,
        status: TerminationStatus,
    },

    #[error("Degrees of freedom must be zero before solving, found {dof}")]
    DegreesOfFreedom { dof: i64 },

    #[error("Unit model error: {0}")]
    Component(#[from] ComponentError),

    #[error("Property error: {0}")]
    Props(#[from] PropsError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Costing error: {0}")]
    Costing(#[from] CostingError),

    #[error("Surrogate error: {0}")]
    Surrogate(#[from] SurrogateError),

    #[error("Input document error: {0}")]
    Project(#[from] ProjectError),
}

pub type FlowsheetResult<T> = Result<T, FlowsheetError>;

impl FlowsheetError {
    pub fn configuration(what: impl Into<String>) -> Self {
        FlowsheetError::Configuration { what: what.into() }
    }

    /// Errors caused by the flowsheet's inputs rather than by the numerics.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FlowsheetError::Configuration { .. }
                | FlowsheetError::Wiring(_)
                | FlowsheetError::Project(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_classification() {
        assert!(FlowsheetError::configuration("x").is_configuration());
        assert!(FlowsheetError::Wiring(GraphError::DuplicateBlock { name: "a".into() }).is_configuration());
        assert!(!FlowsheetError::DegreesOfFreedom { dof: 1 }.is_configuration());
    }

    #[test]
    fn status_in_message() {
        let err = FlowsheetError::InitializationFailed {
            block: "ro_train.stage1.ro".into(),
            status: TerminationStatus::MaxIterations,
        };
        let msg = err.to_string();
        assert!(msg.contains("ro_train.stage1.ro"));
        assert!(msg.contains("maximum iterations"));
    }
}
