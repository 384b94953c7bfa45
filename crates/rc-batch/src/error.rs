use rc_flowsheet::FlowsheetError;
use rc_project::ProjectError;
use rc_surrogate::SurrogateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    /// Non-numeric or out-of-range readings where clean data is required.
    #[error("Data quality error: {what}")]
    DataQuality { what: String },

    #[error("Missing column: {column}")]
    MissingColumn { column: String },

    #[error("No usable rows: {what}")]
    NoRows { what: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Surrogate error: {0}")]
    Surrogate(#[from] SurrogateError),

    #[error("Flowsheet error: {0}")]
    Flowsheet(#[from] FlowsheetError),

    #[error("Input document error: {0}")]
    Project(#[from] ProjectError),
}

pub type BatchResult<T> = Result<T, BatchError>;
