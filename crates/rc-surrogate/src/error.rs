use thiserror::Error;

pub type SurrogateResult<T> = Result<T, SurrogateError>;

#[derive(Error, Debug)]
pub enum SurrogateError {
    #[error("expected {expected} inputs, got {actual}")]
    InputArity { expected: usize, actual: usize },

    #[error("training data is invalid: {what}")]
    InvalidData { what: String },

    #[error("fit failed: {what}")]
    Fit { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
