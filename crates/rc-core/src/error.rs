use thiserror::Error;

pub type RcResult<T> = Result<T, RcError>;

#[derive(Error, Debug)]
pub enum RcError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}
