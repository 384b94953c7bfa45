//! Offline jobs over historical plant data: fitting the UV power surrogate
//! and backing membrane permeabilities out of RO logger exports.

pub mod data;
pub mod error;
pub mod membrane;
pub mod surrogate_trainer;

pub use data::Table;
pub use error::{BatchError, BatchResult};
pub use membrane::{
    PropsRow, Readings, RowFilter, StageProps, primary_membrane_props, tertiary_membrane_props, write_csv,
};
pub use surrogate_trainer::{TrainerConfig, TrainingReport, train_and_save, train_surrogate};
