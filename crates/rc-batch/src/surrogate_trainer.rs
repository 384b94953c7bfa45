//! Fits the UV power surrogate to historical reactor data.

use std::path::Path;

use rc_surrogate::{FitMetrics, RbfOptions, RbfSurrogate, fit_metrics, save_json, split_training_validation};
use serde::{Deserialize, Serialize};

use crate::data::Table;
use crate::error::{BatchError, BatchResult};

/// Which columns to fit and how to clean them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// CSV position of the input column
    pub input_column: usize,
    /// CSV position of the output column
    pub output_column: usize,
    /// Rows with a smaller input are dropped before fitting
    pub min_input: f64,
    /// Only the first rows are used when set
    pub max_rows: Option<usize>,
    pub training_fraction: f64,
    pub options: RbfOptions,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            input_column: 1,
            output_column: 3,
            min_input: 1.0,
            max_rows: None,
            training_fraction: 0.8,
            options: RbfOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub input_label: String,
    pub output_label: String,
    pub rows_read: usize,
    pub rows_used: usize,
    pub training_rows: usize,
    pub validation: Option<FitMetrics>,
}

/// Every reading of `name` must be a non-negative number.
fn clean_column(table: &Table, name: &str) -> BatchResult<Vec<f64>> {
    table
        .column(name)?
        .iter()
        .enumerate()
        .map(|(row, v)| match v {
            Some(x) if *x >= 0.0 => Ok(*x),
            Some(x) => Err(BatchError::DataQuality {
                what: format!("'{name}' is negative ({x}) in row {row}"),
            }),
            None => Err(BatchError::DataQuality {
                what: format!("'{name}' is not numeric in row {row}"),
            }),
        })
        .collect()
}

pub fn train_surrogate(table: &Table, config: &TrainerConfig) -> BatchResult<(RbfSurrogate, TrainingReport)> {
    let label = |index: usize| {
        table.header(index).map(str::to_string).ok_or_else(|| BatchError::MissingColumn {
            column: format!("#{index}"),
        })
    };
    let (input_label, output_label) = (label(config.input_column)?, label(config.output_column)?);

    let data = match config.max_rows {
        Some(n) => table.head(n),
        None => table.clone(),
    };
    let rows_read = data.len();
    let xs = clean_column(&data, &input_label)?;
    let ys = clean_column(&data, &output_label)?;

    let rows: Vec<(f64, f64)> = xs
        .into_iter()
        .zip(ys)
        .filter(|(x, _)| *x >= config.min_input)
        .collect();
    if rows.len() < 2 {
        return Err(BatchError::NoRows {
            what: format!("{} rows with {input_label} >= {}", rows.len(), config.min_input),
        });
    }
    let dropped = rows_read - rows.len();
    if dropped > 0 {
        tracing::warn!(dropped, min_input = config.min_input, "dropped rows below the minimum input");
    }

    let (training, validation) = split_training_validation(&rows, config.training_fraction, rows_read as u64);
    let to_matrix = |rows: &[(f64, f64)]| -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        rows.iter().map(|(x, y)| (vec![*x], vec![*y])).unzip()
    };
    let (train_x, train_y) = to_matrix(&training);
    let surrogate = RbfSurrogate::fit(
        &train_x,
        &train_y,
        vec![input_label.clone()],
        vec![output_label.clone()],
        config.options.clone(),
    )?;

    let metrics = if validation.is_empty() {
        None
    } else {
        let (val_x, val_y) = to_matrix(&validation);
        fit_metrics(&surrogate, &val_x, &val_y)?.into_iter().next()
    };
    if let Some(m) = &metrics {
        tracing::info!(rmse = m.rmse, r2 = m.r2, samples = m.samples, "validation fit");
    }

    let report = TrainingReport {
        input_label,
        output_label,
        rows_read,
        rows_used: rows.len(),
        training_rows: training.len(),
        validation: metrics,
    };
    Ok((surrogate, report))
}

/// Read `csv`, fit, and write the artifact to `artifact`.
pub fn train_and_save(csv: &Path, artifact: &Path, config: &TrainerConfig) -> BatchResult<TrainingReport> {
    let table = Table::read(csv)?;
    let (surrogate, report) = train_surrogate(&table, config)?;
    save_json(artifact, &surrogate)?;
    tracing::info!(path = %artifact.display(), rows = report.rows_used, "saved surrogate");
    Ok(report)
}
