use crate::error::{SurrogateError, SurrogateResult};
use crate::traits::Surrogate;

/// Goodness of fit for one output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitMetrics {
    pub rmse: f64,
    pub r2: f64,
    pub samples: usize,
}

/// RMSE and R² of every output over a data set.
pub fn fit_metrics(
    surrogate: &dyn Surrogate,
    inputs: &[Vec<f64>],
    outputs: &[Vec<f64>],
) -> SurrogateResult<Vec<FitMetrics>> {
    if inputs.len() != outputs.len() || inputs.is_empty() {
        return Err(SurrogateError::InvalidData {
            what: format!(
                "{} input rows and {} output rows",
                inputs.len(),
                outputs.len()
            ),
        });
    }
    let n_out = surrogate.output_labels().len();
    let predicted = inputs
        .iter()
        .map(|x| surrogate.evaluate(x))
        .collect::<SurrogateResult<Vec<_>>>()?;

    let n = inputs.len() as f64;
    let metrics = (0..n_out)
        .map(|k| {
            let mean = outputs.iter().map(|y| y[k]).sum::<f64>() / n;
            let ss_res: f64 = outputs
                .iter()
                .zip(&predicted)
                .map(|(y, p)| (y[k] - p[k]).powi(2))
                .sum();
            let ss_tot: f64 = outputs.iter().map(|y| (y[k] - mean).powi(2)).sum();
            FitMetrics {
                rmse: (ss_res / n).sqrt(),
                r2: if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 },
                samples: inputs.len(),
            }
        })
        .collect();
    Ok(metrics)
}
