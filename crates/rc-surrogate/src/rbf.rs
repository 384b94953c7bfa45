//! Radial basis function surrogate.
//!
//! Inputs and outputs are min–max normalized over the training set. The
//! weights solve `(Φ + λI) w = y`, where `Φ_ij = φ(‖x_i − x_j‖)`, one column
//! of `w` per output.

use std::cmp::Ordering;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{SurrogateError, SurrogateResult};
use crate::traits::Surrogate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasisFunction {
    Linear,
    Cubic,
    Gaussian,
}

impl BasisFunction {
    fn eval(self, r: f64, shape: f64) -> f64 {
        match self {
            BasisFunction::Linear => r,
            BasisFunction::Cubic => r * r * r,
            BasisFunction::Gaussian => (-(r * r) / (shape * shape)).exp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RbfOptions {
    pub basis_function: BasisFunction,
    /// Ridge term added to the interpolation matrix diagonal.
    pub regularization: f64,
    /// Width of the Gaussian basis in normalized units.
    pub shape: f64,
}

impl Default for RbfOptions {
    fn default() -> Self {
        Self {
            basis_function: BasisFunction::Linear,
            regularization: 1e-3,
            shape: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RbfSurrogate {
    kind: String,
    input_labels: Vec<String>,
    output_labels: Vec<String>,
    input_bounds: Vec<(f64, f64)>,
    output_bounds: Vec<(f64, f64)>,
    options: RbfOptions,
    /// Normalized unique training inputs.
    centres: Vec<Vec<f64>>,
    /// `weights[output][centre]`
    weights: Vec<Vec<f64>>,
    training_inputs: Vec<Vec<f64>>,
    training_outputs: Vec<Vec<f64>>,
}

const KIND: &str = "rbf";

impl RbfSurrogate {
    /// Fit to rows of `inputs` and `outputs`.
    ///
    /// Rows with identical inputs are merged and their outputs averaged.
    pub fn fit(
        inputs: &[Vec<f64>],
        outputs: &[Vec<f64>],
        input_labels: Vec<String>,
        output_labels: Vec<String>,
        options: RbfOptions,
    ) -> SurrogateResult<Self> {
        let n_in = input_labels.len();
        let n_out = output_labels.len();
        check_rows(inputs, outputs, n_in, n_out)?;
        if !(options.regularization >= 0.0 && options.shape > 0.0) {
            return Err(SurrogateError::Fit {
                what: "regularization must be non-negative and shape positive".into(),
            });
        }

        let input_bounds = column_bounds(inputs, n_in);
        let output_bounds = column_bounds(outputs, n_out);
        let (unique_x, unique_y) = merge_duplicates(inputs, outputs);

        let centres: Vec<Vec<f64>> = unique_x
            .iter()
            .map(|x| normalize(x, &input_bounds))
            .collect();
        let n = centres.len();

        let mut phi = DMatrix::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                let r = distance(&centres[i], &centres[j]);
                phi[(i, j)] = options.basis_function.eval(r, options.shape);
            }
            phi[(i, i)] += options.regularization;
        }
        let mut rhs = DMatrix::zeros(n, n_out);
        for (i, y) in unique_y.iter().enumerate() {
            let yn = normalize(y, &output_bounds);
            for k in 0..n_out {
                rhs[(i, k)] = yn[k];
            }
        }

        let w = phi.lu().solve(&rhs).ok_or_else(|| SurrogateError::Fit {
            what: "interpolation matrix is singular".into(),
        })?;
        if w.iter().any(|v| !v.is_finite()) {
            return Err(SurrogateError::Fit {
                what: "non-finite weights".into(),
            });
        }
        let weights = (0..n_out)
            .map(|k| w.column(k).iter().copied().collect())
            .collect();

        tracing::info!(
            centres = n,
            rows = inputs.len(),
            basis = ?options.basis_function,
            "fitted rbf surrogate"
        );

        Ok(Self {
            kind: KIND.to_string(),
            input_labels,
            output_labels,
            input_bounds,
            output_bounds,
            options,
            centres,
            weights,
            training_inputs: inputs.to_vec(),
            training_outputs: outputs.to_vec(),
        })
    }

    pub fn options(&self) -> &RbfOptions {
        &self.options
    }

    pub fn training_inputs(&self) -> &[Vec<f64>] {
        &self.training_inputs
    }

    pub fn training_outputs(&self) -> &[Vec<f64>] {
        &self.training_outputs
    }

    pub fn output_bounds(&self) -> &[(f64, f64)] {
        &self.output_bounds
    }

    /// Structural consistency of a deserialized artifact.
    pub fn check(&self) -> SurrogateResult<()> {
        let bad = |what: &str| SurrogateError::InvalidData {
            what: what.to_string(),
        };
        if self.kind != KIND {
            return Err(bad("artifact is not an rbf surrogate"));
        }
        if self.input_bounds.len() != self.input_labels.len()
            || self.output_bounds.len() != self.output_labels.len()
        {
            return Err(bad("bounds do not match labels"));
        }
        if self.weights.len() != self.output_labels.len()
            || self.weights.iter().any(|w| w.len() != self.centres.len())
        {
            return Err(bad("weights do not match centres"));
        }
        if self
            .centres
            .iter()
            .any(|c| c.len() != self.input_labels.len())
        {
            return Err(bad("centre dimension does not match inputs"));
        }
        Ok(())
    }
}

impl Surrogate for RbfSurrogate {
    fn input_labels(&self) -> &[String] {
        &self.input_labels
    }

    fn output_labels(&self) -> &[String] {
        &self.output_labels
    }

    fn input_bounds(&self) -> &[(f64, f64)] {
        &self.input_bounds
    }

    fn evaluate(&self, inputs: &[f64]) -> SurrogateResult<Vec<f64>> {
        if inputs.len() != self.input_labels.len() {
            return Err(SurrogateError::InputArity {
                expected: self.input_labels.len(),
                actual: inputs.len(),
            });
        }
        let xn = normalize(inputs, &self.input_bounds);
        let basis: Vec<f64> = self
            .centres
            .iter()
            .map(|c| {
                self.options
                    .basis_function
                    .eval(distance(&xn, c), self.options.shape)
            })
            .collect();
        Ok(self
            .weights
            .iter()
            .zip(&self.output_bounds)
            .map(|(w, (lo, hi))| {
                let yn: f64 = w.iter().zip(&basis).map(|(a, b)| a * b).sum();
                lo + yn * span(*lo, *hi)
            })
            .collect())
    }
}

fn check_rows(
    inputs: &[Vec<f64>],
    outputs: &[Vec<f64>],
    n_in: usize,
    n_out: usize,
) -> SurrogateResult<()> {
    let bad = |what: String| Err(SurrogateError::InvalidData { what });
    if n_in == 0 || n_out == 0 {
        return bad("at least one input and one output label are required".into());
    }
    if inputs.is_empty() || inputs.len() != outputs.len() {
        return bad(format!(
            "{} input rows and {} output rows",
            inputs.len(),
            outputs.len()
        ));
    }
    for (i, (x, y)) in inputs.iter().zip(outputs).enumerate() {
        if x.len() != n_in || y.len() != n_out {
            return bad(format!("row {i} has the wrong number of columns"));
        }
        if x.iter().chain(y).any(|v| !v.is_finite()) {
            return bad(format!("row {i} has a non-finite value"));
        }
    }
    Ok(())
}

fn column_bounds(rows: &[Vec<f64>], n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|k| {
            rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                (lo.min(r[k]), hi.max(r[k]))
            })
        })
        .collect()
}

fn span(lo: f64, hi: f64) -> f64 {
    if hi > lo { hi - lo } else { 1.0 }
}

fn normalize(x: &[f64], bounds: &[(f64, f64)]) -> Vec<f64> {
    x.iter()
        .zip(bounds)
        .map(|(v, (lo, hi))| (v - lo) / span(*lo, *hi))
        .collect()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

fn cmp_rows(a: &[f64], b: &[f64]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

fn merge_duplicates(inputs: &[Vec<f64>], outputs: &[Vec<f64>]) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let mut order: Vec<usize> = (0..inputs.len()).collect();
    order.sort_by(|&a, &b| cmp_rows(&inputs[a], &inputs[b]));

    let mut xs: Vec<Vec<f64>> = Vec::new();
    let mut ys: Vec<Vec<f64>> = Vec::new();
    let mut counts: Vec<f64> = Vec::new();
    for i in order {
        match xs.last() {
            Some(last) if cmp_rows(last, &inputs[i]) == Ordering::Equal => {
                if let (Some(y), Some(c)) = (ys.last_mut(), counts.last_mut()) {
                    for (s, v) in y.iter_mut().zip(&outputs[i]) {
                        *s += v;
                    }
                    *c += 1.0;
                }
            }
            _ => {
                xs.push(inputs[i].clone());
                ys.push(outputs[i].clone());
                counts.push(1.0);
            }
        }
    }
    for (y, c) in ys.iter_mut().zip(&counts) {
        for v in y.iter_mut() {
            *v /= c;
        }
    }
    (xs, ys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line_data() -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let xs: Vec<Vec<f64>> = (0..21).map(|i| vec![1.0 + 0.2 * i as f64]).collect();
        let ys: Vec<Vec<f64>> = xs.iter().map(|x| vec![15.0 + 32.0 * x[0]]).collect();
        (xs, ys)
    }

    fn labels(s: &str) -> Vec<String> {
        vec![s.to_string()]
    }

    #[test]
    fn reproduces_training_points() {
        let (xs, ys) = line_data();
        let opts = RbfOptions {
            regularization: 1e-10,
            ..RbfOptions::default()
        };
        let s = RbfSurrogate::fit(&xs, &ys, labels("mgd"), labels("kw"), opts).unwrap();
        for (x, y) in xs.iter().zip(&ys) {
            assert_relative_eq!(s.evaluate(x).unwrap()[0], y[0], max_relative = 1e-6);
        }
        assert_eq!(s.input_bounds(), &[(1.0, 5.0)]);
        assert!(s.in_bounds(&[1.757]));
        assert!(!s.in_bounds(&[0.5]));
    }

    #[test]
    fn linear_basis_interpolates_between_points() {
        let (xs, ys) = line_data();
        let s = RbfSurrogate::fit(&xs, &ys, labels("mgd"), labels("kw"), RbfOptions::default())
            .unwrap();
        let y = s.evaluate(&[1.757]).unwrap()[0];
        assert_relative_eq!(y, 15.0 + 32.0 * 1.757, max_relative = 0.01);
    }

    #[test]
    fn duplicate_inputs_are_averaged() {
        let xs = vec![vec![1.0], vec![2.0], vec![2.0], vec![3.0]];
        let ys = vec![vec![1.0], vec![2.0], vec![4.0], vec![3.0]];
        let s = RbfSurrogate::fit(
            &xs,
            &ys,
            labels("x"),
            labels("y"),
            RbfOptions {
                regularization: 0.0,
                ..RbfOptions::default()
            },
        )
        .unwrap();
        assert_eq!(s.centres.len(), 3);
        assert_relative_eq!(s.evaluate(&[2.0]).unwrap()[0], 3.0, epsilon = 1e-9);
        // raw training rows are kept as given
        assert_eq!(s.training_inputs().len(), 4);
    }

    #[test]
    fn wrong_arity_is_an_error() {
        let (xs, ys) = line_data();
        let s = RbfSurrogate::fit(&xs, &ys, labels("mgd"), labels("kw"), RbfOptions::default())
            .unwrap();
        assert!(matches!(
            s.evaluate(&[1.0, 2.0]),
            Err(SurrogateError::InputArity {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn non_finite_rows_are_rejected() {
        let xs = vec![vec![1.0], vec![f64::NAN]];
        let ys = vec![vec![1.0], vec![2.0]];
        let err = RbfSurrogate::fit(&xs, &ys, labels("x"), labels("y"), RbfOptions::default())
            .unwrap_err();
        assert!(matches!(err, SurrogateError::InvalidData { .. }));
    }

    #[test]
    fn gaussian_and_cubic_bases_fit() {
        let (xs, ys) = line_data();
        for basis in [BasisFunction::Gaussian, BasisFunction::Cubic] {
            let opts = RbfOptions {
                basis_function: basis,
                regularization: 1e-8,
                shape: 0.3,
            };
            let s = RbfSurrogate::fit(&xs, &ys, labels("x"), labels("y"), opts).unwrap();
            assert_relative_eq!(s.evaluate(&xs[10]).unwrap()[0], ys[10][0], max_relative = 1e-3);
        }
    }
}
