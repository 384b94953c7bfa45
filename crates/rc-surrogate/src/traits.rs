use crate::error::SurrogateResult;

/// A fitted input→output mapping.
pub trait Surrogate: Send + Sync {
    fn input_labels(&self) -> &[String];

    fn output_labels(&self) -> &[String];

    /// Training range of each input as (min, max).
    fn input_bounds(&self) -> &[(f64, f64)];

    fn evaluate(&self, inputs: &[f64]) -> SurrogateResult<Vec<f64>>;

    /// Whether every input lies inside its training range.
    fn in_bounds(&self, inputs: &[f64]) -> bool {
        inputs
            .iter()
            .zip(self.input_bounds())
            .all(|(x, (lo, hi))| (*lo..=*hi).contains(x))
    }

    /// Index of a named output.
    fn output_index(&self, label: &str) -> Option<usize> {
        self.output_labels().iter().position(|l| l == label)
    }
}
