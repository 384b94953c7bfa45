use serde::{Deserialize, Serialize};

/// Solver options, passed explicitly to every solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub max_iterations: usize,
    /// Convergence threshold on the largest scaled residual.
    pub tolerance: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    pub max_line_search_iters: usize,
    /// Relative finite-difference step in scaled variables.
    pub fd_epsilon: f64,
    pub central_differences: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-8,
            line_search_beta: 0.5,
            max_line_search_iters: 30,
            fd_epsilon: 1e-7,
            central_differences: true,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), crate::SolverError> {
        let bad = |what: &str| crate::SolverError::InvalidConfig {
            what: what.to_string(),
        };
        if self.max_iterations == 0 {
            return Err(bad("max_iterations must be positive"));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(bad("tolerance must be positive"));
        }
        if !(self.line_search_beta > 0.0 && self.line_search_beta < 1.0) {
            return Err(bad("line_search_beta must lie in (0, 1)"));
        }
        if !(self.fd_epsilon > 0.0 && self.fd_epsilon < 1e-2) {
            return Err(bad("fd_epsilon must lie in (0, 1e-2)"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg: SolverConfig = serde_yaml::from_str("tolerance: 1.0e-10\n").unwrap();
        assert_eq!(cfg.tolerance, 1e-10);
        assert_eq!(cfg.max_iterations, SolverConfig::default().max_iterations);
        cfg.validate().unwrap();
    }

    #[test]
    fn rejects_bad_beta() {
        let cfg = SolverConfig {
            line_search_beta: 1.5,
            ..SolverConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
