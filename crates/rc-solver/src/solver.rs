use nalgebra::DVector;
use rc_model::{Model, Subsystem};

use crate::config::SolverConfig;
use crate::error::{SolverError, SolverResult};
use crate::jacobian::{central_difference_jacobian, finite_difference_jacobian};
use crate::newton::newton_solve;
use crate::status::SolveReport;

/// Capability for solving square systems of model equations.
///
/// Solved values are written back into the model; the report carries the
/// termination status.
pub trait Solver {
    fn solve_subsystem(&self, model: &mut Model, sub: &Subsystem) -> SolverResult<SolveReport>;

    /// Solve every active equation for every free variable.
    fn solve(&self, model: &mut Model) -> SolverResult<SolveReport> {
        let sub = model.full_subsystem();
        self.solve_subsystem(model, &sub)
    }
}

/// Newton's method in scaled variables.
#[derive(Debug, Clone, Default)]
pub struct NewtonSolver {
    config: SolverConfig,
}

impl NewtonSolver {
    pub fn new(config: SolverConfig) -> SolverResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

impl Solver for NewtonSolver {
    fn solve_subsystem(&self, model: &mut Model, sub: &Subsystem) -> SolverResult<SolveReport> {
        if !sub.is_square() {
            return Err(SolverError::NotSquare {
                equations: sub.equations().len(),
                unknowns: sub.unknowns().len(),
            });
        }
        if sub.is_empty() {
            return Ok(SolveReport::trivial());
        }

        let unknowns = sub.unknowns();
        let equations = sub.equations();
        let n = unknowns.len();

        let vscale: Vec<f64> = unknowns
            .iter()
            .map(|v| model.var(*v).scale_or_one())
            .collect();
        let escale: Vec<f64> = equations.iter().map(|e| model.eq_scale(*e)).collect();
        let bounds: Vec<(f64, f64)> = unknowns
            .iter()
            .zip(&vscale)
            .map(|(v, s)| {
                let var = model.var(*v);
                (
                    var.lower.map_or(f64::NEG_INFINITY, |lo| lo * s),
                    var.upper.map_or(f64::INFINITY, |hi| hi * s),
                )
            })
            .collect();
        let x0 = DVector::from_iterator(
            n,
            unknowns.iter().zip(&vscale).map(|(v, s)| model.value(*v) * s),
        );

        let result = {
            let frozen: &Model = model;
            let base = frozen.values();
            let residual = |xs: &DVector<f64>| -> SolverResult<DVector<f64>> {
                let mut values = base.clone();
                for (i, v) in unknowns.iter().enumerate() {
                    values[v.idx()] = xs[i] / vscale[i];
                }
                Ok(DVector::from_iterator(
                    equations.len(),
                    equations
                        .iter()
                        .zip(&escale)
                        .map(|(e, s)| frozen.eval(*e, &values) * s),
                ))
            };
            let eps = self.config.fd_epsilon;
            let jacobian = |x: &DVector<f64>, r: &DVector<f64>| {
                if self.config.central_differences {
                    central_difference_jacobian(x, r.len(), residual, eps)
                } else {
                    finite_difference_jacobian(x, r, residual, eps)
                }
            };
            let project = |x: &mut DVector<f64>| {
                for (xi, (lo, hi)) in x.iter_mut().zip(&bounds) {
                    *xi = xi.clamp(*lo, *hi);
                }
            };
            newton_solve(x0, residual, jacobian, project, &self.config)?
        };

        for (i, v) in unknowns.iter().enumerate() {
            model
                .set_value(*v, result.x[i] / vscale[i])
                .map_err(|e| SolverError::Numeric {
                    what: e.to_string(),
                })?;
        }

        tracing::debug!(
            unknowns = n,
            iterations = result.iterations,
            residual = result.residual,
            status = %result.status,
            "subsystem solve finished"
        );

        Ok(SolveReport {
            status: result.status,
            iterations: result.iterations,
            residual: result.residual,
            unknowns: n,
        })
    }
}
