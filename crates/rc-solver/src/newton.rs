//! Damped Newton iteration with bound projection.

use crate::config::SolverConfig;
use crate::error::SolverResult;
use crate::status::TerminationStatus;
use nalgebra::{DMatrix, DVector};
use rc_core::max_abs;

/// Newton iteration result.
pub struct NewtonResult {
    /// Final iterate
    pub x: DVector<f64>,
    /// Largest residual component at `x`
    pub residual: f64,
    pub iterations: usize,
    pub status: TerminationStatus,
}

/// Newton solver with backtracking line search.
///
/// `project` maps a trial point back into the feasible box before its
/// residual is evaluated.
pub fn newton_solve<F, J, P>(
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    project: P,
    config: &SolverConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
    J: Fn(&DVector<f64>, &DVector<f64>) -> SolverResult<DMatrix<f64>>,
    P: Fn(&mut DVector<f64>),
{
    let mut x = x0;
    project(&mut x);
    let mut r = residual_fn(&x)?;
    let mut r_inf = max_abs(r.as_slice());
    let mut r_norm = r.norm();

    let finish = |x, residual, iterations, status| {
        Ok(NewtonResult {
            x,
            residual,
            iterations,
            status,
        })
    };

    if !r_inf.is_finite() {
        return finish(x, r_inf, 0, TerminationStatus::NonFiniteResidual);
    }

    for iter in 0..config.max_iterations {
        if r_inf < config.tolerance {
            return finish(x, r_inf, iter, TerminationStatus::Optimal);
        }

        let jac = jacobian_fn(&x, &r)?;

        // Solve J * dx = -r
        let dx = match jac.lu().solve(&(-&r)) {
            Some(dx) if dx.iter().all(|v| v.is_finite()) => dx,
            _ => return finish(x, r_inf, iter, TerminationStatus::SingularJacobian),
        };

        let mut alpha = 1.0;
        let mut accepted = None;
        for _ in 0..config.max_line_search_iters {
            let mut x_new = &x + alpha * &dx;
            project(&mut x_new);
            let r_new = residual_fn(&x_new)?;
            let n_new = r_new.norm();
            if n_new.is_finite() && n_new < r_norm {
                accepted = Some((x_new, r_new, n_new));
                break;
            }
            alpha *= config.line_search_beta;
        }

        let Some((x_new, r_new, n_new)) = accepted else {
            return finish(x, r_inf, iter, TerminationStatus::LineSearchFailed);
        };
        x = x_new;
        r = r_new;
        r_norm = n_new;
        r_inf = max_abs(r.as_slice());
        tracing::trace!(iter, residual = r_inf, alpha, "newton step");
    }

    if r_inf < config.tolerance {
        finish(x, r_inf, config.max_iterations, TerminationStatus::Optimal)
    } else {
        finish(
            x,
            r_inf,
            config.max_iterations,
            TerminationStatus::MaxIterations,
        )
    }
}
