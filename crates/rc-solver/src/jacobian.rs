//! Finite difference Jacobian computation.

use crate::error::SolverResult;
use nalgebra::{DMatrix, DVector};

/// Forward differences: column j is (f(x + h e_j) - f(x)) / h.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f_x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    let m = f_x.len();
    let mut jac = DMatrix::zeros(m, n);
    let mut xp = x.clone();

    for j in 0..n {
        let dx = epsilon * x[j].abs().max(1.0);
        xp[j] = x[j] + dx;
        let fp = f(&xp)?;
        xp[j] = x[j];
        jac.set_column(j, &((fp - f_x) / dx));
    }

    Ok(jac)
}

/// Central differences (second order, twice the evaluations).
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    m: usize,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    let mut jac = DMatrix::zeros(m, n);
    let mut xs = x.clone();

    for j in 0..n {
        let dx = epsilon * x[j].abs().max(1.0);
        xs[j] = x[j] + dx;
        let f_plus = f(&xs)?;
        xs[j] = x[j] - dx;
        let f_minus = f(&xs)?;
        xs[j] = x[j];
        jac.set_column(j, &((f_plus - f_minus) / (2.0 * dx)));
    }

    Ok(jac)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        Ok(DVector::from_vec(vec![x[0] * x[0], x[0] * x[1]]))
    }

    #[test]
    fn forward_matches_analytic() {
        let x = DVector::from_vec(vec![3.0, 2.0]);
        let fx = quad(&x).unwrap();
        let jac = finite_difference_jacobian(&x, &fx, quad, 1e-7).unwrap();
        assert!((jac[(0, 0)] - 6.0).abs() < 1e-5);
        assert!(jac[(0, 1)].abs() < 1e-9);
        assert!((jac[(1, 0)] - 2.0).abs() < 1e-5);
        assert!((jac[(1, 1)] - 3.0).abs() < 1e-5);
    }

    #[test]
    fn central_is_exact_for_quadratics() {
        let x = DVector::from_vec(vec![3.0, 2.0]);
        let jac = central_difference_jacobian(&x, 2, quad, 1e-5).unwrap();
        assert!((jac[(0, 0)] - 6.0).abs() < 1e-8);
        assert!((jac[(1, 1)] - 3.0).abs() < 1e-8);
    }
}
