use rc_model::Model;
use rc_solver::{NewtonSolver, Solver, SolverConfig, SolverError, TerminationStatus};

fn bounded_circle() -> Model {
    // x^2 + y^2 = 25, y = x + 1  -> (3, 4) with x > 0
    let mut m = Model::new();
    let x = m.add_var("x", 10.0, "-").unwrap();
    let y = m.add_var("y", 10.0, "-").unwrap();
    m.set_bounds(x, Some(0.0), None).unwrap();
    m.add_eq("circle", vec![x, y], |v| v[0] * v[0] + v[1] * v[1] - 25.0);
    m.add_eq("line", vec![x, y], |v| v[1] - v[0] - 1.0);
    m
}

#[test]
fn solves_full_model_and_writes_back() {
    let mut m = bounded_circle();
    let solver = NewtonSolver::default();
    let report = solver.solve(&mut m).unwrap();

    assert_eq!(report.status, TerminationStatus::Optimal);
    assert_eq!(report.unknowns, 2);
    let x = m.find("x").unwrap();
    let y = m.find("y").unwrap();
    assert!((m.value(x) - 3.0).abs() < 1e-8);
    assert!((m.value(y) - 4.0).abs() < 1e-8);
}

#[test]
fn scaling_is_transparent_to_the_solution() {
    let mut m = Model::new();
    let p = m.add_var("p", 2.0e5, "Pa").unwrap();
    let w = m.add_var("w", 1.0, "W").unwrap();
    m.set_scale(p, 1e-5).unwrap();
    m.set_scale(w, 1e-3).unwrap();
    let e1 = m.add_eq("p_spec", vec![p], |v| v[0] - 1.5e6);
    let e2 = m.add_eq("work", vec![p, w], |v| 0.8 * v[1] - 0.1 * (v[0] - 1.0e5));
    m.set_eq_scale_var(e1, p);
    m.set_eq_scale_var(e2, w);

    let report = NewtonSolver::default().solve(&mut m).unwrap();
    assert!(report.status.is_optimal());
    assert!((m.value(w) - 0.1 * 1.4e6 / 0.8).abs() < 1e-4);
}

#[test]
fn non_square_systems_are_rejected() {
    let mut m = bounded_circle();
    let x = m.find("x").unwrap();
    m.fix(x, 3.0).unwrap();
    let err = NewtonSolver::default().solve(&mut m).unwrap_err();
    assert_eq!(
        err,
        SolverError::NotSquare {
            equations: 2,
            unknowns: 1
        }
    );
}

#[test]
fn identical_inputs_give_identical_results() {
    let run = || {
        let mut m = bounded_circle();
        NewtonSolver::default().solve(&mut m).unwrap();
        m.values()
    };
    let a = run();
    let b = run();
    assert_eq!(a, b);
}

#[test]
fn forward_differences_also_converge() {
    let mut m = bounded_circle();
    let solver = NewtonSolver::new(SolverConfig {
        central_differences: false,
        ..SolverConfig::default()
    })
    .unwrap();
    assert!(solver.solve(&mut m).unwrap().status.is_optimal());
}
