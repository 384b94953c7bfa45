//! Runs a flowsheet through every stage.

use rc_solver::{NewtonSolver, Solver, SolverConfig};

use crate::conditions::FeedConditions;
use crate::error::FlowsheetResult;
use crate::flowsheet::{Assembled, Flowsheet, Solved, Specified};

/// Scaling → specification → costing → initialization → solve.
#[derive(Debug, Clone, Default)]
pub struct Driver<S: Solver = NewtonSolver> {
    solver: S,
}

impl Driver<NewtonSolver> {
    pub fn new(config: &SolverConfig) -> FlowsheetResult<Self> {
        Ok(Self {
            solver: NewtonSolver::new(config.clone())?,
        })
    }
}

impl<S: Solver> Driver<S> {
    pub fn with_solver(solver: S) -> Self {
        Self { solver }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Drive `fs` to a solution; `attach` runs on the specified flowsheet
    /// before initialization (costing, extra fixes).
    pub fn run<F>(
        &self,
        fs: Flowsheet<Assembled>,
        feeds: &[(&str, FeedConditions)],
        attach: F,
    ) -> FlowsheetResult<Flowsheet<Solved>>
    where
        F: FnOnce(&mut Flowsheet<Specified>) -> FlowsheetResult<()>,
    {
        let span = tracing::info_span!("driver");
        let _guard = span.enter();

        let mut specified = fs.calculate_scaling_factors().specify(feeds)?;
        attach(&mut specified)?;
        let initialized = specified.initialize(&self.solver)?;
        tracing::info!(dof = initialized.degrees_of_freedom(), "initialized flowsheet");
        initialized.solve(&self.solver)
    }

    pub fn run_plain(
        &self,
        fs: Flowsheet<Assembled>,
        feeds: &[(&str, FeedConditions)],
    ) -> FlowsheetResult<Flowsheet<Solved>> {
        self.run(fs, feeds, |_| Ok(()))
    }

    /// Solve again from the current point after changing fixed variables.
    pub fn resolve<F>(&self, fs: Flowsheet<Solved>, respecify: F) -> FlowsheetResult<Flowsheet<Solved>>
    where
        F: FnOnce(&mut Flowsheet<crate::flowsheet::Initialized>) -> FlowsheetResult<()>,
    {
        let mut reopened = fs.respecify();
        respecify(&mut reopened)?;
        reopened.solve(&self.solver)
    }
}
