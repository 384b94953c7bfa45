//! The staged flowsheet.
//!
//! A flowsheet moves through
//! `Assembled → Scaled → Specified → Initialized → Solved`; each transition
//! consumes the previous value, so calling a stage out of order does not
//! compile.
//!
//! ```compile_fail
//! use rc_flowsheet::{Flowsheet, Assembled};
//! fn skip(fs: Flowsheet<Assembled>, solver: &dyn rc_solver::Solver) {
//!     let _ = fs.solve(solver);
//! }
//! ```

use std::collections::BTreeMap;
use std::marker::PhantomData;

use rc_components::{Unit, UnitOp};
use rc_core::units::VolumeRate;
use rc_core::{EqId, VarId};
use rc_costing::{CostDatabase, LedgerParams, ProcessCosting};
use rc_graph::Graph;
use rc_model::{LinearExpr, Model, ScalingDefaults};
use rc_props::{PropertyPackage, StateBlock, StateValues};
use rc_solver::{SolveReport, Solver};

use crate::conditions::FeedConditions;
use crate::costing::Costing;
use crate::error::{FlowsheetError, FlowsheetResult};
use crate::initialize::initialize_sequential;

mod sealed {
    pub trait Sealed {}
}

/// Marker for a flowsheet stage.
pub trait Stage: sealed::Sealed {
    const NAME: &'static str;
}

macro_rules! stage {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name;
        impl sealed::Sealed for $name {}
        impl Stage for $name {
            const NAME: &'static str = $label;
        }
    };
}

stage!(Assembled, "assembled");
stage!(Scaled, "scaled");
stage!(Specified, "specified");
stage!(Initialized, "initialized");
stage!(Solved, "solved");

#[derive(Debug)]
pub(crate) struct Parts {
    pub(crate) model: Model,
    pub(crate) pkg: PropertyPackage,
    pub(crate) graph: Graph,
    /// Indexed by block id.
    pub(crate) units: Vec<Unit>,
    pub(crate) arc_eqs: Vec<EqId>,
    pub(crate) expressions: BTreeMap<String, LinearExpr>,
    pub(crate) costing: Option<ProcessCosting>,
    pub(crate) scaling: Option<ScalingDefaults>,
    pub(crate) last_report: Option<SolveReport>,
}

impl Parts {
    pub(crate) fn unit(&self, name: &str) -> Option<&Unit> {
        self.graph.find_block(name).map(|b| &self.units[b.idx()])
    }

    pub(crate) fn require(&self, name: &str) -> FlowsheetResult<&Unit> {
        self.unit(name)
            .ok_or_else(|| FlowsheetError::configuration(format!("no block named '{name}'")))
    }
}

#[derive(Debug)]
pub struct Flowsheet<S: Stage> {
    parts: Parts,
    _stage: PhantomData<S>,
}

impl Flowsheet<Assembled> {
    pub(crate) fn from_parts(parts: Parts) -> Self {
        Self {
            parts,
            _stage: PhantomData,
        }
    }

    /// Override a property-package default scaling factor.
    pub fn set_default_scaling(&mut self, tag: &str, factor: f64) {
        self.parts.pkg.set_default_scaling(tag, factor);
    }

    /// Assign tag-based default scaling factors to every variable.
    pub fn calculate_scaling_factors(mut self) -> Flowsheet<Scaled> {
        let mut defaults = self.parts.pkg.default_scaling().clone();
        defaults.merge(&rc_components::default_scaling());
        let missing = self.parts.model.calculate_scaling_factors(&defaults);
        if missing > 0 {
            tracing::debug!(missing, "variables left without a scaling factor");
        }
        self.parts.scaling = Some(defaults);
        self.into_stage()
    }
}

impl Flowsheet<Scaled> {
    /// Fix each named feed's outlet state from plant-unit conditions.
    pub fn specify(mut self, feeds: &[(&str, FeedConditions)]) -> FlowsheetResult<Flowsheet<Specified>> {
        for (name, conditions) in feeds {
            let unit = self.parts.require(name)?;
            let Some(feed) = unit.as_feed() else {
                return Err(FlowsheetError::configuration(format!(
                    "block '{name}' is not a feed"
                )));
            };
            let outlet = feed.outlet().clone();
            let state = conditions.state(self.parts.pkg.params())?;
            self.parts.pkg.fix_state(&mut self.parts.model, &outlet, &state)?;
            tracing::info!(feed = name, %conditions, "specified feed");
        }
        Ok(self.into_stage())
    }
}

impl Flowsheet<Specified> {
    /// Attach a costing ledger, or reopen the one already attached.
    pub fn attach_costing<'a>(
        &'a mut self,
        db: &'a CostDatabase,
        params: &LedgerParams,
    ) -> FlowsheetResult<Costing<'a>> {
        if self.parts.costing.is_none() {
            let ledger = ProcessCosting::build(&mut self.parts.model, "costing", params)?;
            self.parts.costing = Some(ledger);
        }
        Ok(Costing::new(&mut self.parts, db))
    }

    /// Fix an additional design variable.
    pub fn fix(&mut self, var: VarId, value: f64) -> FlowsheetResult<()> {
        self.parts.model.fix(var, value)?;
        Ok(())
    }

    /// Initialize block by block in topological order, then the costing block.
    pub fn initialize(mut self, solver: &dyn Solver) -> FlowsheetResult<Flowsheet<Initialized>> {
        if let Some(defaults) = &self.parts.scaling {
            self.parts.model.calculate_scaling_factors(defaults);
        }
        initialize_sequential(&mut self.parts, solver)?;
        Ok(self.into_stage())
    }
}

impl Flowsheet<Initialized> {
    /// Check degrees of freedom, solve, and require optimal termination.
    pub fn solve(mut self, solver: &dyn Solver) -> FlowsheetResult<Flowsheet<Solved>> {
        let dof = self.parts.model.degrees_of_freedom();
        if dof != 0 {
            return Err(FlowsheetError::DegreesOfFreedom { dof });
        }
        let report = solver.solve(&mut self.parts.model)?;
        if !report.status.is_optimal() {
            tracing::warn!(status = %report.status, residual = report.residual, "flowsheet solve failed");
            return Err(FlowsheetError::NonOptimalTermination {
                status: report.status,
            });
        }
        tracing::info!(
            iterations = report.iterations,
            unknowns = report.unknowns,
            residual = report.residual,
            "flowsheet solved"
        );
        self.parts.last_report = Some(report);
        Ok(self.into_stage())
    }

    pub fn fix(&mut self, var: VarId, value: f64) -> FlowsheetResult<()> {
        self.parts.model.fix(var, value)?;
        Ok(())
    }

    pub fn unfix(&mut self, var: VarId) {
        self.parts.model.unfix(var);
    }
}

impl Flowsheet<Solved> {
    /// Reopen for re-specification; the solved point becomes the initial point.
    pub fn respecify(self) -> Flowsheet<Initialized> {
        self.into_stage()
    }

    pub fn report(&self) -> Option<&SolveReport> {
        self.parts.last_report.as_ref()
    }
}

impl<S: Stage> Flowsheet<S> {
    fn into_stage<T: Stage>(self) -> Flowsheet<T> {
        tracing::debug!(from = S::NAME, to = T::NAME, "flowsheet stage");
        Flowsheet {
            parts: self.parts,
            _stage: PhantomData,
        }
    }

    pub fn stage(&self) -> &'static str {
        S::NAME
    }

    pub fn model(&self) -> &Model {
        &self.parts.model
    }

    pub fn package(&self) -> &PropertyPackage {
        &self.parts.pkg
    }

    pub fn graph(&self) -> &Graph {
        &self.parts.graph
    }

    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.parts.unit(name)
    }

    pub fn units(&self) -> &[Unit] {
        &self.parts.units
    }

    pub fn arc_equations(&self) -> &[EqId] {
        &self.parts.arc_eqs
    }

    pub fn value(&self, var: VarId) -> f64 {
        self.parts.model.value(var)
    }

    pub fn expression(&self, name: &str) -> Option<f64> {
        self.parts
            .expressions
            .get(name)
            .map(|e| e.eval(&self.parts.model))
    }

    pub fn costing(&self) -> Option<&ProcessCosting> {
        self.parts.costing.as_ref()
    }

    pub fn degrees_of_freedom(&self) -> i64 {
        self.parts.model.degrees_of_freedom()
    }

    /// State behind `block.port`.
    pub fn port_state(&self, block: &str, port: &str) -> Option<&StateBlock> {
        self.unit(block)?.port(port).map(|p| &p.state)
    }

    pub fn state_values(&self, block: &str, port: &str) -> Option<StateValues> {
        let sb = self.port_state(block, port)?;
        Some(self.parts.pkg.read_state(&self.parts.model, sb))
    }

    pub fn flow_vol(&self, block: &str, port: &str) -> Option<VolumeRate> {
        self.state_values(block, port)
            .map(|s| s.flow_vol(self.parts.pkg.params()))
    }
}
