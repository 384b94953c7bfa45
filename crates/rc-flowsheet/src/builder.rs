//! Flowsheet assembly.

use std::collections::BTreeMap;

use rc_components::{ComponentResult, Unit, UnitOp, common::equate_states};
use rc_core::BlockId;
use rc_graph::GraphBuilder;
use rc_model::{LinearExpr, Model};
use rc_props::PropertyPackage;

use crate::error::{FlowsheetError, FlowsheetResult};
use crate::flowsheet::{Assembled, Flowsheet, Parts};

/// Owns the model and topology while a flowsheet is being assembled.
///
/// Units are built straight into the shared model; wiring mistakes are
/// reported by [`connect`](Self::connect) as they are made.
#[derive(Debug)]
pub struct FlowsheetBuilder {
    model: Model,
    pkg: PropertyPackage,
    graph: GraphBuilder,
    units: Vec<Unit>,
    expressions: BTreeMap<String, LinearExpr>,
}

impl FlowsheetBuilder {
    pub fn new(pkg: PropertyPackage) -> Self {
        Self {
            model: Model::new(),
            pkg,
            graph: GraphBuilder::new(),
            units: Vec::new(),
            expressions: BTreeMap::new(),
        }
    }

    pub fn package(&self) -> &PropertyPackage {
        &self.pkg
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Build a unit named `name` into the model and register its ports.
    ///
    /// Returns a copy of the unit so callers can keep its variable ids.
    pub fn add<U, F>(&mut self, name: &str, build: F) -> FlowsheetResult<U>
    where
        U: Clone + Into<Unit>,
        F: FnOnce(&mut Model, &PropertyPackage, &str) -> ComponentResult<U>,
    {
        self.add_with_package(name, None, build)
    }

    /// Like [`add`](Self::add), with the unit on its own property package.
    pub fn add_with_package<U, F>(
        &mut self,
        name: &str,
        pkg: Option<&PropertyPackage>,
        build: F,
    ) -> FlowsheetResult<U>
    where
        U: Clone + Into<Unit>,
        F: FnOnce(&mut Model, &PropertyPackage, &str) -> ComponentResult<U>,
    {
        if self.graph.find_block(name).is_some() {
            return Err(rc_graph::GraphError::DuplicateBlock {
                name: name.to_string(),
            }
            .into());
        }
        let unit = build(&mut self.model, pkg.unwrap_or(&self.pkg), name)?;
        let stored: Unit = unit.clone().into();
        let block = self.graph.add_block(name)?;
        for port in stored.ports() {
            self.graph
                .add_port(block, port.name.clone(), port.kind, port.state.package)?;
        }
        debug_assert_eq!(block.idx(), self.units.len());
        self.units.push(stored);
        Ok(unit)
    }

    /// Arc from `from = (block, outlet)` to `to = (block, inlet)`.
    pub fn connect(&mut self, from: (&str, &str), to: (&str, &str)) -> FlowsheetResult<()> {
        let source = self.graph.port(from.0, from.1)?;
        let dest = self.graph.port(to.0, to.1)?;
        let name = format!("{}.{}_to_{}.{}", from.0, from.1, to.0, to.1);
        self.graph.connect(name, source, dest)?;
        Ok(())
    }

    /// Named linear expression over model variables, evaluated on demand.
    pub fn add_expression(&mut self, name: impl Into<String>, expr: LinearExpr) -> FlowsheetResult<()> {
        let name = name.into();
        if self.expressions.contains_key(&name) {
            return Err(FlowsheetError::configuration(format!(
                "expression '{name}' is already defined"
            )));
        }
        self.expressions.insert(name, expr);
        Ok(())
    }

    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.graph
            .find_block(name)
            .map(|b: BlockId| &self.units[b.idx()])
    }

    /// Freeze the topology and expand every arc into state equalities.
    pub fn build(self) -> FlowsheetResult<Flowsheet<Assembled>> {
        let Self {
            mut model,
            pkg,
            graph,
            units,
            expressions,
        } = self;
        let graph = graph.build()?;

        let mut arc_eqs = Vec::with_capacity(graph.arcs().len() * 4);
        for arc in graph.arcs() {
            let (Some(src), Some(dst)) = (graph.port(arc.source), graph.port(arc.dest)) else {
                return Err(FlowsheetError::configuration(format!(
                    "arc '{}' refers to a missing port",
                    arc.name
                )));
            };
            let src_state = units[src.block.idx()]
                .port(&src.name)
                .map(|p| p.state.clone());
            let dst_state = units[dst.block.idx()]
                .port(&dst.name)
                .map(|p| p.state.clone());
            let (Some(src_state), Some(dst_state)) = (src_state, dst_state) else {
                return Err(FlowsheetError::configuration(format!(
                    "arc '{}' joins ports without state",
                    arc.name
                )));
            };
            arc_eqs.extend(equate_states(&mut model, &arc.name, &dst_state, &src_state));
        }

        tracing::info!(
            blocks = units.len(),
            arcs = graph.arcs().len(),
            variables = model.num_vars(),
            equations = model.num_eqs(),
            "assembled flowsheet"
        );

        Ok(Flowsheet::from_parts(Parts {
            model,
            pkg,
            graph,
            units,
            arc_eqs,
            expressions,
            costing: None,
            scaling: None,
            last_report: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_components::{Feed, Product, StateJunction};
    use rc_graph::GraphError;
    use rc_props::PackageId;

    fn builder() -> FlowsheetBuilder {
        FlowsheetBuilder::new(PropertyPackage::nacl(PackageId(0)))
    }

    #[test]
    fn duplicate_block_is_a_wiring_error() {
        let mut b = builder();
        b.add("feed", Feed::build).unwrap();
        let err = b.add("feed", Feed::build).unwrap_err();
        assert!(matches!(
            err,
            FlowsheetError::Wiring(GraphError::DuplicateBlock { .. })
        ));
        assert!(err.is_configuration());
    }

    #[test]
    fn unknown_port_rejected() {
        let mut b = builder();
        b.add("feed", Feed::build).unwrap();
        b.add("product", Product::build).unwrap();
        let err = b.connect(("feed", "retentate"), ("product", "inlet")).unwrap_err();
        assert!(matches!(err, FlowsheetError::Wiring(GraphError::UnknownPort { .. })));
    }

    #[test]
    fn arcs_run_outlet_to_inlet() {
        let mut b = builder();
        b.add("feed", Feed::build).unwrap();
        b.add("product", Product::build).unwrap();
        let err = b.connect(("product", "inlet"), ("feed", "outlet")).unwrap_err();
        assert!(matches!(err, FlowsheetError::Wiring(GraphError::WrongDirection { .. })));
    }

    #[test]
    fn port_connects_once() {
        let mut b = builder();
        b.add("feed", Feed::build).unwrap();
        b.add("a", Product::build).unwrap();
        b.add("b", Product::build).unwrap();
        b.connect(("feed", "outlet"), ("a", "inlet")).unwrap();
        let err = b.connect(("feed", "outlet"), ("b", "inlet")).unwrap_err();
        assert!(matches!(
            err,
            FlowsheetError::Wiring(GraphError::PortAlreadyConnected { .. })
        ));
    }

    #[test]
    fn mismatched_packages_rejected() {
        let other = PropertyPackage::nacl(PackageId(1));
        let mut b = builder();
        b.add("feed", Feed::build).unwrap();
        b.add_with_package("junction", Some(&other), StateJunction::build)
            .unwrap();
        let err = b.connect(("feed", "outlet"), ("junction", "inlet")).unwrap_err();
        assert!(matches!(
            err,
            FlowsheetError::Wiring(GraphError::PackageMismatch { .. })
        ));
    }

    #[test]
    fn arcs_expand_into_four_equalities() {
        let mut b = builder();
        b.add("feed", Feed::build).unwrap();
        b.add("junction", StateJunction::build).unwrap();
        b.add("product", Product::build).unwrap();
        b.connect(("feed", "outlet"), ("junction", "inlet")).unwrap();
        b.connect(("junction", "outlet"), ("product", "inlet")).unwrap();
        let fs = b.build().unwrap();
        // 4 junction equalities + 2 arcs x 4
        assert_eq!(fs.model().num_eqs(), 12);
        assert_eq!(fs.arc_equations().len(), 8);
    }
}
