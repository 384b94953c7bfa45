//! Sequential block initialization.

use std::collections::HashSet;

use rc_components::UnitOp;
use rc_core::{EqId, VarId};
use rc_graph::PortKind;
use rc_solver::Solver;

use crate::error::{FlowsheetError, FlowsheetResult};
use crate::flowsheet::Parts;

/// Walk the blocks upstream to downstream. Each block solves its own
/// equations with its inlet states held, then its outlet states are copied
/// across its outgoing arcs. Whatever is left (the costing block and
/// touched properties outside any unit) is solved last with every process
/// variable held.
pub(crate) fn initialize_sequential(parts: &mut Parts, solver: &dyn Solver) -> FlowsheetResult<()> {
    let order = parts.graph.topo_order().to_vec();
    for block in order {
        let unit = &parts.units[block.idx()];
        let name = unit.name().to_string();
        let hold: Vec<VarId> = unit
            .ports()
            .iter()
            .filter(|p| p.kind == PortKind::Inlet)
            .flat_map(|p| p.state.vars())
            .collect();

        unit.guess_outlets(&mut parts.model, &parts.pkg)?;

        let sub = parts.model.subsystem(unit.equations(), &hold);
        if !sub.is_square() {
            return Err(FlowsheetError::configuration(format!(
                "block '{name}' is not square with its inlets held: {} equations, {} unknowns",
                sub.equations().len(),
                sub.unknowns().len()
            )));
        }
        let report = solver.solve_subsystem(&mut parts.model, &sub)?;
        if !report.status.is_optimal() {
            tracing::warn!(block = %name, status = %report.status, residual = report.residual, "block initialization failed");
            return Err(FlowsheetError::InitializationFailed {
                block: name,
                status: report.status,
            });
        }
        tracing::debug!(block = %name, iterations = report.iterations, "initialized block");

        let arcs: Vec<_> = parts
            .graph
            .outgoing(block)
            .map(|a| (a.source, a.dest))
            .collect();
        for (source, dest) in arcs {
            let (Some(src), Some(dst)) = (parts.graph.port(source), parts.graph.port(dest)) else {
                continue;
            };
            let from = parts.units[src.block.idx()].port(&src.name).map(|p| p.state.clone());
            let to = parts.units[dst.block.idx()].port(&dst.name).map(|p| p.state.clone());
            if let (Some(from), Some(to)) = (from, to) {
                parts.pkg.propagate_state(&mut parts.model, &from, &to)?;
            }
        }
    }

    initialize_leftovers(parts, solver)
}

fn initialize_leftovers(parts: &mut Parts, solver: &dyn Solver) -> FlowsheetResult<()> {
    let owned: HashSet<EqId> = parts
        .units
        .iter()
        .flat_map(|u| u.equations().iter().copied())
        .chain(parts.arc_eqs.iter().copied())
        .collect();
    let leftover: Vec<EqId> = parts.model.eq_ids().filter(|e| !owned.contains(e)).collect();
    if leftover.is_empty() {
        return Ok(());
    }
    let mut process_vars: Vec<VarId> = owned
        .iter()
        .flat_map(|e| parts.model.equation(*e).vars().iter().copied())
        .collect();
    process_vars.sort_by_key(|v| v.idx());
    process_vars.dedup();

    let sub = parts.model.subsystem(&leftover, &process_vars);
    let report = solver.solve_subsystem(&mut parts.model, &sub)?;
    if !report.status.is_optimal() {
        let block = parts
            .costing
            .as_ref()
            .map_or("flowsheet", |c| c.prefix())
            .to_string();
        return Err(FlowsheetError::InitializationFailed {
            block,
            status: report.status,
        });
    }
    tracing::debug!(
        equations = sub.equations().len(),
        iterations = report.iterations,
        "initialized costing and derived properties"
    );
    Ok(())
}
