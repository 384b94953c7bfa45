//! Graph validation logic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rc_core::BlockId;

use crate::error::{GraphError, GraphResult};
use crate::graph::{Arc, Block, Port};

/// Kahn's algorithm; ties go to the block declared first.
pub(crate) fn topological_order(
    blocks: &[Block],
    ports: &[Port],
    arcs: &[Arc],
) -> GraphResult<Vec<BlockId>> {
    let n = blocks.len();
    let mut indegree = vec![0usize; n];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];

    for arc in arcs {
        let src = ports
            .get(arc.source.idx())
            .ok_or(GraphError::InvalidPortRef { port: arc.source })?;
        let dst = ports
            .get(arc.dest.idx())
            .ok_or(GraphError::InvalidPortRef { port: arc.dest })?;
        successors[src.block.idx()].push(dst.block.idx());
        indegree[dst.block.idx()] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
        .filter(|&i| indegree[i] == 0)
        .map(Reverse)
        .collect();
    let mut order = Vec::with_capacity(n);

    while let Some(Reverse(i)) = ready.pop() {
        order.push(blocks[i].id);
        for &j in &successors[i] {
            indegree[j] -= 1;
            if indegree[j] == 0 {
                ready.push(Reverse(j));
            }
        }
    }

    if order.len() != n {
        let stuck = (0..n).find(|&i| indegree[i] > 0).unwrap_or(0);
        return Err(GraphError::Cycle {
            block: blocks[stuck].name.clone(),
        });
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::{Id, PackageId};
    use crate::graph::PortKind;

    fn block(i: u32, name: &str, ports: Vec<u32>) -> Block {
        Block {
            id: Id::from_index(i),
            name: name.into(),
            ports: ports.into_iter().map(Id::from_index).collect(),
        }
    }

    fn port(i: u32, b: u32, kind: PortKind) -> Port {
        Port {
            id: Id::from_index(i),
            block: Id::from_index(b),
            name: format!("p{i}"),
            kind,
            package: PackageId(0),
        }
    }

    fn arc(i: u32, s: u32, d: u32) -> Arc {
        Arc {
            id: Id::from_index(i),
            name: format!("a{i}"),
            source: Id::from_index(s),
            dest: Id::from_index(d),
        }
    }

    #[test]
    fn empty_graph_has_empty_order() {
        assert!(topological_order(&[], &[], &[]).unwrap().is_empty());
    }

    #[test]
    fn downstream_blocks_declared_first_still_sort_last() {
        // "b" is declared before "a" but fed by it
        let blocks = vec![block(0, "b", vec![0]), block(1, "a", vec![1])];
        let ports = vec![port(0, 0, PortKind::Inlet), port(1, 1, PortKind::Outlet)];
        let arcs = vec![arc(0, 1, 0)];
        let order = topological_order(&blocks, &ports, &arcs).unwrap();
        assert_eq!(order, vec![Id::from_index(1), Id::from_index(0)]);
    }

    #[test]
    fn cycles_are_rejected() {
        let blocks = vec![block(0, "x", vec![0, 1]), block(1, "y", vec![2, 3])];
        let ports = vec![
            port(0, 0, PortKind::Inlet),
            port(1, 0, PortKind::Outlet),
            port(2, 1, PortKind::Inlet),
            port(3, 1, PortKind::Outlet),
        ];
        let arcs = vec![arc(0, 1, 2), arc(1, 3, 0)];
        let err = topological_order(&blocks, &ports, &arcs).unwrap_err();
        assert!(matches!(err, GraphError::Cycle { .. }));
    }
}
