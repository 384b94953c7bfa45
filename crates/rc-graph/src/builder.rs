//! Incremental graph builder.

use rc_core::{ArcId, BlockId, PackageId, PortId};

use crate::error::{GraphError, GraphResult};
use crate::graph::{Arc, Block, Graph, Port, PortKind};
use crate::validate;

/// Builder for a flowsheet topology.
///
/// Wiring mistakes are reported as they are made; `build()` checks the whole
/// graph for cycles and freezes it.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    blocks: Vec<Block>,
    ports: Vec<Port>,
    arcs: Vec<Arc>,
    port_arc: Vec<Option<ArcId>>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_block(&mut self, name: impl Into<String>) -> GraphResult<BlockId> {
        let name = name.into();
        if self.blocks.iter().any(|b| b.name == name) {
            return Err(GraphError::DuplicateBlock { name });
        }
        let id = BlockId::from_index(self.blocks.len() as u32);
        self.blocks.push(Block {
            id,
            name,
            ports: Vec::new(),
        });
        Ok(id)
    }

    pub fn add_port(
        &mut self,
        block: BlockId,
        name: impl Into<String>,
        kind: PortKind,
        package: PackageId,
    ) -> GraphResult<PortId> {
        let name = name.into();
        let owner = self
            .blocks
            .get(block.idx())
            .ok_or_else(|| GraphError::UnknownBlock {
                name: block.to_string(),
            })?;
        if owner.ports.iter().any(|p| self.ports[p.idx()].name == name) {
            return Err(GraphError::DuplicatePort {
                block: owner.name.clone(),
                port: name,
            });
        }
        let id = PortId::from_index(self.ports.len() as u32);
        self.ports.push(Port {
            id,
            block,
            name,
            kind,
            package,
        });
        self.port_arc.push(None);
        self.blocks[block.idx()].ports.push(id);
        Ok(id)
    }

    pub fn find_block(&self, name: &str) -> Option<BlockId> {
        self.blocks.iter().find(|b| b.name == name).map(|b| b.id)
    }

    /// Look up a port by block and port name.
    pub fn port(&self, block: &str, port: &str) -> GraphResult<PortId> {
        let b = self
            .find_block(block)
            .ok_or_else(|| GraphError::UnknownBlock {
                name: block.to_string(),
            })?;
        self.blocks[b.idx()]
            .ports
            .iter()
            .copied()
            .find(|p| self.ports[p.idx()].name == port)
            .ok_or_else(|| GraphError::UnknownPort {
                block: block.to_string(),
                port: port.to_string(),
            })
    }

    /// Connect an outlet port to an inlet port.
    pub fn connect(
        &mut self,
        name: impl Into<String>,
        source: PortId,
        dest: PortId,
    ) -> GraphResult<ArcId> {
        let name = name.into();
        let src = self
            .ports
            .get(source.idx())
            .ok_or(GraphError::InvalidPortRef { port: source })?;
        let dst = self
            .ports
            .get(dest.idx())
            .ok_or(GraphError::InvalidPortRef { port: dest })?;

        if src.kind != PortKind::Outlet || dst.kind != PortKind::Inlet {
            return Err(GraphError::WrongDirection { arc: name });
        }
        if src.block == dst.block {
            return Err(GraphError::SelfLoop {
                arc: name,
                block: src.block,
            });
        }
        if src.package != dst.package {
            return Err(GraphError::PackageMismatch {
                arc: name,
                source: src.package,
                dest: dst.package,
            });
        }
        for p in [source, dest] {
            if self.port_arc[p.idx()].is_some() {
                return Err(GraphError::PortAlreadyConnected {
                    arc: name,
                    port: self.label(p),
                });
            }
        }

        let id = ArcId::from_index(self.arcs.len() as u32);
        self.arcs.push(Arc {
            id,
            name,
            source,
            dest,
        });
        self.port_arc[source.idx()] = Some(id);
        self.port_arc[dest.idx()] = Some(id);
        Ok(id)
    }

    fn label(&self, port: PortId) -> String {
        let p = &self.ports[port.idx()];
        format!("{}.{}", self.blocks[p.block.idx()].name, p.name)
    }

    /// Validate and freeze the topology.
    pub fn build(self) -> GraphResult<Graph> {
        let order = validate::topological_order(&self.blocks, &self.ports, &self.arcs)?;
        Ok(Graph {
            blocks: self.blocks,
            ports: self.ports,
            arcs: self.arcs,
            port_arc: self.port_arc,
            order,
        })
    }
}

