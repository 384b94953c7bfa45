//! Core graph data structures.

use rc_core::{ArcId, BlockId, PackageId, PortId};

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    Inlet,
    Outlet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub id: PortId,
    pub block: BlockId,
    pub name: String,
    pub kind: PortKind,
    pub package: PackageId,
}

/// A named unit in the flowsheet (feed, pump, membrane stage, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub name: String,
    pub ports: Vec<PortId>,
}

/// Directed connection from an outlet port to an inlet port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arc {
    pub id: ArcId,
    pub name: String,
    pub source: PortId,
    pub dest: PortId,
}

/// Validated, immutable flowsheet topology.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) blocks: Vec<Block>,
    pub(crate) ports: Vec<Port>,
    pub(crate) arcs: Vec<Arc>,
    /// Arc attached to each port, indexed by port.
    pub(crate) port_arc: Vec<Option<ArcId>>,
    pub(crate) order: Vec<BlockId>,
}

impl Graph {
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.idx())
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id.idx())
    }

    pub fn arc(&self, id: ArcId) -> Option<&Arc> {
        self.arcs.get(id.idx())
    }

    pub fn find_block(&self, name: &str) -> Option<BlockId> {
        self.blocks.iter().find(|b| b.name == name).map(|b| b.id)
    }

    pub fn find_port(&self, block: BlockId, name: &str) -> Option<PortId> {
        self.block(block)?
            .ports
            .iter()
            .copied()
            .find(|p| self.ports[p.idx()].name == name)
    }

    /// The arc attached to a port, if any.
    pub fn port_arc(&self, port: PortId) -> Option<&Arc> {
        self.port_arc
            .get(port.idx())
            .copied()
            .flatten()
            .map(|a| &self.arcs[a.idx()])
    }

    /// Blocks ordered so every arc runs from an earlier block to a later one.
    pub fn topo_order(&self) -> &[BlockId] {
        &self.order
    }

    /// Arcs leaving a block, in port declaration order.
    pub fn outgoing(&self, block: BlockId) -> impl Iterator<Item = &Arc> + '_ {
        self.block_arcs(block, PortKind::Outlet)
    }

    /// Arcs entering a block, in port declaration order.
    pub fn incoming(&self, block: BlockId) -> impl Iterator<Item = &Arc> + '_ {
        self.block_arcs(block, PortKind::Inlet)
    }

    fn block_arcs(&self, block: BlockId, kind: PortKind) -> impl Iterator<Item = &Arc> + '_ {
        self.blocks[block.idx()]
            .ports
            .iter()
            .filter(move |p| self.ports[p.idx()].kind == kind)
            .filter_map(|p| self.port_arc(*p))
    }

    /// Ports without an arc.
    pub fn open_ports(&self) -> impl Iterator<Item = &Port> + '_ {
        self.ports
            .iter()
            .filter(|p| self.port_arc[p.id.idx()].is_none())
    }

    /// "block.port" label used in messages.
    pub fn port_label(&self, port: PortId) -> String {
        match self.port(port) {
            Some(p) => format!("{}.{}", self.blocks[p.block.idx()].name, p.name),
            None => format!("<port {port}>"),
        }
    }
}
