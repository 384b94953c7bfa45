//! rc-graph: flowsheet topology.
//!
//! Provides:
//! - Blocks with named, directed ports tied to a property package
//! - Arcs from outlet ports to inlet ports
//! - A builder that validates wiring and freezes an immutable [`Graph`]
//!   with a deterministic upstream-to-downstream block order
//!
//! # Example
//!
//! ```
//! use rc_core::PackageId;
//! use rc_graph::{GraphBuilder, PortKind};
//!
//! let pkg = PackageId(0);
//! let mut builder = GraphBuilder::new();
//! let feed = builder.add_block("feed").unwrap();
//! let out = builder.add_port(feed, "outlet", PortKind::Outlet, pkg).unwrap();
//! let product = builder.add_block("product").unwrap();
//! let inlet = builder.add_port(product, "inlet", PortKind::Inlet, pkg).unwrap();
//! builder.connect("feed_to_product", out, inlet).unwrap();
//! let graph = builder.build().unwrap();
//!
//! assert_eq!(graph.topo_order(), &[feed, product]);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub(crate) mod validate;

pub use builder::GraphBuilder;
pub use error::{GraphError, GraphResult};
pub use graph::{Arc, Block, Graph, Port, PortKind};
