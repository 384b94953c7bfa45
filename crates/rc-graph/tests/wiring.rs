//! Integration tests for rc-graph.

use rc_core::PackageId;
use rc_graph::{GraphBuilder, GraphError, PortKind};

const PKG: PackageId = PackageId(0);

fn two_port_block(b: &mut GraphBuilder, name: &str) {
    let id = b.add_block(name).unwrap();
    b.add_port(id, "inlet", PortKind::Inlet, PKG).unwrap();
    b.add_port(id, "outlet", PortKind::Outlet, PKG).unwrap();
}

#[test]
fn feed_pump_membrane_chain_orders_upstream_first() {
    let mut b = GraphBuilder::new();
    let product = b.add_block("product").unwrap();
    b.add_port(product, "inlet", PortKind::Inlet, PKG).unwrap();
    two_port_block(&mut b, "pump");
    let feed = b.add_block("feed").unwrap();
    b.add_port(feed, "outlet", PortKind::Outlet, PKG).unwrap();

    let s1 = b.connect("s01", b.port("feed", "outlet").unwrap(), b.port("pump", "inlet").unwrap());
    let s2 = b.connect("s02", b.port("pump", "outlet").unwrap(), b.port("product", "inlet").unwrap());
    assert!(s1.is_ok() && s2.is_ok());

    let g = b.build().unwrap();
    let names: Vec<&str> = g
        .topo_order()
        .iter()
        .map(|id| g.block(*id).unwrap().name.as_str())
        .collect();
    assert_eq!(names, vec!["feed", "pump", "product"]);

    let pump = g.find_block("pump").unwrap();
    assert_eq!(g.incoming(pump).count(), 1);
    assert_eq!(g.outgoing(pump).next().unwrap().name, "s02");
    assert_eq!(g.open_ports().count(), 0);
}

#[test]
fn duplicate_block_names_are_rejected() {
    let mut b = GraphBuilder::new();
    b.add_block("feed").unwrap();
    assert_eq!(
        b.add_block("feed").unwrap_err(),
        GraphError::DuplicateBlock {
            name: "feed".into()
        }
    );
}

#[test]
fn mismatched_packages_are_rejected() {
    let mut b = GraphBuilder::new();
    let a = b.add_block("a").unwrap();
    let out = b.add_port(a, "outlet", PortKind::Outlet, PackageId(0)).unwrap();
    let c = b.add_block("c").unwrap();
    let inlet = b.add_port(c, "inlet", PortKind::Inlet, PackageId(1)).unwrap();
    let err = b.connect("bad", out, inlet).unwrap_err();
    assert!(matches!(err, GraphError::PackageMismatch { .. }));
    assert!(err.to_string().contains("bad"));
}

#[test]
fn arcs_must_run_outlet_to_inlet() {
    let mut b = GraphBuilder::new();
    two_port_block(&mut b, "x");
    two_port_block(&mut b, "y");
    let err = b
        .connect("rev", b.port("x", "inlet").unwrap(), b.port("y", "outlet").unwrap())
        .unwrap_err();
    assert_eq!(err, GraphError::WrongDirection { arc: "rev".into() });
}

#[test]
fn ports_connect_once() {
    let mut b = GraphBuilder::new();
    two_port_block(&mut b, "x");
    two_port_block(&mut b, "y");
    two_port_block(&mut b, "z");
    let xo = b.port("x", "outlet").unwrap();
    b.connect("a1", xo, b.port("y", "inlet").unwrap()).unwrap();
    let err = b.connect("a2", xo, b.port("z", "inlet").unwrap()).unwrap_err();
    assert_eq!(
        err,
        GraphError::PortAlreadyConnected {
            arc: "a2".into(),
            port: "x.outlet".into()
        }
    );
}

#[test]
fn unknown_ports_are_reported_by_name() {
    let mut b = GraphBuilder::new();
    two_port_block(&mut b, "x");
    assert_eq!(
        b.port("x", "permeate").unwrap_err(),
        GraphError::UnknownPort {
            block: "x".into(),
            port: "permeate".into()
        }
    );
    assert!(matches!(
        b.port("nope", "inlet").unwrap_err(),
        GraphError::UnknownBlock { .. }
    ));
}
