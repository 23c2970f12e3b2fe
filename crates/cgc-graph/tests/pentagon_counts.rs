use cgc_core::CgcError;
use cgc_graph::{directed_cycle, pentagon, DirectedGraph, NodeId};
use proptest::prelude::*;

#[test]
fn pentagon_has_five_nodes_and_edges() {
    let graph = pentagon().unwrap();
    assert_eq!(graph.num_nodes(), 5);
    assert_eq!(graph.num_edges(), 5);
    assert!(graph.is_single_cycle());
    assert!(graph.edges().iter().all(|edge| edge.increment == 1.0));
    assert_eq!(graph.circulation(), 5.0);
}

#[test]
fn pentagon_matches_generic_cycle() {
    assert_eq!(pentagon().unwrap(), directed_cycle(5, 1.0).unwrap());
}

#[test]
fn adjacency_points_from_predecessor() {
    let graph = pentagon().unwrap();
    let adjacency = graph.adjacency_matrix();
    for node in graph.nodes() {
        let preds = graph.predecessors(node);
        assert_eq!(preds.len(), 1);
        let pred = preds[0].as_raw();
        assert_eq!(pred, (node.as_raw() + 4) % 5);
        assert_eq!(adjacency[(node.as_raw(), pred)], 1.0);
        assert_eq!(adjacency.row(node.as_raw()).sum(), 1.0);
    }
}

#[test]
fn rejects_degenerate_edges() {
    let mut graph = DirectedGraph::new();
    let a = graph.add_node();
    let b = graph.add_node();
    assert_eq!(graph.add_edge(a, b, 1.0).unwrap().as_raw(), 0);
    let err = graph.add_edge(a, b, 1.0).unwrap_err();
    assert_eq!(err.code(), "duplicate-edge");
    let err = graph.add_edge(a, a, 1.0).unwrap_err();
    assert_eq!(err.code(), "self-loop");
    let err = graph.add_edge(a, NodeId::from_raw(9), 1.0).unwrap_err();
    match err {
        CgcError::InvalidParameter(info) => {
            assert_eq!(info.code, "unknown-node");
            assert_eq!(info.context.get("node"), Some(&"9".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(graph.add_edge(b, a, f64::NAN).is_err());
}

#[test]
fn single_node_cycle_rejected() {
    assert_eq!(directed_cycle(1, 1.0).unwrap_err().code(), "cycle-too-small");
}

proptest! {
    #[test]
    fn cycles_are_single_loops(n in 2usize..40, increment in -5.0f64..5.0) {
        let graph = directed_cycle(n, increment).unwrap();
        prop_assert!(graph.is_single_cycle());
        prop_assert_eq!(graph.num_edges(), n);
        let adjacency = graph.adjacency_matrix();
        prop_assert_eq!(adjacency.sum(), n as f64);
    }
}
