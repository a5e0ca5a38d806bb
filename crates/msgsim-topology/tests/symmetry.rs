//! Property tests: neighbor symmetry and edge accounting for arbitrary
//! valid edge lists.

use std::collections::BTreeSet;

use msgsim_core::NodeId;
use msgsim_topology::{Topology, TopologyError};
use proptest::prelude::*;

/// Random simple graph: `n` nodes, a deduplicated set of non-loop edges,
/// each emitted in a random orientation.
fn arb_graph() -> impl Strategy<Value = (usize, Vec<(NodeId, NodeId)>)> {
    (1usize..24).prop_flat_map(|n| {
        let pairs = proptest::collection::vec((0..n as u32, 0..n as u32, any::<bool>()), 0..64);
        (Just(n), pairs).prop_map(|(n, pairs)| {
            let mut seen = BTreeSet::new();
            let mut edges = Vec::new();
            for (a, b, flip) in pairs {
                if a == b {
                    continue;
                }
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    let e = if flip { (b, a) } else { (a, b) };
                    edges.push((NodeId(e.0), NodeId(e.1)));
                }
            }
            (n, edges)
        })
    })
}

proptest! {
    #[test]
    fn neighbor_relation_is_symmetric((n, edges) in arb_graph()) {
        let t = Topology::from_edges(n, &edges).unwrap();
        for a in t.node_ids() {
            for &b in t.neighbors(a) {
                prop_assert!(t.neighbors(b).contains(&a), "{b} lists no back-edge to {a}");
            }
        }
    }

    #[test]
    fn every_listed_edge_is_present_both_ways((n, edges) in arb_graph()) {
        let t = Topology::from_edges(n, &edges).unwrap();
        for &(a, b) in &edges {
            prop_assert!(t.has_edge(a, b));
            prop_assert!(t.has_edge(b, a));
        }
        let degree_sum: usize = t.node_ids().map(|id| t.degree(id)).sum();
        prop_assert_eq!(degree_sum, 2 * edges.len());
        prop_assert_eq!(t.edges().count(), edges.len());
    }

    #[test]
    fn repeating_any_edge_reversed_is_rejected((n, edges) in arb_graph()) {
        prop_assume!(!edges.is_empty());
        let mut dup = edges.clone();
        let (a, b) = edges[0];
        dup.push((b, a));
        let is_duplicate = matches!(
            Topology::from_edges(n, &dup),
            Err(TopologyError::DuplicateEdge { .. })
        );
        prop_assert!(is_duplicate);
    }
}
