//! Integration tests: greedy coloring on assorted graphs.

use msgsim_algorithms::{is_proper, GreedyColoring};
use msgsim_core::{Mode, NodeId};
use msgsim_engine::{RunOutcome, SimConfig, Simulation};
use msgsim_test_utils::{complete_edges, path_edges, ring_edges, star_edges};
use msgsim_topology::Topology;
use proptest::prelude::*;

fn color(n: usize, edges: Vec<(NodeId, NodeId)>, mode: Mode, seed: u64) -> Vec<u32> {
    let topology = Topology::from_edges(n, &edges).unwrap();
    let config =
        SimConfig::uniform(n, edges.clone(), mode, |_, _| GreedyColoring::new()).seed(seed);
    let report = Simulation::run(config).unwrap();

    assert_eq!(report.outcome, RunOutcome::AllTerminated);
    assert!(report.all_published());
    let colors: Vec<u32> = report.results.into_iter().flatten().collect();
    assert!(is_proper(&edges, &colors), "improper coloring {colors:?}");
    let max_degree = topology.max_degree() as u32;
    assert!(colors.iter().all(|&c| c <= max_degree), "{colors:?} exceeds Δ={max_degree}");
    colors
}

#[test]
fn complete_graph_needs_every_color() {
    for mode in [Mode::Sync, Mode::Async] {
        let mut colors = color(5, complete_edges(5), mode, 1);
        colors.sort_unstable();
        assert_eq!(colors, vec![0, 1, 2, 3, 4]);
    }
}

#[test]
fn path_alternates_two_colors() {
    let colors = color(6, path_edges(6), Mode::Sync, 0);
    assert_eq!(colors, vec![1, 0, 1, 0, 1, 0]);
}

#[test]
fn star_and_ring_are_proper() {
    for mode in [Mode::Sync, Mode::Async] {
        color(7, star_edges(7), mode, 2);
        color(8, ring_edges(8), mode, 3);
    }
}

fn arb_graph() -> impl Strategy<Value = (usize, Vec<(NodeId, NodeId)>)> {
    (1usize..12).prop_flat_map(|n| {
        let pairs: Vec<(u32, u32)> = (0..n as u32)
            .flat_map(|a| (a + 1..n as u32).map(move |b| (a, b)))
            .collect();
        let len = pairs.len();
        (Just(n), proptest::sample::subsequence(pairs, 0..=len))
    })
    .prop_map(|(n, pairs)| {
        let edges = pairs.into_iter().map(|(a, b)| (NodeId(a), NodeId(b))).collect();
        (n, edges)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn random_graphs_get_proper_colorings(
        (n, edges) in arb_graph(),
        seed in any::<u64>(),
        sync in any::<bool>(),
    ) {
        let mode = if sync { Mode::Sync } else { Mode::Async };
        color(n, edges, mode, seed);
    }
}
