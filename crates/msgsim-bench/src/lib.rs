//! Benchmark profiles for the msgsim simulator.
//!
//! - [`election_profile`]: ring election on an `n`-node ring
//! - [`coloring_profile`]: greedy coloring on a circulant graph of degree 4

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use msgsim_algorithms::{GreedyColoring, RingElection};
use msgsim_core::{Mode, NodeId};
use msgsim_engine::SimConfig;

/// Ring election over `n` nodes arranged in id order.
pub fn election_profile(n: usize, mode: Mode, seed: u64) -> SimConfig<RingElection> {
    let edges = (0..n)
        .map(|i| (NodeId(i as u32), NodeId(((i + 1) % n) as u32)))
        .collect();
    SimConfig::uniform(n, edges, mode, |_, _| RingElection::new()).seed(seed)
}

/// Greedy coloring over a circulant graph: node `i` is linked to `i ± 1`
/// and `i ± 2`. Needs `n >= 5`.
pub fn coloring_profile(n: usize, mode: Mode, seed: u64) -> SimConfig<GreedyColoring> {
    let edges = (0..n)
        .flat_map(|i| {
            [1, 2].map(|step| (NodeId(i as u32), NodeId(((i + step) % n) as u32)))
        })
        .collect();
    SimConfig::uniform(n, edges, mode, |_, _| GreedyColoring::new()).seed(seed)
}
