//! Edge lists for standard graph shapes over ids `0..n`.

use msgsim_core::NodeId;

fn id(i: usize) -> NodeId {
    NodeId(i as u32)
}

/// Cycle `0 - 1 - ... - (n-1) - 0`.
///
/// `n < 3` degenerates to a path, since a 2-cycle would duplicate its
/// only edge.
pub fn ring_edges(n: usize) -> Vec<(NodeId, NodeId)> {
    if n < 3 {
        return path_edges(n);
    }
    (0..n).map(|i| (id(i), id((i + 1) % n))).collect()
}

/// Path `0 - 1 - ... - (n-1)`.
pub fn path_edges(n: usize) -> Vec<(NodeId, NodeId)> {
    (1..n).map(|i| (id(i - 1), id(i))).collect()
}

/// Every pair of distinct nodes.
pub fn complete_edges(n: usize) -> Vec<(NodeId, NodeId)> {
    (0..n)
        .flat_map(|a| (a + 1..n).map(move |b| (id(a), id(b))))
        .collect()
}

/// Node 0 connected to every other node.
pub fn star_edges(n: usize) -> Vec<(NodeId, NodeId)> {
    (1..n).map(|i| (id(0), id(i))).collect()
}
