//! Symmetric adjacency built from an undirected edge list.

use msgsim_core::NodeId;
use smallvec::SmallVec;

use crate::error::TopologyError;

/// Neighbor list of a single node, sorted ascending by id.
///
/// Inline capacity of 8 covers rings, grids and sparse random graphs
/// without heap allocation; denser nodes spill to the heap transparently.
pub type Neighbors = SmallVec<[NodeId; 8]>;

/// A static, undirected network topology.
///
/// Nodes are the dense ids `0..node_count`. The neighbor relation is
/// symmetric by construction: `b ∈ neighbors(a)` iff `a ∈ neighbors(b)`.
/// Isolated nodes (degree 0) are allowed.
///
/// # Examples
///
/// ```
/// use msgsim_core::NodeId;
/// use msgsim_topology::Topology;
///
/// let ring = Topology::from_edges(3, &[
///     (NodeId(0), NodeId(1)),
///     (NodeId(1), NodeId(2)),
///     (NodeId(2), NodeId(0)),
/// ]).unwrap();
///
/// assert_eq!(ring.node_count(), 3);
/// assert_eq!(ring.edge_count(), 3);
/// assert_eq!(ring.neighbors(NodeId(0)), &[NodeId(1), NodeId(2)]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    adjacency: Vec<Neighbors>,
    edge_count: usize,
}

impl Topology {
    /// Build a topology over `node_count` nodes from an undirected edge list.
    ///
    /// Rejects self-loops, duplicate edges (in either orientation), and
    /// edges referencing ids outside `0..node_count`.
    pub fn from_edges(node_count: usize, edges: &[(NodeId, NodeId)]) -> Result<Self, TopologyError> {
        if node_count == 0 {
            return Err(TopologyError::EmptyTopology);
        }
        if u32::try_from(node_count).is_err() {
            return Err(TopologyError::TooManyNodes { count: node_count });
        }

        let mut adjacency: Vec<Neighbors> = vec![Neighbors::new(); node_count];
        for &(a, b) in edges {
            for node in [a, b] {
                if node.index() >= node_count {
                    return Err(TopologyError::UnknownNode { node, node_count });
                }
            }
            if a == b {
                return Err(TopologyError::SelfLoop { node: a });
            }
            let (lo, hi) = if a < b { (a, b) } else { (b, a) };
            let pos = match adjacency[lo.index()].binary_search(&hi) {
                Ok(_) => return Err(TopologyError::DuplicateEdge { a: lo, b: hi }),
                Err(pos) => pos,
            };
            adjacency[lo.index()].insert(pos, hi);
            // The reverse direction cannot already be present: adjacency
            // is only ever inserted pairwise.
            let pos = adjacency[hi.index()]
                .binary_search(&lo)
                .unwrap_or_else(|pos| pos);
            adjacency[hi.index()].insert(pos, lo);
        }

        Ok(Self {
            adjacency,
            edge_count: edges.len(),
        })
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Iterate all node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.adjacency.len()).map(|i| NodeId(i as u32))
    }

    /// Whether `id` is a node of this topology.
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.adjacency.len()
    }

    /// Sorted neighbor ids of `id`. Empty for ids outside the topology.
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.adjacency
            .get(id.index())
            .map(|n| n.as_slice())
            .unwrap_or(&[])
    }

    /// Number of neighbors of `id`.
    pub fn degree(&self, id: NodeId) -> usize {
        self.neighbors(id).len()
    }

    /// Largest degree over all nodes (Δ).
    pub fn max_degree(&self) -> usize {
        self.adjacency.iter().map(|n| n.len()).max().unwrap_or(0)
    }

    /// Whether `a` and `b` share an edge.
    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }

    /// Iterate every edge once, as `(lo, hi)` with `lo < hi`, in
    /// ascending order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.node_ids().flat_map(move |a| {
            self.neighbors(a)
                .iter()
                .copied()
                .filter(move |&b| a < b)
                .map(move |b| (a, b))
        })
    }

    /// Whether every node is reachable from node 0.
    pub fn is_connected(&self) -> bool {
        let mut seen = vec![false; self.adjacency.len()];
        let mut stack = vec![NodeId(0)];
        seen[0] = true;
        let mut reached = 1;
        while let Some(node) = stack.pop() {
            for &nb in self.neighbors(node) {
                if !seen[nb.index()] {
                    seen[nb.index()] = true;
                    reached += 1;
                    stack.push(nb);
                }
            }
        }
        reached == self.adjacency.len()
    }
}
