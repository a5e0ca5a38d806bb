//! Error types for topology construction.

use msgsim_core::NodeId;
use std::fmt;

/// Errors detected while building a [`Topology`](crate::Topology) from an
/// edge list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TopologyError {
    /// Attempted to build a topology with zero nodes.
    EmptyTopology,
    /// The node count does not fit in a `u32` id.
    TooManyNodes {
        /// The requested node count.
        count: usize,
    },
    /// An edge connects a node to itself.
    SelfLoop {
        /// The offending node.
        node: NodeId,
    },
    /// The same undirected edge appears more than once, in either orientation.
    DuplicateEdge {
        /// Lower endpoint.
        a: NodeId,
        /// Higher endpoint.
        b: NodeId,
    },
    /// An edge references an id outside `0..node_count`.
    UnknownNode {
        /// The offending id.
        node: NodeId,
        /// Number of nodes in the topology.
        node_count: usize,
    },
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTopology => write!(f, "topology must have at least one node"),
            Self::TooManyNodes { count } => {
                write!(f, "node count {count} exceeds u32::MAX")
            }
            Self::SelfLoop { node } => write!(f, "self-loop edge on node {node}"),
            Self::DuplicateEdge { a, b } => write!(f, "duplicate edge {a}-{b}"),
            Self::UnknownNode { node, node_count } => {
                write!(
                    f,
                    "edge references node {node} but topology has {node_count} nodes"
                )
            }
        }
    }
}

impl std::error::Error for TopologyError {}
