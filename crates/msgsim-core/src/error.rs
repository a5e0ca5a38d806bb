//! Error types raised at the node contract boundary.

use std::error::Error;
use std::fmt;

use crate::id::NodeId;

/// Errors from enqueueing a message on a node's outbox.
///
/// Detected synchronously at the call site. A failed send leaves the
/// outbox untouched and never corrupts engine state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendError {
    /// The target is not a neighbor of the sender (`INVALID_TARGET`).
    InvalidTarget {
        /// The sending node.
        from: NodeId,
        /// The requested destination.
        to: NodeId,
    },
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTarget { from, to } => {
                write!(f, "node {to} is not a neighbor of node {from}")
            }
        }
    }
}

impl Error for SendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_target_display_names_both_nodes() {
        let err = SendError::InvalidTarget {
            from: NodeId(0),
            to: NodeId(9),
        };
        assert_eq!(err.to_string(), "node 9 is not a neighbor of node 0");
    }
}
