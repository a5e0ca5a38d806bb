//! The handle through which an algorithm interacts with the network.

use std::fmt;

use msgsim_core::{Mode, NodeId, SendError};
use tracing::trace;

use crate::cell::NodeCell;

/// Per-node context passed to [`Algorithm`](crate::Algorithm) hooks.
///
/// Every operation goes through the node's own [`NodeCell`]; a context
/// never touches another node's state. Sends only enqueue on the local
/// outbox and never block. Delivery is the engine's job.
pub struct NodeContext<'a, M, R> {
    cell: &'a NodeCell<M, R>,
    mode: Mode,
}

impl<'a, M: fmt::Debug, R> NodeContext<'a, M, R> {
    /// Create a context over `cell` for a run in `mode`.
    pub fn new(cell: &'a NodeCell<M, R>, mode: Mode) -> Self {
        Self { cell, mode }
    }

    /// This node's id.
    pub fn id(&self) -> NodeId {
        self.cell.id()
    }

    /// Sorted neighbor ids.
    pub fn neighbors(&self) -> &[NodeId] {
        self.cell.neighbors()
    }

    /// Number of neighbors.
    pub fn degree(&self) -> usize {
        self.cell.neighbors().len()
    }

    /// Whether `other` is a neighbor.
    pub fn is_neighbor(&self, other: NodeId) -> bool {
        self.cell.is_neighbor(other)
    }

    /// Execution mode of the run.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether this node has already terminated.
    pub fn is_terminated(&self) -> bool {
        !self.cell.is_alive()
    }

    /// Send `payload` to neighbor `to`.
    ///
    /// # Errors
    ///
    /// [`SendError::InvalidTarget`] if `to` is not a neighbor. Nothing is
    /// enqueued in that case.
    pub fn send_to(&mut self, to: NodeId, payload: M) -> Result<(), SendError> {
        trace!(node = %self.cell.id(), %to, ?payload, "send");
        self.cell.enqueue(to, payload)
    }

    /// Send a copy of `payload` to every neighbor, in ascending id order.
    pub fn broadcast(&mut self, payload: M)
    where
        M: Clone,
    {
        trace!(node = %self.cell.id(), ?payload, "broadcast");
        for &nb in self.cell.neighbors() {
            self.cell.enqueue_neighbor(nb, payload.clone());
        }
    }

    /// Send a copy of `payload` to every neighbor except `exclude`.
    ///
    /// `exclude` need not be a neighbor; if it is not, this is a plain
    /// broadcast.
    pub fn broadcast_except(&mut self, payload: M, exclude: NodeId)
    where
        M: Clone,
    {
        trace!(node = %self.cell.id(), %exclude, ?payload, "broadcast-except");
        for &nb in self.cell.neighbors() {
            if nb != exclude {
                self.cell.enqueue_neighbor(nb, payload.clone());
            }
        }
    }

    /// Terminate this node. Returns `false` if it had already terminated.
    ///
    /// The current handler runs to completion; no further input is
    /// delivered afterwards. Messages already enqueued are still sent.
    pub fn terminate(&mut self) -> bool {
        self.cell.terminate()
    }

    /// Mark this node inactive. Handling continues; once every node in a
    /// SYNC run is inactive the engine shuts the whole run down.
    pub fn go_inactive(&mut self) {
        self.cell.go_inactive();
    }

    /// Publish this node's result. First value wins; later calls return
    /// `false` and change nothing.
    pub fn publish_result(&mut self, value: R) -> bool {
        self.cell.publish(value)
    }

    /// The result published so far, if any.
    pub fn result(&self) -> Option<&R> {
        self.cell.result()
    }
}
