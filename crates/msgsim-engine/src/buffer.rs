//! Per-destination staging buffer for SYNC rounds.
//!
//! Messages drained from outboxes sit here between the drain and flush
//! phases of one round. Only the SYNC engine thread touches it.

use indexmap::IndexMap;
use msgsim_core::{Envelope, NodeId};

/// Destination → FIFO of envelopes waiting for the next flush.
pub(crate) struct StagingBuffer<M> {
    queues: IndexMap<NodeId, Vec<Envelope<M>>>,
    len: usize,
}

impl<M> StagingBuffer<M> {
    pub(crate) fn new() -> Self {
        Self {
            queues: IndexMap::new(),
            len: 0,
        }
    }

    /// Append `envelope` to `to`'s queue.
    pub(crate) fn stage(&mut self, to: NodeId, envelope: Envelope<M>) {
        self.queues.entry(to).or_default().push(envelope);
        self.len += 1;
    }

    /// Take `to`'s queue, leaving it empty. Unknown ids yield an empty batch.
    pub(crate) fn take(&mut self, to: NodeId) -> Vec<Envelope<M>> {
        let batch = self
            .queues
            .get_mut(&to)
            .map(std::mem::take)
            .unwrap_or_default();
        self.len -= batch.len();
        batch
    }

    /// Total staged messages across all destinations.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Discard everything, returning how many messages were dropped.
    pub(crate) fn clear(&mut self) -> usize {
        let dropped = self.len;
        self.queues.clear();
        self.len = 0;
        dropped
    }
}
