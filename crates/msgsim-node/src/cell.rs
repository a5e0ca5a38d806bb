//! Per-node synchronized state shared between a node thread and the engine.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, OnceLock, PoisonError};

use msgsim_core::{Envelope, NodeId, NodeStatus, Outgoing, SendError};
use smallvec::SmallVec;

/// Status, inactive flag and inbox: everything the engine and the node
/// thread both read and write.
struct CellState<M> {
    status: NodeStatus,
    inactive: bool,
    inbox: VecDeque<Envelope<M>>,
}

/// The shared half of a simulated node.
///
/// The node thread owns the algorithm value; the engine owns an
/// `Arc<NodeCell>` per node. All cross-thread state lives here:
///
/// - `state` (status, inactive flag, inbox) behind a per-node mutex,
///   paired with a condvar the node thread sleeps on while waiting for
///   input;
/// - the outbox behind its own mutex, so handlers can enqueue while the
///   engine delivers into the inbox;
/// - the write-once result slot.
///
/// Handlers never run while either lock is held, so a panicking handler
/// cannot leave the state half-updated. Poisoned locks are therefore
/// recovered rather than propagated.
pub struct NodeCell<M, R> {
    id: NodeId,
    neighbors: SmallVec<[NodeId; 8]>,
    state: Mutex<CellState<M>>,
    wake: Condvar,
    outbox: Mutex<VecDeque<Outgoing<M>>>,
    result: OnceLock<R>,
}

// Compile-time assertion: cells are shared across threads.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<NodeCell<String, u64>>();
};

impl<M, R> NodeCell<M, R> {
    /// Create a cell in the `Created` state with the given neighbor set.
    ///
    /// The neighbor list is sorted and deduplicated; it never changes
    /// afterwards.
    pub fn new(id: NodeId, neighbors: &[NodeId]) -> Self {
        let mut neighbors: SmallVec<[NodeId; 8]> = SmallVec::from_slice(neighbors);
        neighbors.sort_unstable();
        neighbors.dedup();
        Self {
            id,
            neighbors,
            state: Mutex::new(CellState {
                status: NodeStatus::Created,
                inactive: false,
                inbox: VecDeque::new(),
            }),
            wake: Condvar::new(),
            outbox: Mutex::new(VecDeque::new()),
            result: OnceLock::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, CellState<M>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn outbox(&self) -> MutexGuard<'_, VecDeque<Outgoing<M>>> {
        self.outbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Identity ─────────────────────────────────────────────────

    /// This node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Sorted neighbor ids.
    pub fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }

    /// Whether `other` is a neighbor of this node.
    pub fn is_neighbor(&self, other: NodeId) -> bool {
        self.neighbors.binary_search(&other).is_ok()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Current lifecycle status.
    pub fn status(&self) -> NodeStatus {
        self.state().status
    }

    /// Whether the node has not terminated.
    pub fn is_alive(&self) -> bool {
        !self.state().status.is_terminated()
    }

    /// Whether the node has marked itself inactive.
    pub fn is_inactive(&self) -> bool {
        self.state().inactive
    }

    /// `Created → Processing`, called by the runtime right before
    /// `initialize`. No-op for any other status.
    pub fn begin(&self) {
        let mut state = self.state();
        if state.status == NodeStatus::Created {
            state.status = NodeStatus::Processing;
        }
    }

    /// Transition to `Terminated` from any non-terminal status.
    ///
    /// Clears the inbox and wakes the node thread if it is waiting.
    /// Returns `false` (and changes nothing) if already terminated.
    pub fn terminate(&self) -> bool {
        let mut state = self.state();
        if state.status.is_terminated() {
            return false;
        }
        state.status = NodeStatus::Terminated;
        state.inbox.clear();
        drop(state);
        self.wake.notify_all();
        true
    }

    /// Set the inactive flag. Monotonic: returns `true` only on the first call.
    pub fn go_inactive(&self) -> bool {
        let mut state = self.state();
        let first = !state.inactive;
        state.inactive = true;
        first
    }

    // ── Result slot ──────────────────────────────────────────────

    /// Publish the node's result. The first value wins; later calls are
    /// no-ops that return `false`.
    pub fn publish(&self, value: R) -> bool {
        self.result.set(value).is_ok()
    }

    /// The published result, if any.
    pub fn result(&self) -> Option<&R> {
        self.result.get()
    }

    // ── Outbox (node side enqueues, engine side dequeues) ────────

    /// Enqueue a message for neighbor `to`.
    ///
    /// Fails with [`SendError::InvalidTarget`] if `to` is not a neighbor;
    /// the outbox is left untouched in that case.
    pub fn enqueue(&self, to: NodeId, payload: M) -> Result<(), SendError> {
        if !self.is_neighbor(to) {
            return Err(SendError::InvalidTarget { from: self.id, to });
        }
        self.outbox().push_back(Outgoing::new(to, payload));
        Ok(())
    }

    /// Enqueue without the neighbor check. Callers iterate `neighbors()`.
    pub(crate) fn enqueue_neighbor(&self, to: NodeId, payload: M) {
        debug_assert!(self.is_neighbor(to));
        self.outbox().push_back(Outgoing::new(to, payload));
    }

    /// Number of messages waiting in the outbox.
    pub fn outbox_len(&self) -> usize {
        self.outbox().len()
    }

    /// Pop the front of the outbox, if any.
    pub fn pop_outgoing(&self) -> Option<Outgoing<M>> {
        self.outbox().pop_front()
    }

    /// Remove every queued outbound message, in FIFO order.
    pub fn drain_outbox(&self) -> Vec<Outgoing<M>> {
        self.outbox().drain(..).collect()
    }

    // ── Inbox (engine side delivers) ─────────────────────────────

    /// Deliver one round's batch (SYNC).
    ///
    /// Appends `batch` (possibly empty) to the inbox, marks the node
    /// `Delivered` and wakes it. Returns `false` and drops the batch if
    /// the node has terminated.
    pub fn deliver_batch(&self, batch: Vec<Envelope<M>>) -> bool {
        let mut state = self.state();
        if state.status.is_terminated() {
            return false;
        }
        state.inbox.extend(batch);
        state.status = NodeStatus::Delivered;
        drop(state);
        self.wake.notify_all();
        true
    }

    /// Deliver a single message (ASYNC).
    ///
    /// Marks an idle node `Delivered`; a node still processing keeps its
    /// status and picks the message up when it next asks for input.
    /// Returns `false` and drops the message if the node has terminated.
    pub fn deliver(&self, envelope: Envelope<M>) -> bool {
        let mut state = self.state();
        if state.status.is_terminated() {
            return false;
        }
        state.inbox.push_back(envelope);
        if state.status == NodeStatus::AwaitingInput {
            state.status = NodeStatus::Delivered;
        }
        drop(state);
        self.wake.notify_all();
        true
    }

    /// Number of messages delivered but not yet consumed.
    pub fn inbox_len(&self) -> usize {
        self.state().inbox.len()
    }

    /// Remove and return the current inbox contents without changing
    /// status. Intended for inspection by drivers and tests.
    pub fn take_inbox(&self) -> Vec<Envelope<M>> {
        self.state().inbox.drain(..).collect()
    }

    /// Whether the node is blocked on an empty inbox (ASYNC quiescence).
    pub fn is_idle(&self) -> bool {
        let state = self.state();
        state.status == NodeStatus::AwaitingInput && state.inbox.is_empty()
    }

    // ── Node-thread waits ────────────────────────────────────────

    /// Enter `AwaitingInput` at the end of a SYNC round.
    ///
    /// Returns `false` if the node has terminated, in which case it must
    /// not report ready.
    pub fn mark_awaiting(&self) -> bool {
        let mut state = self.state();
        if state.status.is_terminated() {
            return false;
        }
        state.status = NodeStatus::AwaitingInput;
        true
    }

    /// Block until the engine flushes this round's batch (SYNC).
    ///
    /// Returns the batch and moves to `Processing`, or `None` if the node
    /// was terminated while waiting.
    pub fn wait_for_batch(&self) -> Option<Vec<Envelope<M>>> {
        let state = self.state();
        let mut state = self
            .wake
            .wait_while(state, |s| s.status == NodeStatus::AwaitingInput)
            .unwrap_or_else(PoisonError::into_inner);
        if state.status.is_terminated() {
            return None;
        }
        state.status = NodeStatus::Processing;
        Some(state.inbox.drain(..).collect())
    }

    /// Block until one message is available and take it (ASYNC).
    ///
    /// Returns `None` once the node has terminated.
    pub fn next_message(&self) -> Option<Envelope<M>> {
        let mut state = self.state();
        loop {
            if state.status.is_terminated() {
                return None;
            }
            if let Some(envelope) = state.inbox.pop_front() {
                state.status = NodeStatus::Processing;
                return Some(envelope);
            }
            state.status = NodeStatus::AwaitingInput;
            state = self
                .wake
                .wait_while(state, |s| s.inbox.is_empty() && !s.status.is_terminated())
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl<M, R: fmt::Debug> fmt::Debug for NodeCell<M, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("NodeCell")
            .field("id", &self.id)
            .field("neighbors", &self.neighbors)
            .field("status", &state.status)
            .field("inactive", &state.inactive)
            .field("inbox_len", &state.inbox.len())
            .field("result", &self.result.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn cell(id: u32, neighbors: &[u32]) -> NodeCell<u32, u32> {
        let ns: Vec<NodeId> = neighbors.iter().copied().map(NodeId).collect();
        NodeCell::new(NodeId(id), &ns)
    }

    #[test]
    fn starts_created_and_alive() {
        let c = cell(0, &[1]);
        assert_eq!(c.status(), NodeStatus::Created);
        assert!(c.is_alive());
        assert!(!c.is_inactive());
        c.begin();
        assert_eq!(c.status(), NodeStatus::Processing);
    }

    #[test]
    fn neighbors_sorted_and_deduplicated() {
        let c = cell(0, &[3, 1, 3, 2]);
        assert_eq!(c.neighbors(), &[NodeId(1), NodeId(2), NodeId(3)]);
    }

    #[test]
    fn terminate_is_idempotent_and_absorbing() {
        let c = cell(0, &[1]);
        assert!(c.terminate());
        assert!(!c.terminate());
        assert_eq!(c.status(), NodeStatus::Terminated);
        c.begin();
        assert!(!c.mark_awaiting());
        assert_eq!(c.status(), NodeStatus::Terminated);
    }

    #[test]
    fn publish_keeps_first_value() {
        let c = cell(0, &[]);
        assert!(c.publish(7));
        assert!(!c.publish(9));
        assert_eq!(c.result(), Some(&7));
    }

    #[test]
    fn go_inactive_is_monotonic() {
        let c = cell(0, &[]);
        assert!(c.go_inactive());
        assert!(!c.go_inactive());
        assert!(c.is_inactive());
        assert!(c.is_alive(), "inactive does not stop the node");
    }

    #[test]
    fn enqueue_rejects_non_neighbor_without_side_effects() {
        let c = cell(0, &[1, 2]);
        c.enqueue(NodeId(1), 10).unwrap();
        let err = c.enqueue(NodeId(5), 11).unwrap_err();
        assert_eq!(
            err,
            SendError::InvalidTarget {
                from: NodeId(0),
                to: NodeId(5)
            }
        );
        assert_eq!(c.outbox_len(), 1);
    }

    #[test]
    fn outbox_is_fifo() {
        let c = cell(0, &[1, 2]);
        c.enqueue(NodeId(2), 1).unwrap();
        c.enqueue(NodeId(1), 2).unwrap();
        c.enqueue(NodeId(2), 3).unwrap();
        assert_eq!(c.pop_outgoing(), Some(Outgoing::new(NodeId(2), 1)));
        let rest = c.drain_outbox();
        assert_eq!(
            rest,
            vec![Outgoing::new(NodeId(1), 2), Outgoing::new(NodeId(2), 3)]
        );
        assert_eq!(c.outbox_len(), 0);
    }

    #[test]
    fn delivery_to_terminated_node_is_dropped() {
        let c = cell(0, &[1]);
        c.terminate();
        assert!(!c.deliver(Envelope::new(NodeId(1), 5)));
        assert!(!c.deliver_batch(vec![Envelope::new(NodeId(1), 6)]));
        assert_eq!(c.inbox_len(), 0);
    }

    #[test]
    fn terminate_clears_inbox() {
        let c = cell(0, &[1]);
        c.deliver(Envelope::new(NodeId(1), 5));
        assert_eq!(c.inbox_len(), 1);
        c.terminate();
        assert_eq!(c.inbox_len(), 0);
    }

    #[test]
    fn async_deliver_marks_only_idle_nodes_delivered() {
        let c = cell(0, &[1]);
        c.begin();
        c.deliver(Envelope::new(NodeId(1), 1));
        assert_eq!(c.status(), NodeStatus::Processing);

        c.take_inbox();
        c.mark_awaiting();
        assert!(c.is_idle());
        c.deliver(Envelope::new(NodeId(1), 2));
        assert_eq!(c.status(), NodeStatus::Delivered);
        assert!(!c.is_idle());
    }

    #[test]
    fn wait_for_batch_returns_flushed_batch() {
        let c = Arc::new(cell(0, &[1]));
        assert!(c.mark_awaiting());
        let waiter = {
            let c = Arc::clone(&c);
            thread::spawn(move || c.wait_for_batch())
        };
        thread::sleep(Duration::from_millis(10));
        assert!(c.deliver_batch(vec![Envelope::new(NodeId(1), 4), Envelope::new(NodeId(1), 5)]));
        let batch = waiter.join().unwrap().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(c.status(), NodeStatus::Processing);
    }

    #[test]
    fn empty_batch_still_wakes_node() {
        let c = Arc::new(cell(0, &[]));
        c.mark_awaiting();
        let waiter = {
            let c = Arc::clone(&c);
            thread::spawn(move || c.wait_for_batch())
        };
        c.deliver_batch(Vec::new());
        assert_eq!(waiter.join().unwrap(), Some(Vec::new()));
    }

    #[test]
    fn terminate_wakes_waiting_node() {
        let c = Arc::new(cell(0, &[1]));
        c.mark_awaiting();
        let sync_waiter = {
            let c = Arc::clone(&c);
            thread::spawn(move || c.wait_for_batch())
        };
        thread::sleep(Duration::from_millis(10));
        c.terminate();
        assert!(sync_waiter.join().unwrap().is_none());

        let c = Arc::new(cell(1, &[0]));
        let async_waiter = {
            let c = Arc::clone(&c);
            thread::spawn(move || c.next_message())
        };
        thread::sleep(Duration::from_millis(10));
        c.terminate();
        assert!(async_waiter.join().unwrap().is_none());
    }

    #[test]
    fn next_message_yields_one_at_a_time_in_order() {
        let c = cell(0, &[1]);
        c.deliver(Envelope::new(NodeId(1), 1));
        c.deliver(Envelope::new(NodeId(1), 2));
        assert_eq!(c.next_message().map(|e| e.payload), Some(1));
        assert_eq!(c.status(), NodeStatus::Processing);
        assert_eq!(c.next_message().map(|e| e.payload), Some(2));
        assert_eq!(c.inbox_len(), 0);
    }
}
