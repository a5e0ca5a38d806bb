//! Node thread main loop and the node → engine report channel.
//!
//! Each node thread runs [`run_node`] to completion. The loop differs by
//! mode:
//!
//! ```text
//! SYNC                                   ASYNC
//! ────                                   ─────
//! initialize()                           initialize()
//! loop:                                  loop:
//!   mark AwaitingInput                     block until inbox non-empty
//!   report Ready ──────────► engine        take one message
//!   block until Delivered                  handle([msg])
//!   handle(batch)
//! report Terminated ───────► engine      report Terminated ──► engine
//! ```
//!
//! In SYNC mode the `Ready`/`Terminated` reports are the engine's
//! barrier: every live node sends exactly one of them per round.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::Sender;
use msgsim_core::{Mode, NodeId};
use tracing::{debug, error};

use crate::algorithm::Algorithm;
use crate::cell::NodeCell;
use crate::context::NodeContext;

/// Lifecycle notification from a node thread to the engine thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeReport {
    /// The node finished its round and is waiting for the next flush (SYNC only).
    Ready(NodeId),
    /// The node terminated and its thread is exiting.
    Terminated(NodeId),
    /// The node's thread is unwinding from a panic in algorithm code.
    Faulted(NodeId),
}

/// Reports `Faulted` and terminates the cell if the thread unwinds.
///
/// The panic itself keeps propagating: the thread dies and the driver
/// observes it when joining.
struct FaultGuard<'a, M, R> {
    cell: &'a NodeCell<M, R>,
    reports: &'a Sender<NodeReport>,
}

impl<M, R> Drop for FaultGuard<'_, M, R> {
    fn drop(&mut self) {
        if thread::panicking() {
            error!(node = %self.cell.id(), "handler panicked");
            self.cell.terminate();
            let _ = self.reports.send(NodeReport::Faulted(self.cell.id()));
        }
    }
}

/// Drive one node from `Created` to `Terminated`.
///
/// Runs `algorithm.initialize` once, then feeds it input according to
/// `mode` until the node terminates (by itself or by the engine). Sends
/// on `reports` are best-effort: once the engine has stopped nobody is
/// listening, which is fine.
pub fn run_node<A: Algorithm>(
    mut algorithm: A,
    cell: Arc<NodeCell<A::Message, A::Output>>,
    mode: Mode,
    reports: Sender<NodeReport>,
) {
    let id = cell.id();
    let _guard = FaultGuard {
        cell: &cell,
        reports: &reports,
    };
    let mut ctx = NodeContext::new(&*cell, mode);

    debug!(node = %id, neighbors = ?cell.neighbors(), %mode, "node started");
    cell.begin();
    algorithm.initialize(&mut ctx);

    match mode {
        Mode::Sync => {
            while cell.mark_awaiting() {
                let _ = reports.send(NodeReport::Ready(id));
                match cell.wait_for_batch() {
                    Some(batch) => algorithm.handle(&mut ctx, batch),
                    None => break,
                }
            }
        }
        Mode::Async => {
            while let Some(envelope) = cell.next_message() {
                algorithm.handle(&mut ctx, vec![envelope]);
            }
        }
    }

    debug!(node = %id, "node terminated");
    let _ = reports.send(NodeReport::Terminated(id));
}
