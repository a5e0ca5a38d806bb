//! Scripted algorithms for engine testing.
//!
//! - [`Silent`]: never sends, never terminates.
//! - [`BroadcastOnce`]: broadcasts its id, publishes what it heard in
//!   the first batch, terminates.
//! - [`Sequence`]: one node sends `1..=n` to a peer which records the
//!   order of arrival.
//! - [`RoundRecorder`]: tags each round's broadcast with a round number
//!   and records every batch.
//! - [`GoInactive`]: goes inactive after a fixed number of handler calls.
//! - [`PanicOn`]: panics in the handler of one chosen node.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use msgsim_core::{Envelope, NodeId};
use msgsim_node::{Algorithm, Ctx};

/// Does nothing at all. In SYNC it receives an empty batch every round;
/// in ASYNC it blocks forever (until the run goes quiescent).
pub struct Silent;

impl Algorithm for Silent {
    type Message = ();
    type Output = ();

    fn initialize(&mut self, _ctx: &mut Ctx<'_, Self>) {}

    fn handle(&mut self, _ctx: &mut Ctx<'_, Self>, _batch: Vec<Envelope<()>>) {}
}

/// Broadcasts its own id in `initialize`. On the first handler call it
/// publishes the sender ids of that batch (sorted) and terminates.
///
/// In ASYNC every call carries one message, so the published list has a
/// single entry.
pub struct BroadcastOnce;

impl Algorithm for BroadcastOnce {
    type Message = NodeId;
    type Output = Vec<NodeId>;

    fn initialize(&mut self, ctx: &mut Ctx<'_, Self>) {
        let id = ctx.id();
        ctx.broadcast(id);
    }

    fn handle(&mut self, ctx: &mut Ctx<'_, Self>, batch: Vec<Envelope<NodeId>>) {
        let mut heard: Vec<NodeId> = batch.into_iter().map(|e| e.payload).collect();
        heard.sort_unstable();
        ctx.publish_result(heard);
        ctx.terminate();
    }
}

/// Sender/recorder pair for ordering tests.
///
/// The sender enqueues `1..=count` to `peer` in `initialize`, publishes
/// the sent sequence and terminates immediately. The recorder appends
/// every payload it receives and publishes once it has `count` of them.
pub enum Sequence {
    Sender { peer: NodeId, count: u32 },
    Recorder { count: u32, seen: Vec<u32> },
}

impl Sequence {
    /// Node 0 sends `count` numbers to node 1; every other node records.
    pub fn pair(id: NodeId, count: u32) -> Self {
        if id == NodeId(0) {
            Self::Sender {
                peer: NodeId(1),
                count,
            }
        } else {
            Self::Recorder {
                count,
                seen: Vec::new(),
            }
        }
    }
}

impl Algorithm for Sequence {
    type Message = u32;
    type Output = Vec<u32>;

    fn initialize(&mut self, ctx: &mut Ctx<'_, Self>) {
        if let Self::Sender { peer, count } = *self {
            for i in 1..=count {
                ctx.send_to(peer, i).expect("sequence peer must be a neighbor");
            }
            ctx.publish_result((1..=count).collect());
            ctx.terminate();
        }
    }

    fn handle(&mut self, ctx: &mut Ctx<'_, Self>, batch: Vec<Envelope<u32>>) {
        if let Self::Recorder { count, seen } = self {
            seen.extend(batch.into_iter().map(|e| e.payload));
            if seen.len() >= *count as usize {
                ctx.publish_result(seen.clone());
                ctx.terminate();
            }
        }
    }
}

/// A message tagged with the round in which it was sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tagged {
    pub from: NodeId,
    pub round: u32,
}

/// SYNC round-isolation probe.
///
/// Broadcasts `Tagged { round: 0 }` in `initialize`; handler call `k`
/// (0-based) records its batch and broadcasts `round: k + 1`. After
/// `rounds` handler calls it publishes every batch and terminates.
pub struct RoundRecorder {
    rounds: u32,
    batches: Vec<Vec<Tagged>>,
}

impl RoundRecorder {
    pub fn new(rounds: u32) -> Self {
        Self {
            rounds,
            batches: Vec::new(),
        }
    }
}

impl Algorithm for RoundRecorder {
    type Message = Tagged;
    type Output = Vec<Vec<Tagged>>;

    fn initialize(&mut self, ctx: &mut Ctx<'_, Self>) {
        let from = ctx.id();
        ctx.broadcast(Tagged { from, round: 0 });
    }

    fn handle(&mut self, ctx: &mut Ctx<'_, Self>, batch: Vec<Envelope<Tagged>>) {
        self.batches
            .push(batch.into_iter().map(|e| e.payload).collect());
        let done = self.batches.len() as u32;
        if done >= self.rounds {
            ctx.publish_result(std::mem::take(&mut self.batches));
            ctx.terminate();
        } else {
            let from = ctx.id();
            ctx.broadcast(Tagged { from, round: done });
        }
    }
}

/// Goes inactive after `after` handler calls (`0` = in `initialize`).
///
/// Keeps being invoked afterwards; `calls` counts every handler call so
/// tests can see how long the run continued.
pub struct GoInactive {
    after: usize,
    calls: Arc<AtomicUsize>,
    local: usize,
}

impl GoInactive {
    pub fn new(after: usize, calls: Arc<AtomicUsize>) -> Self {
        Self {
            after,
            calls,
            local: 0,
        }
    }
}

impl Algorithm for GoInactive {
    type Message = ();
    type Output = usize;

    fn initialize(&mut self, ctx: &mut Ctx<'_, Self>) {
        if self.after == 0 {
            ctx.go_inactive();
        }
    }

    fn handle(&mut self, ctx: &mut Ctx<'_, Self>, _batch: Vec<Envelope<()>>) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.local += 1;
        if self.local == self.after {
            ctx.publish_result(self.local);
            ctx.go_inactive();
        }
    }
}

/// Every node broadcasts once; node `target` panics when it handles its
/// first input. Nobody terminates on their own.
pub struct PanicOn {
    target: NodeId,
    me: NodeId,
}

impl PanicOn {
    pub fn new(target: NodeId, me: NodeId) -> Self {
        Self { target, me }
    }
}

impl Algorithm for PanicOn {
    type Message = ();
    type Output = ();

    fn initialize(&mut self, ctx: &mut Ctx<'_, Self>) {
        ctx.broadcast(());
    }

    fn handle(&mut self, _ctx: &mut Ctx<'_, Self>, _batch: Vec<Envelope<()>>) {
        if self.me == self.target {
            panic!("node {} failed on purpose", self.me);
        }
    }
}
