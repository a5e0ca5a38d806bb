//! Probe/reply leader election on a bidirectional ring.
//!
//! Every node starts as a candidate. In phase `k` a candidate sends a
//! probe both ways around the ring; a probe travels at most `2^k` hops and
//! is swallowed by any node with a larger id. A probe that reaches its
//! hop limit is answered by a reply travelling back to the candidate. A
//! candidate that collects one reply from each neighbor for its current
//! phase starts phase `k + 1`.
//!
//! A probe that arrives back at its own candidate has passed every other
//! node, so the candidate is the largest id on the ring. It publishes
//! itself as leader and sends a `Leader` wave both ways; each node
//! publishes the leader, forwards the wave and terminates.
//!
//! Works on rings of three or more nodes and on a single isolated node.

use msgsim_core::{Envelope, NodeId};
use msgsim_node::{Algorithm, Ctx};
use tracing::{debug, trace, warn};

/// Messages exchanged by [`RingElection`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElectionMsg {
    /// A candidate's probe, `hops` nodes away from the candidate.
    Probe {
        /// The probing node.
        candidate: NodeId,
        /// The candidate's phase when it sent the probe.
        phase: u32,
        /// Hops travelled so far, counting the first.
        hops: u64,
    },
    /// Answer to a probe that reached its hop limit.
    Reply {
        /// The candidate the reply travels back to.
        candidate: NodeId,
        /// The phase being answered.
        phase: u32,
    },
    /// Termination wave carrying the elected leader.
    Leader(NodeId),
}

/// Ring leader election. Publishes the leader id on every node.
#[derive(Debug, Default)]
pub struct RingElection {
    phase: u32,
    replies: usize,
}

impl RingElection {
    /// A fresh candidate in phase 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// The phase this node is currently probing in.
    pub fn phase(&self) -> u32 {
        self.phase
    }

    fn on_probe(
        &mut self,
        ctx: &mut Ctx<'_, Self>,
        from: NodeId,
        candidate: NodeId,
        phase: u32,
        hops: u64,
    ) {
        let me = ctx.id();
        if candidate == me {
            debug!(node = %me, phase, "probe returned, elected");
            self.finish(ctx, me, None);
        } else if candidate > me {
            if hops < reach(phase) {
                ctx.broadcast_except(
                    ElectionMsg::Probe {
                        candidate,
                        phase,
                        hops: hops + 1,
                    },
                    from,
                );
            } else {
                reply(ctx, from, ElectionMsg::Reply { candidate, phase });
            }
        }
    }

    fn on_reply(&mut self, ctx: &mut Ctx<'_, Self>, from: NodeId, candidate: NodeId, phase: u32) {
        let me = ctx.id();
        if candidate != me {
            ctx.broadcast_except(ElectionMsg::Reply { candidate, phase }, from);
            return;
        }
        if phase != self.phase {
            return;
        }
        self.replies += 1;
        if self.replies == ctx.degree() {
            self.phase += 1;
            self.replies = 0;
            trace!(node = %me, phase = self.phase, "next phase");
            ctx.broadcast(ElectionMsg::Probe {
                candidate: me,
                phase: self.phase,
                hops: 1,
            });
        }
    }

    /// Publish `leader`, pass the wave on (to everyone but `from`) and stop.
    fn finish(&mut self, ctx: &mut Ctx<'_, Self>, leader: NodeId, from: Option<NodeId>) {
        ctx.publish_result(leader);
        match from {
            Some(from) => ctx.broadcast_except(ElectionMsg::Leader(leader), from),
            None => ctx.broadcast(ElectionMsg::Leader(leader)),
        }
        ctx.terminate();
    }
}

/// Maximum probe distance in `phase`.
fn reach(phase: u32) -> u64 {
    1u64.checked_shl(phase).unwrap_or(u64::MAX)
}

fn reply(ctx: &mut Ctx<'_, RingElection>, to: NodeId, msg: ElectionMsg) {
    if let Err(e) = ctx.send_to(to, msg) {
        warn!(error = %e, "reply not sent");
    }
}

impl Algorithm for RingElection {
    type Message = ElectionMsg;
    type Output = NodeId;

    fn initialize(&mut self, ctx: &mut Ctx<'_, Self>) {
        let me = ctx.id();
        if ctx.degree() == 0 {
            self.finish(ctx, me, None);
            return;
        }
        ctx.broadcast(ElectionMsg::Probe {
            candidate: me,
            phase: 0,
            hops: 1,
        });
    }

    fn handle(&mut self, ctx: &mut Ctx<'_, Self>, batch: Vec<Envelope<ElectionMsg>>) {
        for Envelope { from, payload } in batch {
            if ctx.is_terminated() {
                break;
            }
            match payload {
                ElectionMsg::Probe {
                    candidate,
                    phase,
                    hops,
                } => self.on_probe(ctx, from, candidate, phase, hops),
                ElectionMsg::Reply { candidate, phase } => {
                    self.on_reply(ctx, from, candidate, phase)
                }
                ElectionMsg::Leader(leader) => self.finish(ctx, leader, Some(from)),
            }
        }
    }
}
