//! Flooding broadcast from a single root.
//!
//! The root publishes distance 0 and sends `Hop(1)` to its neighbors. On
//! first arrival a node publishes the hop count and the neighbor it heard
//! from, relays `Hop(h + 1)` to everyone else and goes inactive. Later
//! arrivals are ignored.
//!
//! In SYNC mode every message delivered in round `r` carries `Hop(r)`, so
//! the published hop count is the BFS distance and the parents form a
//! shortest-path tree; once every node is reached the run ends by
//! collective shutdown. In ASYNC mode the parent is whichever copy won
//! the race and the run ends when the network goes quiescent.

use msgsim_core::{Envelope, NodeId};
use msgsim_node::{Algorithm, Ctx};
use tracing::trace;

/// Hop count carried by a flood message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hop(pub u32);

/// What a reached node publishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FloodResult {
    /// Hops from the root along the path the first copy took.
    pub hops: u32,
    /// The neighbor the first copy came from. `None` at the root.
    pub parent: Option<NodeId>,
}

/// Flooding broadcast.
#[derive(Debug)]
pub struct Flood {
    is_root: bool,
    reached: bool,
}

impl Flood {
    /// A flood participant. Exactly one node per run should be the root.
    pub fn new(is_root: bool) -> Self {
        Self {
            is_root,
            reached: false,
        }
    }
}

impl Algorithm for Flood {
    type Message = Hop;
    type Output = FloodResult;

    fn initialize(&mut self, ctx: &mut Ctx<'_, Self>) {
        if self.is_root {
            self.reached = true;
            ctx.publish_result(FloodResult {
                hops: 0,
                parent: None,
            });
            ctx.broadcast(Hop(1));
            ctx.go_inactive();
        }
    }

    fn handle(&mut self, ctx: &mut Ctx<'_, Self>, batch: Vec<Envelope<Hop>>) {
        if self.reached {
            return;
        }
        let Some(first) = batch.into_iter().next() else {
            return;
        };
        let Envelope {
            from,
            payload: Hop(hops),
        } = first;
        self.reached = true;
        trace!(node = %ctx.id(), hops, parent = %from, "reached");
        ctx.publish_result(FloodResult {
            hops,
            parent: Some(from),
        });
        ctx.broadcast_except(Hop(hops + 1), from);
        ctx.go_inactive();
    }
}
