//! Id-priority greedy vertex coloring.
//!
//! A node waits until every neighbor with a larger id has announced its
//! color, then takes the smallest color none of them use, announces it,
//! publishes it and terminates. Larger ids decide first, so two
//! neighbors never decide concurrently and the coloring is proper. A
//! node has at most `Δ` higher neighbors, so colors stay in `0..=Δ`.

use msgsim_core::{Envelope, NodeId};
use msgsim_node::{Algorithm, Ctx};
use tracing::debug;

/// A neighbor's final color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorMsg(pub u32);

/// Greedy coloring. Publishes the chosen color.
#[derive(Debug, Default)]
pub struct GreedyColoring {
    waiting_on: usize,
    taken: Vec<u32>,
}

impl GreedyColoring {
    /// A node that has not heard from anyone yet.
    pub fn new() -> Self {
        Self::default()
    }

    fn decide(&mut self, ctx: &mut Ctx<'_, Self>) {
        self.taken.sort_unstable();
        self.taken.dedup();
        let color = smallest_free(&self.taken);
        debug!(node = %ctx.id(), color, "colored");
        ctx.broadcast(ColorMsg(color));
        ctx.publish_result(color);
        ctx.terminate();
    }
}

/// Smallest value missing from a sorted, deduplicated slice.
fn smallest_free(sorted: &[u32]) -> u32 {
    let mut candidate = 0;
    for &c in sorted {
        if c != candidate {
            break;
        }
        candidate += 1;
    }
    candidate
}

impl Algorithm for GreedyColoring {
    type Message = ColorMsg;
    type Output = u32;

    fn initialize(&mut self, ctx: &mut Ctx<'_, Self>) {
        let me = ctx.id();
        self.waiting_on = ctx.neighbors().iter().filter(|&&nb| nb > me).count();
        if self.waiting_on == 0 {
            self.decide(ctx);
        }
    }

    fn handle(&mut self, ctx: &mut Ctx<'_, Self>, batch: Vec<Envelope<ColorMsg>>) {
        let me = ctx.id();
        for Envelope { from, payload } in batch {
            if from > me && self.waiting_on > 0 {
                self.taken.push(payload.0);
                self.waiting_on -= 1;
            }
        }
        if self.waiting_on == 0 && !ctx.is_terminated() {
            self.decide(ctx);
        }
    }
}

/// Whether `colors[a] != colors[b]` for every edge.
pub fn is_proper(edges: &[(NodeId, NodeId)], colors: &[u32]) -> bool {
    edges
        .iter()
        .all(|&(a, b)| colors.get(a.index()) != colors.get(b.index()))
}
