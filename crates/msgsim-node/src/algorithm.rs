//! The [`Algorithm`] trait: per-node behavior of a distributed algorithm.

use std::fmt;

use msgsim_core::Envelope;

use crate::context::NodeContext;

/// Shorthand for the context type an algorithm's hooks receive.
pub type Ctx<'a, A> = NodeContext<'a, <A as Algorithm>::Message, <A as Algorithm>::Output>;

/// Behavior of one node of a distributed algorithm.
///
/// An instance is created per node by the simulation's node factory and
/// moved onto that node's thread; it is never shared. The engine calls
/// [`initialize`](Algorithm::initialize) exactly once, then
/// [`handle`](Algorithm::handle) every time input is ready:
///
/// - **SYNC**: once per round with the full batch of messages drained for
///   this node in the previous round. The batch may be empty; the node is
///   still invoked so it can make progress on its own.
/// - **ASYNC**: once per message, with a batch of exactly one envelope.
///
/// A handler ends its node's participation by calling
/// [`NodeContext::terminate`]. A panicking handler is fatal for the whole
/// run: it is never retried.
///
/// # Example
///
/// ```
/// use msgsim_core::Envelope;
/// use msgsim_node::{Algorithm, Ctx};
///
/// /// Announce our id once, record how many announcements arrive, stop.
/// struct Hello;
///
/// impl Algorithm for Hello {
///     type Message = u32;
///     type Output = usize;
///
///     fn initialize(&mut self, ctx: &mut Ctx<'_, Self>) {
///         let id = ctx.id().0;
///         ctx.broadcast(id);
///     }
///
///     fn handle(&mut self, ctx: &mut Ctx<'_, Self>, batch: Vec<Envelope<u32>>) {
///         ctx.publish_result(batch.len());
///         ctx.terminate();
///     }
/// }
/// ```
pub trait Algorithm: Send + 'static {
    /// Payload type exchanged between nodes.
    type Message: Send + fmt::Debug + 'static;
    /// Value a node publishes for the driver to collect.
    type Output: Clone + Send + Sync + fmt::Debug + 'static;

    /// Called once at startup, before any message is processed.
    fn initialize(&mut self, ctx: &mut Ctx<'_, Self>);

    /// Called whenever new input is ready. See the trait docs for the
    /// batch semantics of each mode.
    fn handle(&mut self, ctx: &mut Ctx<'_, Self>, batch: Vec<Envelope<Self::Message>>);
}
