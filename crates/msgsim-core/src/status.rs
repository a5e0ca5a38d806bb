//! Node lifecycle status and engine execution mode.

use std::fmt;

/// Lifecycle state of a simulated node.
///
/// ```text
/// Created ──► Processing ──► AwaitingInput ──► Delivered ──► Processing ...
///    │             │               │               │
///    └─────────────┴───────────────┴───────────────┴──► Terminated
/// ```
///
/// `Terminated` is absorbing: no transition ever leaves it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    /// Constructed, thread not yet running its initializer.
    Created,
    /// Idle and blocked waiting for the engine to deliver input.
    AwaitingInput,
    /// The engine has delivered input; the node has not picked it up yet.
    Delivered,
    /// Running `initialize` or a handler.
    Processing,
    /// Finished. Messages addressed to this node are dropped.
    Terminated,
}

impl NodeStatus {
    /// Whether this is the absorbing `Terminated` state.
    #[inline]
    pub fn is_terminated(self) -> bool {
        matches!(self, Self::Terminated)
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::AwaitingInput => "awaiting-input",
            Self::Delivered => "delivered",
            Self::Processing => "processing",
            Self::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

/// Execution semantics selected for a simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Lock-step rounds: every live node is invoked once per round with
    /// the full batch of messages drained in the previous round.
    Sync,
    /// Randomized immediate delivery: nodes consume one message at a time.
    Async,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => f.write_str("sync"),
            Self::Async => f.write_str("async"),
        }
    }
}
