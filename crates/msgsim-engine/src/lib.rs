//! Scheduling engines and the driver-facing simulation handle.
//!
//! [`Simulation`] validates a [`SimConfig`], builds the topology,
//! constructs every node, spawns one thread per node plus one engine
//! thread, and collects the published results into a [`RunReport`].
//!
//! Two engines are available, selected by [`Mode`](msgsim_core::Mode):
//!
//! - **Sync**: lock-step rounds. A barrier waits for every live node,
//!   outboxes drain into a per-destination staging buffer, and the buffer
//!   is flushed into inboxes as one batch per node per round.
//! - **Async**: randomized immediate delivery. Nodes are visited in a
//!   random order each pass and every queued message gets a coin flip;
//!   only the front of a sender's outbox is ever eligible, so per-source
//!   order is preserved.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod metrics;
pub mod simulation;

mod async_engine;
mod barrier;
mod buffer;
mod sync_engine;

pub use config::{ConfigError, NodeFactory, SimConfig};
pub use error::SimError;
pub use metrics::RunMetrics;
pub use simulation::{RunOutcome, RunReport, Simulation};
