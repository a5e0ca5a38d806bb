//! msgsim: a message-passing network simulator for distributed algorithms.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all msgsim sub-crates. Every simulated node runs on its own thread and
//! talks to its neighbors only through messages; an engine thread
//! schedules delivery either in lock-step rounds or at random.
//!
//! # Quick start
//!
//! ```rust
//! use msgsim::prelude::*;
//!
//! let n = 7;
//! let edges: Vec<(NodeId, NodeId)> = (0..n)
//!     .map(|i| (NodeId(i), NodeId((i + 1) % n)))
//!     .collect();
//!
//! let config = SimConfig::uniform(n as usize, edges, Mode::Sync, |_, _| RingElection::new())
//!     .seed(42);
//! let report = Simulation::run(config).unwrap();
//!
//! assert_eq!(report.outcome, RunOutcome::AllTerminated);
//! assert!(report.published().all(|(_, leader)| *leader == NodeId(6)));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `msgsim-core` | Node ids, status, mode, envelopes, send errors |
//! | [`topology`] | `msgsim-topology` | Static undirected topology and its validation |
//! | [`node`] | `msgsim-node` | `Algorithm` trait, node context, per-node state |
//! | [`engine`] | `msgsim-engine` | Configuration, engines, the `Simulation` handle |
//! | [`algorithms`] | `msgsim-algorithms` | Ring election, greedy coloring, flooding |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core identifiers and message types (`msgsim-core`).
pub use msgsim_core as types;

/// Static topology (`msgsim-topology`).
///
/// [`topology::Topology::from_edges`] validates an edge list and builds
/// the symmetric neighbor sets.
pub use msgsim_topology as topology;

/// Node contract and node-side runtime (`msgsim-node`).
///
/// Implement [`node::Algorithm`] to define what every node does.
pub use msgsim_node as node;

/// Engines and the driver-facing handle (`msgsim-engine`).
pub use msgsim_engine as engine;

/// Reference distributed algorithms (`msgsim-algorithms`).
pub use msgsim_algorithms as algorithms;

/// Common imports for typical msgsim usage.
///
/// ```rust
/// use msgsim::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use msgsim_core::{Envelope, Mode, NodeId, NodeStatus, SendError};

    // Topology
    pub use msgsim_topology::{Topology, TopologyError};

    // Node contract
    pub use msgsim_node::{Algorithm, Ctx};

    // Engine
    pub use msgsim_engine::{
        ConfigError, RunMetrics, RunOutcome, RunReport, SimConfig, SimError, Simulation,
    };

    // Algorithms
    pub use msgsim_algorithms::{Flood, GreedyColoring, RingElection};
}
