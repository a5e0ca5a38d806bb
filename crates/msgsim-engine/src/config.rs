//! Simulation configuration, validation, and error types.
//!
//! [`SimConfig`] is the input to [`Simulation::start`](crate::Simulation::start).
//! [`validate()`](SimConfig::validate) checks every structural invariant
//! eagerly, before any node is constructed or any thread is spawned.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use indexmap::IndexMap;
use msgsim_core::{Mode, NodeId};
use msgsim_node::Algorithm;
use msgsim_topology::{Topology, TopologyError};

/// Builds the algorithm instance for one node from its id, the run mode,
/// and that node's parameters.
pub type NodeFactory<A, P> = Box<dyn Fn(NodeId, Mode, P) -> A + Send>;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SimConfig::validate()`] or while starting a
/// simulation (`CONFIGURATION_ERROR`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The edge list does not describe a valid topology.
    Topology(TopologyError),
    /// A node in `0..node_count` has no entry in `params`.
    MissingParams {
        /// The node without parameters.
        node: NodeId,
    },
    /// `params` has an entry for an id outside `0..node_count`.
    UnexpectedParams {
        /// The unknown id.
        node: NodeId,
    },
    /// `max_channel_delay` does not fit in `u64` nanoseconds.
    ChannelDelayTooLarge {
        /// The configured delay.
        delay: Duration,
    },
    /// `max_rounds` is `Some(0)`: the run could never start a round.
    ZeroMaxRounds,
    /// A node or engine thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topology(e) => write!(f, "topology: {e}"),
            Self::MissingParams { node } => write!(f, "no parameters for node {node}"),
            Self::UnexpectedParams { node } => {
                write!(f, "parameters given for unknown node {node}")
            }
            Self::ChannelDelayTooLarge { delay } => {
                write!(f, "max_channel_delay {delay:?} exceeds u64 nanoseconds")
            }
            Self::ZeroMaxRounds => write!(f, "max_rounds must be at least 1"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Topology(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TopologyError> for ConfigError {
    fn from(e: TopologyError) -> Self {
        Self::Topology(e)
    }
}

// ── SimConfig ──────────────────────────────────────────────────────

/// Complete configuration for a simulation run.
///
/// `P` is the per-node parameter type handed to the factory; use
/// [`SimConfig::uniform`] when nodes need no parameters.
pub struct SimConfig<A: Algorithm, P = ()> {
    /// Creates the algorithm instance for each node.
    pub factory: NodeFactory<A, P>,
    /// Parameters per node. Must contain exactly the ids `0..node_count`.
    pub params: IndexMap<NodeId, P>,
    /// Number of nodes. Ids are `0..node_count`.
    pub node_count: usize,
    /// Undirected edges of the static topology.
    pub edges: Vec<(NodeId, NodeId)>,
    /// Lock-step rounds or randomized asynchronous delivery.
    pub mode: Mode,
    /// Upper bound of the per-round jitter sleep. Inert in ASYNC mode.
    /// Default: zero (no jitter).
    pub max_channel_delay: Duration,
    /// Seed for the engine RNG (jitter, visiting order, coin flips).
    pub seed: u64,
    /// Stop a SYNC run after this many completed rounds. `None` (the
    /// default) runs until every node terminates or all go inactive.
    pub max_rounds: Option<u64>,
}

impl<A: Algorithm> SimConfig<A, ()> {
    /// Configuration for algorithms that take no per-node parameters.
    pub fn uniform(
        node_count: usize,
        edges: Vec<(NodeId, NodeId)>,
        mode: Mode,
        factory: impl Fn(NodeId, Mode) -> A + Send + 'static,
    ) -> Self {
        let params = (0..node_count).map(|i| (NodeId(i as u32), ())).collect();
        Self::with_params(node_count, edges, mode, params, move |id, mode, ()| {
            factory(id, mode)
        })
    }
}

impl<A: Algorithm, P> SimConfig<A, P> {
    /// Configuration with explicit per-node parameters.
    pub fn with_params(
        node_count: usize,
        edges: Vec<(NodeId, NodeId)>,
        mode: Mode,
        params: IndexMap<NodeId, P>,
        factory: impl Fn(NodeId, Mode, P) -> A + Send + 'static,
    ) -> Self {
        Self {
            factory: Box::new(factory),
            params,
            node_count,
            edges,
            mode,
            max_channel_delay: Duration::ZERO,
            seed: 0,
            max_rounds: None,
        }
    }

    /// Set the engine RNG seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the per-round jitter bound (SYNC only).
    pub fn max_channel_delay(mut self, delay: Duration) -> Self {
        self.max_channel_delay = delay;
        self
    }

    /// Bound the number of SYNC rounds.
    pub fn max_rounds(mut self, rounds: u64) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    /// Validate all structural invariants without constructing anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validated_topology().map(|_| ())
    }

    /// Validate and return the topology the run will use.
    pub(crate) fn validated_topology(&self) -> Result<Topology, ConfigError> {
        // 1. Edge list (also rejects zero nodes and oversized counts).
        let topology = Topology::from_edges(self.node_count, &self.edges)?;

        // 2. Params cover exactly the node ids.
        for id in topology.node_ids() {
            if !self.params.contains_key(&id) {
                return Err(ConfigError::MissingParams { node: id });
            }
        }
        if let Some(&node) = self.params.keys().find(|id| !topology.contains(**id)) {
            return Err(ConfigError::UnexpectedParams { node });
        }

        // 3. Jitter bound must be representable for the RNG draw.
        if u64::try_from(self.max_channel_delay.as_nanos()).is_err() {
            return Err(ConfigError::ChannelDelayTooLarge {
                delay: self.max_channel_delay,
            });
        }

        // 4. A zero round budget is always a mistake.
        if self.max_rounds == Some(0) {
            return Err(ConfigError::ZeroMaxRounds);
        }

        Ok(topology)
    }
}

impl<A: Algorithm, P> fmt::Debug for SimConfig<A, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimConfig")
            .field("node_count", &self.node_count)
            .field("edges", &self.edges.len())
            .field("params", &self.params.len())
            .field("mode", &self.mode)
            .field("max_channel_delay", &self.max_channel_delay)
            .field("seed", &self.seed)
            .field("max_rounds", &self.max_rounds)
            .finish()
    }
}
