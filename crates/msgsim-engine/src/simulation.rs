//! The driver-facing simulation handle.
//!
//! [`Simulation::start`] validates the configuration, constructs every
//! node, and spawns one thread per node plus one engine thread.
//! [`Simulation::join`] waits for the engine to reach an outcome, joins
//! all node threads and returns the published results.
//!
//! Dropping a running simulation requests a stop and joins everything,
//! so no thread outlives its handle.

use std::any::Any;
use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use msgsim_core::{Mode, NodeId, NodeStatus};
use msgsim_node::{run_node, Algorithm, NodeCell};
use msgsim_topology::Topology;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::async_engine::AsyncEngine;
use crate::barrier::RoundBarrier;
use crate::config::{ConfigError, SimConfig};
use crate::error::SimError;
use crate::metrics::RunMetrics;
use crate::sync_engine::SyncEngine;

// ── RunOutcome ─────────────────────────────────────────────────────

/// Why the engine stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every node terminated on its own.
    AllTerminated,
    /// SYNC: every node went inactive; the live ones were force-terminated.
    CollectiveShutdown,
    /// ASYNC: every live node was waiting on an empty inbox with nothing
    /// in flight; the rest were force-terminated.
    Quiescent,
    /// SYNC: the configured `max_rounds` was reached.
    RoundLimit,
    /// The driver requested a stop.
    Stopped,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AllTerminated => "all-terminated",
            Self::CollectiveShutdown => "collective-shutdown",
            Self::Quiescent => "quiescent",
            Self::RoundLimit => "round-limit",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// What an engine thread hands back on success.
pub(crate) struct EngineRun {
    pub(crate) outcome: RunOutcome,
    pub(crate) metrics: RunMetrics,
}

// ── RunReport ──────────────────────────────────────────────────────

/// Results of a completed run.
#[derive(Clone, Debug)]
pub struct RunReport<R> {
    /// Why the run ended.
    pub outcome: RunOutcome,
    /// Published result per node, indexed by id. `None` if the node
    /// never published.
    pub results: Vec<Option<R>>,
    /// Counters collected by the engine.
    pub metrics: RunMetrics,
}

impl<R> RunReport<R> {
    /// The result published by node `id`, if any.
    pub fn result(&self, id: NodeId) -> Option<&R> {
        self.results.get(id.index()).and_then(Option::as_ref)
    }

    /// Iterate over `(id, result)` for every node that published.
    pub fn published(&self) -> impl Iterator<Item = (NodeId, &R)> + '_ {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().map(|r| (NodeId(i as u32), r)))
    }

    /// Whether every node published a result.
    pub fn all_published(&self) -> bool {
        self.results.iter().all(Option::is_some)
    }
}

// ── Simulation ─────────────────────────────────────────────────────

type Cells<A> = Vec<Arc<NodeCell<<A as Algorithm>::Message, <A as Algorithm>::Output>>>;

/// A running simulation.
///
/// # Examples
///
/// ```
/// use msgsim_core::{Envelope, Mode, NodeId};
/// use msgsim_engine::{RunOutcome, SimConfig, Simulation};
/// use msgsim_node::{Algorithm, Ctx};
///
/// /// Publishes the number of neighbors it heard from, then stops.
/// struct Census;
///
/// impl Algorithm for Census {
///     type Message = ();
///     type Output = usize;
///
///     fn initialize(&mut self, ctx: &mut Ctx<'_, Self>) {
///         ctx.broadcast(());
///     }
///
///     fn handle(&mut self, ctx: &mut Ctx<'_, Self>, batch: Vec<Envelope<()>>) {
///         ctx.publish_result(batch.len());
///         ctx.terminate();
///     }
/// }
///
/// let edges = vec![(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2))];
/// let config = SimConfig::uniform(3, edges, Mode::Sync, |_, _| Census);
/// let report = Simulation::run(config).unwrap();
///
/// assert_eq!(report.outcome, RunOutcome::AllTerminated);
/// assert_eq!(report.result(NodeId(1)), Some(&2));
/// ```
pub struct Simulation<A: Algorithm> {
    cells: Cells<A>,
    node_threads: Vec<JoinHandle<()>>,
    engine_thread: Option<JoinHandle<Result<EngineRun, SimError>>>,
    stop: Arc<AtomicBool>,
    mode: Mode,
    topology: Topology,
}

impl<A: Algorithm> Simulation<A> {
    /// Validate `config`, construct every node and start all threads.
    ///
    /// Every factory call happens before the first thread is spawned, and
    /// no factory is called if validation fails.
    pub fn start<P>(config: SimConfig<A, P>) -> Result<Self, ConfigError> {
        let topology = config.validated_topology()?;
        let SimConfig {
            factory,
            mut params,
            mode,
            max_channel_delay,
            seed,
            max_rounds,
            ..
        } = config;
        let node_count = topology.node_count();

        // Construct everything up front.
        let mut nodes = Vec::with_capacity(node_count);
        for id in topology.node_ids() {
            let Some(p) = params.swap_remove(&id) else {
                return Err(ConfigError::MissingParams { node: id });
            };
            let cell = Arc::new(NodeCell::new(id, topology.neighbors(id)));
            nodes.push((factory(id, mode, p), cell));
        }
        let cells: Cells<A> = nodes.iter().map(|(_, cell)| Arc::clone(cell)).collect();

        // Node threads.
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut node_threads = Vec::with_capacity(node_count);
        for (algorithm, cell) in nodes {
            let id = cell.id();
            let reports = tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("msgsim-node-{id}"))
                .spawn(move || run_node(algorithm, cell, mode, reports));
            match spawned {
                Ok(handle) => node_threads.push(handle),
                Err(e) => {
                    abort_start(&cells, node_threads);
                    return Err(ConfigError::ThreadSpawnFailed {
                        reason: format!("node {id}: {e}"),
                    });
                }
            }
        }
        drop(tx);

        // Engine thread.
        let stop = Arc::new(AtomicBool::new(false));
        let rng = ChaCha8Rng::seed_from_u64(seed);
        let spawned = match mode {
            Mode::Sync => {
                let engine = SyncEngine::new(
                    cells.clone(),
                    RoundBarrier::new(rx, node_count),
                    rng,
                    max_channel_delay,
                    max_rounds,
                    Arc::clone(&stop),
                );
                thread::Builder::new()
                    .name("msgsim-sync".into())
                    .spawn(move || engine.run())
            }
            Mode::Async => {
                let engine = AsyncEngine::new(cells.clone(), rx, rng, Arc::clone(&stop));
                thread::Builder::new()
                    .name("msgsim-async".into())
                    .spawn(move || engine.run())
            }
        };
        let engine_thread = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                abort_start(&cells, node_threads);
                return Err(ConfigError::ThreadSpawnFailed {
                    reason: format!("engine: {e}"),
                });
            }
        };

        info!(
            nodes = node_count,
            edges = topology.edge_count(),
            %mode,
            seed,
            "simulation started"
        );

        Ok(Self {
            cells,
            node_threads,
            engine_thread: Some(engine_thread),
            stop,
            mode,
            topology,
        })
    }

    /// Start a simulation and wait for it to finish.
    pub fn run<P>(config: SimConfig<A, P>) -> Result<RunReport<A::Output>, SimError> {
        Self::start(config)?.join()
    }

    /// Wait for the run to reach an outcome and collect the results.
    ///
    /// If any handler panicked, returns [`SimError::AlgorithmFault`] for
    /// the lowest-id faulted node and no partial results.
    pub fn join(mut self) -> Result<RunReport<A::Output>, SimError> {
        self.collect()
    }

    /// Ask the engine to stop at its next round boundary (SYNC) or pass
    /// (ASYNC), then join. A run that already finished keeps its outcome.
    pub fn shutdown(mut self) -> Result<RunReport<A::Output>, SimError> {
        self.stop.store(true, Ordering::Release);
        self.collect()
    }

    /// Current status of node `id`, or `None` for an unknown id.
    pub fn status(&self, id: NodeId) -> Option<NodeStatus> {
        self.cells.get(id.index()).map(|cell| cell.status())
    }

    /// Whether the engine thread has exited.
    pub fn is_finished(&self) -> bool {
        self.engine_thread
            .as_ref()
            .is_none_or(|handle| handle.is_finished())
    }

    /// The run's scheduling mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The static topology the nodes were built from.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    fn collect(&mut self) -> Result<RunReport<A::Output>, SimError> {
        let engine = match self.engine_thread.take() {
            Some(handle) => handle.join().unwrap_or_else(|payload| {
                Err(SimError::EngineFault {
                    reason: panic_message(&*payload),
                })
            }),
            None => Err(SimError::EngineFault {
                reason: "engine already joined".into(),
            }),
        };
        if engine.is_err() {
            for cell in &self.cells {
                cell.terminate();
            }
        }

        // Threads were pushed in id order.
        let mut fault = None;
        for (i, handle) in mem::take(&mut self.node_threads).into_iter().enumerate() {
            if let Err(payload) = handle.join() {
                if fault.is_none() {
                    fault = Some(SimError::AlgorithmFault {
                        node: NodeId(i as u32),
                        reason: panic_message(&*payload),
                    });
                }
            }
        }
        if let Some(fault) = fault {
            return Err(fault);
        }

        let run = engine?;
        Ok(RunReport {
            outcome: run.outcome,
            results: self.cells.iter().map(|cell| cell.result().cloned()).collect(),
            metrics: run.metrics,
        })
    }
}

impl<A: Algorithm> Drop for Simulation<A> {
    fn drop(&mut self) {
        if self.engine_thread.is_some() || !self.node_threads.is_empty() {
            self.stop.store(true, Ordering::Release);
            let _ = self.collect();
        }
    }
}

impl<A: Algorithm> fmt::Debug for Simulation<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("mode", &self.mode)
            .field("nodes", &self.cells.len())
            .field("edges", &self.topology.edge_count())
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Undo a partial start: release every node and join the threads
/// already spawned.
fn abort_start<M, R>(cells: &[Arc<NodeCell<M, R>>], node_threads: Vec<JoinHandle<()>>) {
    for cell in cells {
        cell.terminate();
    }
    for handle in node_threads {
        let _ = handle.join();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".into()
    }
}
