//! Randomized asynchronous delivery engine.
//!
//! Each pass visits every node in a fresh random order. A visited node
//! gets one coin flip per message queued at the start of the visit; on
//! heads the front of its outbox is delivered straight into the target's
//! inbox. Only the front is ever eligible, so per-source FIFO holds for
//! every coin sequence.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::Receiver;
use msgsim_node::{NodeCell, NodeReport};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace, warn};

use crate::error::SimError;
use crate::metrics::RunMetrics;
use crate::simulation::{EngineRun, RunOutcome};

pub(crate) struct AsyncEngine<M, R> {
    cells: Vec<Arc<NodeCell<M, R>>>,
    reports: Receiver<NodeReport>,
    rng: ChaCha8Rng,
    stop: Arc<AtomicBool>,
    order: Vec<usize>,
    metrics: RunMetrics,
}

impl<M: fmt::Debug, R> AsyncEngine<M, R> {
    pub(crate) fn new(
        cells: Vec<Arc<NodeCell<M, R>>>,
        reports: Receiver<NodeReport>,
        rng: ChaCha8Rng,
        stop: Arc<AtomicBool>,
    ) -> Self {
        let order = (0..cells.len()).collect();
        Self {
            cells,
            reports,
            rng,
            stop,
            order,
            metrics: RunMetrics::default(),
        }
    }

    /// Run passes until every node has terminated, the system is
    /// quiescent, a stop is requested or a node faults.
    pub(crate) fn run(mut self) -> Result<EngineRun, SimError> {
        let started = Instant::now();
        let result = loop {
            match self.step() {
                Ok(None) => thread::yield_now(),
                Ok(Some(outcome)) => break Ok(outcome),
                Err(e) => break Err(e),
            }
        };

        self.finish();
        self.metrics.elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

        match result {
            Ok(outcome) => {
                info!(
                    %outcome,
                    passes = self.metrics.passes,
                    delivered = self.metrics.delivered,
                    dropped = self.metrics.dropped,
                    "async run finished"
                );
                Ok(EngineRun {
                    outcome,
                    metrics: self.metrics,
                })
            }
            Err(e) => {
                warn!(error = %e, passes = self.metrics.passes, "async run aborted");
                Err(e)
            }
        }
    }

    /// Check for an outcome, otherwise run one delivery pass.
    fn step(&mut self) -> Result<Option<RunOutcome>, SimError> {
        self.poll_reports()?;

        if self.stop.load(Ordering::Acquire) {
            return Ok(Some(RunOutcome::Stopped));
        }
        if self.cells.iter().all(|cell| !cell.is_alive()) {
            return Ok(Some(RunOutcome::AllTerminated));
        }
        if self.is_quiescent() {
            return Ok(Some(RunOutcome::Quiescent));
        }

        self.pass();
        Ok(None)
    }

    /// Surface node faults. `Ready`/`Terminated` carry nothing the engine
    /// cannot read from the cells directly.
    fn poll_reports(&self) -> Result<(), SimError> {
        while let Ok(report) = self.reports.try_recv() {
            if let NodeReport::Faulted(node) = report {
                return Err(SimError::AlgorithmFault {
                    node,
                    reason: "handler panicked".into(),
                });
            }
        }
        Ok(())
    }

    /// Nothing can happen again: every live node is blocked on an empty
    /// inbox and nothing is queued anywhere.
    ///
    /// Idle nodes stay idle until this engine delivers to them, so reading
    /// the idle flags before the outboxes cannot miss an in-flight send.
    fn is_quiescent(&self) -> bool {
        self.cells
            .iter()
            .all(|cell| !cell.is_alive() || cell.is_idle())
            && self.cells.iter().all(|cell| cell.outbox_len() == 0)
    }

    fn pass(&mut self) {
        let Self {
            cells,
            rng,
            order,
            metrics,
            ..
        } = self;

        order.shuffle(&mut *rng);
        for &i in order.iter() {
            let sender = &cells[i];
            let from = sender.id();
            let opportunities = sender.outbox_len();
            for _ in 0..opportunities {
                if !rng.random_bool(0.5) {
                    continue;
                }
                let Some(out) = sender.pop_outgoing() else {
                    break;
                };
                let to = out.to;
                let delivered = match cells.get(to.index()) {
                    Some(target) => {
                        trace!(node = %from, %to, payload = ?out.payload, "deliver");
                        target.deliver(out.into_envelope(from))
                    }
                    None => false,
                };
                if delivered {
                    metrics.delivered += 1;
                } else {
                    trace!(node = %from, %to, "dropped: recipient terminated");
                    metrics.dropped += 1;
                }
            }
        }
        metrics.passes += 1;
    }

    fn finish(&mut self) {
        let mut forced = 0usize;
        for cell in &self.cells {
            if cell.terminate() {
                forced += 1;
            }
            self.metrics.dropped += cell.drain_outbox().len() as u64;
        }
        if forced > 0 {
            debug!(forced, "force-terminated remaining nodes");
        }
    }
}
