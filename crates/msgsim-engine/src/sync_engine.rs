//! Lock-step round engine.
//!
//! One round is: barrier → shutdown checks → jitter → drain → flush.
//! All checks run at the round boundary, while every live node is
//! blocked waiting for its batch, so forced termination never
//! interrupts a handler. The collective-shutdown check therefore sees
//! the flags set during the round flushed last, and whatever the nodes
//! queued in that round is counted as dropped rather than flushed into
//! inboxes that are about to be cleared.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use msgsim_node::NodeCell;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace, warn};

use crate::barrier::{BarrierWait, RoundBarrier};
use crate::buffer::StagingBuffer;
use crate::error::SimError;
use crate::metrics::RunMetrics;
use crate::simulation::{EngineRun, RunOutcome};

pub(crate) struct SyncEngine<M, R> {
    cells: Vec<Arc<NodeCell<M, R>>>,
    barrier: RoundBarrier,
    pending: StagingBuffer<M>,
    rng: ChaCha8Rng,
    max_delay_nanos: u64,
    max_rounds: Option<u64>,
    stop: Arc<AtomicBool>,
    metrics: RunMetrics,
}

impl<M: fmt::Debug, R> SyncEngine<M, R> {
    pub(crate) fn new(
        cells: Vec<Arc<NodeCell<M, R>>>,
        barrier: RoundBarrier,
        rng: ChaCha8Rng,
        max_delay: Duration,
        max_rounds: Option<u64>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            cells,
            barrier,
            pending: StagingBuffer::new(),
            rng,
            // Validated to fit by SimConfig::validate.
            max_delay_nanos: u64::try_from(max_delay.as_nanos()).unwrap_or(u64::MAX),
            max_rounds,
            stop,
            metrics: RunMetrics::default(),
        }
    }

    /// Run rounds until an outcome is reached, then force-terminate any
    /// remaining nodes.
    pub(crate) fn run(mut self) -> Result<EngineRun, SimError> {
        let started = Instant::now();
        let result = loop {
            match self.step_round() {
                Ok(None) => {}
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
                    rounds = self.metrics.rounds,
                    delivered = self.metrics.delivered,
                    dropped = self.metrics.dropped,
                    "sync run finished"
                );
                Ok(EngineRun {
                    outcome,
                    metrics: self.metrics,
                })
            }
            Err(e) => {
                warn!(error = %e, rounds = self.metrics.rounds, "sync run aborted");
                Err(e)
            }
        }
    }

    /// Execute one round. Returns `Some(outcome)` when the run is over.
    fn step_round(&mut self) -> Result<Option<RunOutcome>, SimError> {
        // 1. Barrier.
        if self.barrier.wait(&self.stop)? == BarrierWait::Stopped {
            return Ok(Some(RunOutcome::Stopped));
        }

        // 2. Termination checks at the round boundary.
        if self.barrier.live_count() == 0 {
            return Ok(Some(RunOutcome::AllTerminated));
        }
        if self.all_inactive() {
            return Ok(Some(RunOutcome::CollectiveShutdown));
        }
        if self.max_rounds.is_some_and(|max| self.metrics.rounds >= max) {
            return Ok(Some(RunOutcome::RoundLimit));
        }
        if self.stop.load(Ordering::Acquire) {
            return Ok(Some(RunOutcome::Stopped));
        }

        // 3. Jitter.
        if self.max_delay_nanos > 0 {
            let nanos = self.rng.random_range(0..=self.max_delay_nanos);
            thread::sleep(Duration::from_nanos(nanos));
        }

        // 4. Drain.
        self.drain();

        // 5. Flush.
        let staged = self.pending.len();
        self.flush();
        debug_assert!(self.pending.is_empty());

        self.metrics.rounds += 1;
        debug!(
            round = self.metrics.rounds,
            live = self.barrier.live_count(),
            staged,
            "round complete"
        );
        Ok(None)
    }

    /// Every node, terminated ones included, has set its inactive flag.
    /// A node that terminated without going inactive keeps the run going.
    fn all_inactive(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_inactive())
    }

    /// Move every outbox (terminated senders included) into the staging
    /// buffer, discarding messages for terminated recipients.
    fn drain(&mut self) {
        for cell in &self.cells {
            let from = cell.id();
            for out in cell.drain_outbox() {
                let to = out.to;
                if self.barrier.is_live(to) {
                    trace!(node = %from, %to, round = self.metrics.rounds, payload = ?out.payload, "staged");
                    self.pending.stage(to, out.into_envelope(from));
                } else {
                    trace!(node = %from, %to, "dropped: recipient terminated");
                    self.metrics.dropped += 1;
                }
            }
        }
    }

    /// Hand every live node its batch for this round, possibly empty.
    fn flush(&mut self) {
        for cell in &self.cells {
            let id = cell.id();
            if !self.barrier.is_live(id) {
                continue;
            }
            let batch = self.pending.take(id);
            let n = batch.len() as u64;
            if cell.deliver_batch(batch) {
                self.metrics.delivered += n;
            } else {
                self.metrics.dropped += n;
            }
        }
    }

    /// Force-terminate all nodes and count whatever is still queued as dropped.
    fn finish(&mut self) {
        let mut forced = 0usize;
        for cell in &self.cells {
            if cell.terminate() {
                forced += 1;
            }
            self.metrics.dropped += cell.drain_outbox().len() as u64;
        }
        self.metrics.dropped += self.pending.clear() as u64;
        if forced > 0 {
            debug!(forced, "force-terminated remaining nodes");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msgsim_core::{Envelope, NodeId};
    use msgsim_node::NodeReport;
    use rand::SeedableRng;

    type Cell = NodeCell<u32, ()>;

    /// Engine over `n` fully connected cells with no node threads; tests
    /// play the node side by hand.
    fn engine(
        n: u32,
        max_rounds: Option<u64>,
    ) -> (
        SyncEngine<u32, ()>,
        Vec<Arc<Cell>>,
        crossbeam_channel::Sender<NodeReport>,
    ) {
        let cells: Vec<Arc<Cell>> = (0..n)
            .map(|i| {
                let ns: Vec<NodeId> = (0..n).filter(|&j| j != i).map(NodeId).collect();
                Arc::new(NodeCell::new(NodeId(i), &ns))
            })
            .collect();
        let (tx, rx) = crossbeam_channel::unbounded();
        let engine = SyncEngine::new(
            cells.clone(),
            RoundBarrier::new(rx, n as usize),
            ChaCha8Rng::seed_from_u64(0),
            Duration::ZERO,
            max_rounds,
            Arc::new(AtomicBool::new(false)),
        );
        (engine, cells, tx)
    }

    fn all_ready(cells: &[Arc<Cell>], tx: &crossbeam_channel::Sender<NodeReport>) {
        for cell in cells.iter().filter(|c| c.is_alive()) {
            assert!(cell.mark_awaiting());
            tx.send(NodeReport::Ready(cell.id())).unwrap();
        }
    }

    #[test]
    fn round_moves_outboxes_into_inboxes() {
        let (mut engine, cells, tx) = engine(3, None);
        cells[0].enqueue(NodeId(1), 10).unwrap();
        cells[2].enqueue(NodeId(1), 20).unwrap();
        cells[1].enqueue(NodeId(0), 30).unwrap();
        all_ready(&cells, &tx);

        assert_eq!(engine.step_round(), Ok(None));
        let got: Vec<(NodeId, u32)> = cells[1]
            .take_inbox()
            .into_iter()
            .map(|Envelope { from, payload }| (from, payload))
            .collect();
        assert_eq!(got, vec![(NodeId(0), 10), (NodeId(2), 20)]);
        assert_eq!(cells[0].inbox_len(), 1);
        assert_eq!(cells[2].inbox_len(), 0);
        assert_eq!(engine.metrics.delivered, 3);
        assert_eq!(engine.metrics.rounds, 1);
    }

    #[test]
    fn terminated_sender_messages_still_flow() {
        let (mut engine, cells, tx) = engine(2, None);
        cells[0].enqueue(NodeId(1), 7).unwrap();
        cells[0].terminate();
        tx.send(NodeReport::Terminated(NodeId(0))).unwrap();
        assert!(cells[1].mark_awaiting());
        tx.send(NodeReport::Ready(NodeId(1))).unwrap();

        assert_eq!(engine.step_round(), Ok(None));
        assert_eq!(cells[1].take_inbox().len(), 1);
    }

    #[test]
    fn messages_to_terminated_nodes_are_dropped() {
        let (mut engine, cells, tx) = engine(2, None);
        cells[0].enqueue(NodeId(1), 7).unwrap();
        cells[1].terminate();
        tx.send(NodeReport::Terminated(NodeId(1))).unwrap();
        assert!(cells[0].mark_awaiting());
        tx.send(NodeReport::Ready(NodeId(0))).unwrap();

        assert_eq!(engine.step_round(), Ok(None));
        assert_eq!(engine.metrics.dropped, 1);
        assert_eq!(engine.metrics.delivered, 0);
    }

    #[test]
    fn all_inactive_triggers_collective_shutdown() {
        let (mut engine, cells, tx) = engine(3, None);
        for cell in &cells {
            cell.go_inactive();
        }
        all_ready(&cells, &tx);
        assert_eq!(
            engine.step_round(),
            Ok(Some(RunOutcome::CollectiveShutdown))
        );
    }

    #[test]
    fn one_active_node_keeps_the_run_going() {
        let (mut engine, cells, tx) = engine(3, None);
        cells[0].go_inactive();
        cells[1].go_inactive();
        all_ready(&cells, &tx);
        assert_eq!(engine.step_round(), Ok(None));
    }

    #[test]
    fn terminated_node_without_inactive_flag_blocks_shutdown() {
        let (mut engine, cells, tx) = engine(3, None);
        cells[0].terminate();
        tx.send(NodeReport::Terminated(NodeId(0))).unwrap();
        cells[1].go_inactive();
        cells[2].go_inactive();
        all_ready(&cells, &tx);
        assert_eq!(engine.step_round(), Ok(None));
        assert_eq!(engine.metrics.rounds, 1);
    }

    #[test]
    fn terminated_node_that_went_inactive_allows_shutdown() {
        let (mut engine, cells, tx) = engine(3, None);
        cells[0].go_inactive();
        cells[0].terminate();
        tx.send(NodeReport::Terminated(NodeId(0))).unwrap();
        cells[1].go_inactive();
        cells[2].go_inactive();
        all_ready(&cells, &tx);
        assert_eq!(
            engine.step_round(),
            Ok(Some(RunOutcome::CollectiveShutdown))
        );
    }

    #[test]
    fn final_round_messages_are_dropped_at_shutdown() {
        let (mut engine, cells, tx) = engine(2, None);
        cells[0].enqueue(NodeId(1), 5).unwrap();
        for cell in &cells {
            cell.go_inactive();
        }
        all_ready(&cells, &tx);
        assert_eq!(
            engine.step_round(),
            Ok(Some(RunOutcome::CollectiveShutdown))
        );
        assert_eq!(cells[1].inbox_len(), 0);
        engine.finish();
        assert_eq!(engine.metrics.delivered, 0);
        assert_eq!(engine.metrics.dropped, 1);
    }

    #[test]
    fn round_limit_is_checked_at_boundary() {
        let (mut engine, cells, tx) = engine(2, Some(1));
        all_ready(&cells, &tx);
        assert_eq!(engine.step_round(), Ok(None));
        all_ready(&cells, &tx);
        assert_eq!(engine.step_round(), Ok(Some(RunOutcome::RoundLimit)));
    }

    #[test]
    fn finish_terminates_and_counts_leftovers() {
        let (mut engine, cells, _tx) = engine(2, None);
        cells[0].enqueue(NodeId(1), 1).unwrap();
        cells[0].enqueue(NodeId(1), 2).unwrap();
        engine.finish();
        assert!(cells.iter().all(|c| !c.is_alive()));
        assert_eq!(engine.metrics.dropped, 2);
    }
}
