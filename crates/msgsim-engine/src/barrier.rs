//! SYNC round barrier: a wait-group over the shrinking live set.
//!
//! Every live node sends exactly one `Ready` or `Terminated` report per
//! round. The barrier blocks on the report channel until each live node
//! has reported, then the engine may drain and flush.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use msgsim_core::NodeId;
use msgsim_node::NodeReport;
use tracing::trace;

use crate::error::SimError;

/// How often a blocked barrier re-checks the stop flag.
const STOP_POLL: Duration = Duration::from_millis(10);

/// Result of waiting for one round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BarrierWait {
    /// Every live node reported.
    Complete,
    /// A stop was requested while waiting.
    Stopped,
}

pub(crate) struct RoundBarrier {
    reports: Receiver<NodeReport>,
    live: Vec<bool>,
    live_count: usize,
    reported: Vec<bool>,
}

impl RoundBarrier {
    pub(crate) fn new(reports: Receiver<NodeReport>, node_count: usize) -> Self {
        Self {
            reports,
            live: vec![true; node_count],
            live_count: node_count,
            reported: vec![false; node_count],
        }
    }

    /// Number of nodes that have not reported `Terminated`.
    pub(crate) fn live_count(&self) -> usize {
        self.live_count
    }

    /// Whether node `id` is still in the live set.
    pub(crate) fn is_live(&self, id: NodeId) -> bool {
        self.live.get(id.index()).copied().unwrap_or(false)
    }

    /// Block until every live node has reported for this round.
    ///
    /// A `Faulted` report ends the wait with
    /// [`SimError::AlgorithmFault`].
    pub(crate) fn wait(&mut self, stop: &AtomicBool) -> Result<BarrierWait, SimError> {
        self.reported.iter_mut().for_each(|r| *r = false);
        let mut pending = self.live_count;

        while pending > 0 {
            let report = match self.reports.recv_timeout(STOP_POLL) {
                Ok(report) => report,
                Err(RecvTimeoutError::Timeout) => {
                    if stop.load(Ordering::Acquire) {
                        return Ok(BarrierWait::Stopped);
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(SimError::EngineFault {
                        reason: format!("report channel closed with {pending} nodes pending"),
                    });
                }
            };
            trace!(?report, pending, "barrier report");

            match report {
                NodeReport::Ready(id) => {
                    let i = id.index();
                    if self.live[i] && !self.reported[i] {
                        self.reported[i] = true;
                        pending -= 1;
                    }
                }
                NodeReport::Terminated(id) => {
                    let i = id.index();
                    if self.live[i] {
                        self.live[i] = false;
                        self.live_count -= 1;
                        if !self.reported[i] {
                            self.reported[i] = true;
                            pending -= 1;
                        }
                    }
                }
                NodeReport::Faulted(node) => {
                    return Err(SimError::AlgorithmFault {
                        node,
                        reason: "handler panicked".into(),
                    });
                }
            }
        }
        Ok(BarrierWait::Complete)
    }
}
