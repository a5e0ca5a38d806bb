//! Counters collected over a simulation run.

/// Totals for one run, filled in by the engine thread.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Completed SYNC rounds (flushes). Zero in ASYNC mode.
    pub rounds: u64,
    /// Completed ASYNC delivery passes. Zero in SYNC mode.
    pub passes: u64,
    /// Messages placed in a live recipient's inbox.
    pub delivered: u64,
    /// Messages discarded because the recipient had terminated, or left
    /// undelivered when the run ended.
    pub dropped: u64,
    /// Wall-clock duration of the engine loop, in microseconds.
    pub elapsed_us: u64,
}
