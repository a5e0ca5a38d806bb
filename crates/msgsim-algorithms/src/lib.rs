//! Reference distributed algorithms for msgsim.
//!
//! Each algorithm works in both [`Mode::Sync`](msgsim_core::Mode::Sync)
//! and [`Mode::Async`](msgsim_core::Mode::Async):
//!
//! 1. [`RingElection`] — probe/reply leader election on a bidirectional
//!    ring, with probe distance doubling every phase. The largest id wins.
//! 2. [`GreedyColoring`] — id-priority vertex coloring with at most
//!    `Δ + 1` colors.
//! 3. [`Flood`] — broadcast from a root; nodes record hop count and parent
//!    and go inactive, so a SYNC run ends by collective shutdown.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod coloring;
pub mod election;
pub mod flood;

pub use coloring::{is_proper, ColorMsg, GreedyColoring};
pub use election::{ElectionMsg, RingElection};
pub use flood::{Flood, FloodResult, Hop};
