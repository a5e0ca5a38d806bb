//! Static network topology for msgsim simulations.
//!
//! A [`Topology`] is built once from an undirected edge list and handed
//! to the engine at startup, which copies each node's neighbor set into
//! the node before any thread starts. The topology never changes after
//! construction.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod topology;

pub use error::TopologyError;
pub use topology::{Neighbors, Topology};
