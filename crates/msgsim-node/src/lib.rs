//! Node contract and node-side runtime for msgsim simulations.
//!
//! Defines the [`Algorithm`] trait that every distributed algorithm
//! implements, the [`NodeContext`] through which a handler talks to the
//! simulated network, and the [`NodeCell`] holding the per-node state that
//! the node thread and the engine thread share.
//!
//! # Threading
//!
//! Each node runs on its own OS thread driven by [`run_node`]. The engine
//! thread touches a node only through its [`NodeCell`], whose status,
//! inactive flag and inbox sit behind one mutex per node; the outbox sits
//! behind a second per-node mutex. There is no network-wide lock.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod algorithm;
pub mod cell;
pub mod context;
pub mod runtime;

pub use algorithm::{Algorithm, Ctx};
pub use cell::NodeCell;
pub use context::NodeContext;
pub use runtime::{run_node, NodeReport};
