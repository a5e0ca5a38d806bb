//! Test topologies and scripted algorithms for msgsim development.
//!
//! [`topologies`] builds edge lists for the standard graph shapes;
//! [`fixtures`] holds small [`Algorithm`](msgsim_node::Algorithm)
//! implementations whose behavior is fixed in advance, for exercising
//! the engines without depending on a real distributed algorithm.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod topologies;

pub use fixtures::{BroadcastOnce, GoInactive, PanicOn, RoundRecorder, Sequence, Silent, Tagged};
pub use topologies::{complete_edges, path_edges, ring_edges, star_edges};
