//! Core types for the msgsim message-passing simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace: node
//! identifiers, the node lifecycle status, the execution mode, message
//! envelopes, and the send-side error type.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod message;
pub mod status;

pub use error::SendError;
pub use id::NodeId;
pub use message::{Envelope, Outgoing};
pub use status::{Mode, NodeStatus};
