//! Run-level error type.

use std::error::Error;
use std::fmt;

use msgsim_core::NodeId;

use crate::config::ConfigError;

/// Errors that end a simulation run without a trustworthy result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// The configuration was rejected before any thread started.
    Config(ConfigError),
    /// A node handler panicked (`ALGORITHM_FAULT`). No partial results
    /// are returned.
    AlgorithmFault {
        /// The node whose handler panicked.
        node: NodeId,
        /// The panic message, if it was a string.
        reason: String,
    },
    /// The engine thread itself failed or lost contact with the nodes.
    EngineFault {
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::AlgorithmFault { node, reason } => {
                write!(f, "algorithm fault on node {node}: {reason}")
            }
            Self::EngineFault { reason } => write!(f, "engine fault: {reason}"),
        }
    }
}

impl Error for SimError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
