//! Errors raised while collecting.
//!
//! The per-node variants never abort a run: each one is reported to the log
//! sink and costs at most one file, one controller or one subtree. Only a
//! failure to start or finish the aggregator surfaces to the caller.

use std::io;
use std::path::PathBuf;

/// Error collecting metrics from the hierarchy.
#[derive(Debug)]
pub enum CollectError {
    /// The requested controller has no known file list.
    UnsupportedController(String),
    /// A single metric file could not be read.
    LeafRead { path: PathBuf, source: io::Error },
    /// A node's children could not be enumerated.
    DirectoryList { path: PathBuf, source: io::Error },
    /// A worker thread could not be started.
    Spawn(io::Error),
    /// The aggregator thread ended without producing a snapshot.
    AggregatorLost,
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::UnsupportedController(name) => {
                write!(f, "Controller \"{}\" is currently not supported.", name)
            }
            CollectError::LeafRead { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            CollectError::DirectoryList { path, source } => {
                write!(f, "failed to list {}: {}", path.display(), source)
            }
            CollectError::Spawn(e) => write!(f, "failed to spawn thread: {}", e),
            CollectError::AggregatorLost => write!(f, "aggregator terminated without a snapshot"),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::UnsupportedController(_) | CollectError::AggregatorLost => None,
            CollectError::LeafRead { source, .. }
            | CollectError::DirectoryList { source, .. }
            | CollectError::Spawn(source) => Some(source),
        }
    }
}
