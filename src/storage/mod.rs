//! Snapshot model and output.
//!
//! - [`model`]: `Snapshot`, `NodeMetrics`, `NodeReport`
//! - [`appender`]: one JSON line per run, appended to the output log

pub mod appender;
pub mod model;

pub use appender::{OutputError, SnapshotAppender, render_line};
pub use model::Snapshot;
