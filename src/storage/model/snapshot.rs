//! Snapshot structures produced by one collection run.
//!
//! A run produces exactly one `Snapshot`. Its JSON form is a single-key
//! object so that consecutive lines of the output log can be told apart by
//! timestamp alone:
//!
//! ```text
//! {"2026-10-19T12:00:00+02:00":{"system.slice":{"memory.current":"536870912"}}}
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Local, SecondsFormat};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Metric file name → normalized file content for one tree node.
pub type NodeMetrics = BTreeMap<String, String>;

/// Metrics of one node, as published by a visitor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeReport {
    /// Node identifier relative to the hierarchy mount point.
    pub node: String,
    pub metrics: NodeMetrics,
}

/// The aggregated result of one collection run.
///
/// The timestamp is fixed before the first node is merged, so every entry
/// shares it regardless of how long individual reads took.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub timestamp: DateTime<Local>,
    pub nodes: BTreeMap<String, NodeMetrics>,
}

impl Snapshot {
    /// Creates an empty snapshot stamped with `timestamp`.
    pub fn new(timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            nodes: BTreeMap::new(),
        }
    }

    /// Merges a node report. A repeated node identifier replaces the
    /// earlier entry.
    pub fn insert(&mut self, report: NodeReport) {
        self.nodes.insert(report.node, report.metrics);
    }

    /// RFC 3339 form of the timestamp used as the top-level JSON key.
    pub fn timestamp_key(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.timestamp_key(), &self.nodes)?;
        map.end()
    }
}
