//! Concurrent cgroup hierarchy collector.
//!
//! This module walks a filesystem-backed resource-accounting tree in
//! parallel and folds the per-node metrics into a single `Snapshot`, with
//! support for mocking so tests run without a cgroup v2 mount.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Collector                           │
//! │                                                              │
//! │  ScanRequest ──► TreeWalker ──┬──► TreeWalker (child) ...    │
//! │  ScanRequest ──► TreeWalker   │         │                    │
//! │                     │         │    NodeVisitor               │
//! │                NodeVisitor    │         │                    │
//! │                     │         │         │                    │
//! │                     └─────────┴─────────┘                    │
//! │                               │ bounded channel              │
//! │                        ┌──────▼──────┐     ┌─────────────┐   │
//! │                        │ Aggregator  │     │ WorkTracker │   │
//! │                        └──────┬──────┘     └─────────────┘   │
//! └───────────────────────────────┼──────────────────────────────┘
//!                                 ▼
//!                              Snapshot
//!
//!   NodeVisitor ──► LeafReader (CgroupReader + ControllerRegistry)
//!   TreeWalker, CgroupReader ──► FileSystem (RealFs | MockFs)
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use std::sync::Arc;
//! use cgar::collector::{Collector, RealFs, ScanRequest};
//! use cgar::util::TracingSink;
//!
//! let collector = Collector::new(RealFs::new(), "/sys/fs/cgroup", Arc::new(TracingSink));
//! let snapshot = collector
//!     .collect(&[ScanRequest::new("system.slice", 1, ["memory"])])
//!     .unwrap();
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use std::sync::Arc;
//! use cgar::collector::{Collector, MockFs, ScanRequest};
//! use cgar::util::MemorySink;
//!
//! let fs = MockFs::typical_hierarchy();
//! let collector = Collector::new(fs, "/sys/fs/cgroup", Arc::new(MemorySink::new()));
//! let snapshot = collector
//!     .collect(&[ScanRequest::new("user.slice", 2, ["memory"])])
//!     .unwrap();
//! assert_eq!(snapshot.len(), 3);
//! ```

pub mod aggregator;
pub mod cgroup;
#[allow(clippy::module_inception)]
mod collector;
mod error;
pub mod mock;
mod request;
pub mod tracker;
pub mod traits;
pub mod visitor;
pub mod walker;

pub use aggregator::{Aggregator, aggregate};
pub use cgroup::{CgroupReader, ControllerRegistry, LeafReader};
pub use collector::Collector;
pub use error::CollectError;
pub use mock::MockFs;
pub use request::ScanRequest;
pub use tracker::{WorkToken, WorkTracker};
pub use traits::{FileSystem, RealFs};
pub use visitor::{NodeVisitor, Publish};
pub use walker::TreeWalker;
