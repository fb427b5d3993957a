//! Run coordinator that ties walkers and the aggregator together.
//!
//! The `Collector` struct performs one complete collection pass over a list
//! of scan requests and returns the resulting `Snapshot`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;

use crate::collector::aggregator::Aggregator;
use crate::collector::cgroup::{CgroupReader, ControllerRegistry, LeafReader};
use crate::collector::error::CollectError;
use crate::collector::request::ScanRequest;
use crate::collector::tracker::WorkTracker;
use crate::collector::traits::FileSystem;
use crate::collector::visitor::NodeVisitor;
use crate::collector::walker::TreeWalker;
use crate::storage::model::Snapshot;
use crate::util::LogSink;

/// Collects one snapshot of a cgroup hierarchy.
pub struct Collector<F: FileSystem + Clone> {
    fs: F,
    mount: PathBuf,
    registry: ControllerRegistry,
    reader: Option<Arc<dyn LeafReader>>,
    channel_capacity: usize,
    timeout: Option<Duration>,
    sink: Arc<dyn LogSink>,
}

impl<F: FileSystem + Clone + 'static> Collector<F> {
    /// Default cgroup v2 mount point.
    pub const DEFAULT_MOUNT: &'static str = "/sys/fs/cgroup";

    /// Default capacity of the channel between walkers and the aggregator.
    pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

    /// Creates a collector with the built-in controllers, no deadline and
    /// the default channel capacity.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `mount` - Hierarchy mount point (usually "/sys/fs/cgroup")
    /// * `sink` - Log destination shared by every component
    pub fn new(fs: F, mount: impl Into<PathBuf>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            fs,
            mount: mount.into(),
            registry: ControllerRegistry::default(),
            reader: None,
            channel_capacity: Self::DEFAULT_CHANNEL_CAPACITY,
            timeout: None,
            sink,
        }
    }

    /// Replaces the controller registry.
    pub fn with_registry(mut self, registry: ControllerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Uses a custom leaf reader instead of the registry-backed cgroup
    /// reader.
    pub fn with_reader(mut self, reader: Arc<dyn LeafReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Sets the channel capacity (values below 1 are raised to 1).
    ///
    /// A small buffer makes walkers wait for a slow aggregator; a large one
    /// only postpones that wait.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Bounds the whole run. On expiry the partial snapshot is returned.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Walks every request concurrently and returns the aggregated snapshot.
    pub fn collect(&self, requests: &[ScanRequest]) -> Result<Snapshot, CollectError> {
        let started = Instant::now();
        let deadline = self.timeout.map(|timeout| started + timeout);

        let reader: Arc<dyn LeafReader> = match &self.reader {
            Some(reader) => Arc::clone(reader),
            None => Arc::new(CgroupReader::new(
                self.fs.clone(),
                self.registry.clone(),
                Arc::clone(&self.sink),
            )),
        };
        let visitor = NodeVisitor::new(reader, Arc::clone(&self.sink));
        let walker = Arc::new(TreeWalker::new(
            self.fs.clone(),
            self.mount.clone(),
            visitor,
            Arc::clone(&self.sink),
        ));

        let (tx, rx) = bounded(self.channel_capacity);
        let aggregator = Aggregator::spawn(rx, deadline, Arc::clone(&self.sink))?;

        let tracker = WorkTracker::new();
        for request in requests {
            let controllers: Arc<[String]> = Arc::from(request.controllers.as_slice());
            walker.spawn_root(
                &tx,
                &tracker,
                request.cgroup.clone(),
                request.depth,
                &controllers,
            );
        }

        match deadline {
            None => tracker.wait(),
            Some(deadline) => {
                if !tracker.wait_until(deadline) {
                    self.sink.warn(&format!(
                        "collection deadline reached with {} walkers still running",
                        tracker.pending()
                    ));
                }
            }
        }

        // Closes the channel once the last walker drops its clone.
        drop(tx);
        let snapshot = aggregator.join()?;

        self.sink.info(&format!(
            "collected {} nodes from {} roots in {:?}",
            snapshot.len(),
            requests.len(),
            started.elapsed()
        ));
        Ok(snapshot)
    }
}
