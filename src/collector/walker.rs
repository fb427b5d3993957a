//! Concurrent bounded-depth tree walker.
//!
//! Each visited node runs on its own thread. A node samples itself, then
//! spawns one walker per child directory while depth remains, and releases
//! its `WorkToken` without waiting for the children. Completion of the
//! whole walk is observed through the `WorkTracker`, not through joins.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::Sender;

use crate::collector::error::CollectError;
use crate::collector::tracker::{WorkToken, WorkTracker};
use crate::collector::traits::FileSystem;
use crate::collector::visitor::{NodeVisitor, Publish};
use crate::storage::model::NodeReport;
use crate::util::LogSink;

/// Name given to walker threads.
pub const WALKER_THREAD_NAME: &str = "cgar-walk";

/// Builds the identifier of child `name` under `parent`.
///
/// Children of the mount point itself (empty identifier) are named bare.
pub fn child_id(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Walks the hierarchy below a mount point.
pub struct TreeWalker<F: FileSystem> {
    fs: F,
    mount: PathBuf,
    visitor: NodeVisitor,
    sink: Arc<dyn LogSink>,
}

impl<F: FileSystem + 'static> TreeWalker<F> {
    /// Creates a walker.
    ///
    /// # Arguments
    /// * `fs` - Filesystem used to list child directories
    /// * `mount` - Hierarchy mount point (e.g., "/sys/fs/cgroup")
    /// * `visitor` - Per-node reader
    /// * `sink` - Destination for listing failures
    pub fn new(
        fs: F,
        mount: impl Into<PathBuf>,
        visitor: NodeVisitor,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            fs,
            mount: mount.into(),
            visitor,
            sink,
        }
    }

    /// Filesystem path of node `id`.
    pub fn node_path(&self, id: &str) -> PathBuf {
        if id.is_empty() {
            self.mount.clone()
        } else {
            self.mount.join(id)
        }
    }

    /// Walks `node` and up to `depth` levels below it.
    ///
    /// `node` is the snapshot key and `node_path` the directory it was
    /// found at; only `node_path` is used for reads, since a lossily
    /// decoded name may not exist on disk. `token` is the unit registered
    /// for this node by the caller; it is released once the node is sampled
    /// and its children are spawned.
    #[allow(clippy::too_many_arguments)]
    pub fn walk(
        self: &Arc<Self>,
        tx: Sender<NodeReport>,
        tracker: &WorkTracker,
        token: WorkToken,
        node: String,
        node_path: PathBuf,
        depth: u32,
        controllers: Arc<[String]>,
    ) {
        self.sink.debug(&format!(
            "Retrieving data from \"{}\"...",
            node_path.display()
        ));

        if self.visitor.publish(&tx, &node, &node_path, &controllers) == Publish::Closed {
            return;
        }

        if depth > 0 {
            for child_path in self.child_dirs(&node_path) {
                let Some(name) = child_path.file_name() else {
                    continue;
                };
                let child = child_id(&node, &name.to_string_lossy());
                self.spawn(&tx, tracker, child, child_path, depth - 1, &controllers);
            }
        }

        drop(tx);
        token.done();
    }

    /// Immediate child directories of `path`, sorted by path.
    ///
    /// A listing failure is reported and yields no children.
    pub fn child_dirs(&self, path: &Path) -> Vec<PathBuf> {
        let entries = match self.fs.read_dir(path) {
            Ok(entries) => entries,
            Err(source) => {
                let err = CollectError::DirectoryList {
                    path: path.to_path_buf(),
                    source,
                };
                self.sink.error(&err.to_string());
                return Vec::new();
            }
        };

        let mut dirs: Vec<PathBuf> = entries
            .into_iter()
            .filter(|entry| entry.file_name().is_some() && self.fs.is_dir(entry))
            .collect();
        dirs.sort();
        dirs
    }

    /// Walks the configured root `node` below the mount point on a new
    /// thread.
    pub fn spawn_root(
        self: &Arc<Self>,
        tx: &Sender<NodeReport>,
        tracker: &WorkTracker,
        node: String,
        depth: u32,
        controllers: &Arc<[String]>,
    ) {
        let node_path = self.node_path(&node);
        self.spawn(tx, tracker, node, node_path, depth, controllers);
    }

    /// Registers one unit and walks `node` on a new thread.
    ///
    /// If the thread cannot be started the node is walked inline, so no
    /// subtree is lost.
    pub fn spawn(
        self: &Arc<Self>,
        tx: &Sender<NodeReport>,
        tracker: &WorkTracker,
        node: String,
        node_path: PathBuf,
        depth: u32,
        controllers: &Arc<[String]>,
    ) {
        let walker = Arc::clone(self);
        let child_tx = tx.clone();
        let child_tracker = tracker.clone();
        let token = tracker.register();
        let child_node = node.clone();
        let child_path = node_path.clone();
        let child_controllers = Arc::clone(controllers);

        let spawned = thread::Builder::new()
            .name(WALKER_THREAD_NAME.to_string())
            .spawn(move || {
                walker.walk(
                    child_tx,
                    &child_tracker,
                    token,
                    child_node,
                    child_path,
                    depth,
                    child_controllers,
                );
            });

        if let Err(e) = spawned {
            self.sink.warn(&format!(
                "{}; walking \"{}\" inline",
                CollectError::Spawn(e),
                node
            ));
            let token = tracker.register();
            self.walk(
                tx.clone(),
                tracker,
                token,
                node,
                node_path,
                depth,
                Arc::clone(controllers),
            );
        }
    }
}
