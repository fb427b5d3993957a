//! Leaf reader for cgroup v2 controller files.

use std::path::Path;
use std::sync::Arc;

use crate::collector::error::CollectError;
use crate::collector::traits::FileSystem;
use crate::storage::model::NodeMetrics;
use crate::util::LogSink;

use super::registry::ControllerRegistry;

/// Reads the metric files of one controller under one node.
///
/// Implementations report per-file failures themselves and return whatever
/// subset was readable. Only an unknown controller is an error.
pub trait LeafReader: Send + Sync {
    fn read(&self, node_path: &Path, controller: &str) -> Result<NodeMetrics, CollectError>;
}

/// Strips the single trailing newline the kernel appends to cgroup files.
pub fn normalize(content: &str) -> &str {
    content.strip_suffix('\n').unwrap_or(content)
}

/// Reads controller files from a cgroup v2 hierarchy.
pub struct CgroupReader<F: FileSystem> {
    fs: F,
    registry: ControllerRegistry,
    sink: Arc<dyn LogSink>,
}

impl<F: FileSystem> CgroupReader<F> {
    /// Creates a reader.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation
    /// * `registry` - Supported controllers and their files
    /// * `sink` - Destination for per-file read failures
    pub fn new(fs: F, registry: ControllerRegistry, sink: Arc<dyn LogSink>) -> Self {
        Self { fs, registry, sink }
    }
}

impl<F: FileSystem> LeafReader for CgroupReader<F> {
    fn read(&self, node_path: &Path, controller: &str) -> Result<NodeMetrics, CollectError> {
        let files = self
            .registry
            .files(controller)
            .ok_or_else(|| CollectError::UnsupportedController(controller.to_string()))?;

        let mut metrics = NodeMetrics::new();
        for file in files {
            let path = node_path.join(file);
            match self.fs.read_to_string(&path) {
                Ok(content) => {
                    metrics.insert(file.clone(), normalize(&content).to_string());
                }
                Err(source) => {
                    self.sink
                        .error(&CollectError::LeafRead { path, source }.to_string());
                }
            }
        }

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::MockFs;
    use crate::util::MemorySink;
    use tracing::Level;

    fn reader(fs: MockFs, sink: &Arc<MemorySink>) -> CgroupReader<MockFs> {
        CgroupReader::new(fs, ControllerRegistry::default(), sink.clone())
    }

    #[test]
    fn test_normalize_strips_one_newline() {
        assert_eq!(normalize("100\n"), "100");
        assert_eq!(normalize("100"), "100");
        assert_eq!(normalize("a\nb\n\n"), "a\nb\n");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_read_memory_partial_subset() {
        let mut fs = MockFs::new();
        fs.add_node(
            "/cg/a",
            &[
                ("memory.current", "100\n"),
                ("memory.stat", "anon 1\nfile 2\n"),
                ("unrelated", "x\n"),
            ],
        );
        let sink = Arc::new(MemorySink::new());

        let metrics = reader(fs, &sink)
            .read(Path::new("/cg/a"), "memory")
            .unwrap();

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics["memory.current"], "100");
        assert_eq!(metrics["memory.stat"], "anon 1\nfile 2");
        // One failure per missing file
        assert_eq!(sink.count(Level::ERROR), 8);
        assert!(sink.contains(Level::ERROR, "memory.swap.max"));
    }

    #[test]
    fn test_read_unsupported_controller() {
        let mut fs = MockFs::new();
        fs.add_node("/cg/a", &[("cpu.stat", "usage_usec 1\n")]);
        let sink = Arc::new(MemorySink::new());

        let err = reader(fs, &sink)
            .read(Path::new("/cg/a"), "cpu")
            .unwrap_err();

        assert!(matches!(err, CollectError::UnsupportedController(ref c) if c == "cpu"));
        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_read_permission_denied_file() {
        let mut fs = MockFs::new();
        fs.add_node(
            "/cg/a",
            &[("memory.current", "1\n"), ("memory.max", "max\n")],
        );
        fs.deny("/cg/a/memory.max");
        let sink = Arc::new(MemorySink::new());

        let metrics = reader(fs, &sink)
            .read(Path::new("/cg/a"), "memory")
            .unwrap();

        assert_eq!(metrics.keys().collect::<Vec<_>>(), vec!["memory.current"]);
        assert!(sink.contains(Level::ERROR, "permission denied"));
    }

    #[test]
    fn test_read_custom_controller() {
        let mut fs = MockFs::new();
        fs.add_node("/cg/a", &[("pids.current", "7\n")]);
        let mut registry = ControllerRegistry::default();
        registry.register("pids", ["pids.current"]);
        let sink = Arc::new(MemorySink::new());

        let metrics = CgroupReader::new(fs, registry, sink.clone())
            .read(Path::new("/cg/a"), "pids")
            .unwrap();

        assert_eq!(metrics["pids.current"], "7");
        assert!(sink.records().is_empty());
    }
}
