//! Per-node visit: read every requested controller and publish the result.

use std::path::Path;
use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::collector::cgroup::LeafReader;
use crate::storage::model::{NodeMetrics, NodeReport};
use crate::util::LogSink;

/// Outcome of publishing one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    /// Metrics were sent to the aggregator.
    Sent,
    /// The node had no readable metrics; nothing was sent.
    Empty,
    /// The aggregator is gone; the run has been abandoned.
    Closed,
}

/// Reads and merges the controllers of one node.
#[derive(Clone)]
pub struct NodeVisitor {
    reader: Arc<dyn LeafReader>,
    sink: Arc<dyn LogSink>,
}

impl NodeVisitor {
    pub fn new(reader: Arc<dyn LeafReader>, sink: Arc<dyn LogSink>) -> Self {
        Self { reader, sink }
    }

    /// Reads every controller in order and merges the results.
    ///
    /// A file name produced by two controllers keeps the later value; the
    /// overwrite is logged.
    pub fn visit(&self, node_path: &Path, controllers: &[String]) -> NodeMetrics {
        let mut merged = NodeMetrics::new();

        for controller in controllers {
            let metrics = match self.reader.read(node_path, controller) {
                Ok(metrics) => metrics,
                Err(e) => {
                    self.sink.error(&e.to_string());
                    continue;
                }
            };

            for (file, content) in metrics {
                if merged.contains_key(&file) {
                    self.sink.warn(&format!(
                        "{}: \"{}\" from controller \"{}\" overwrites an earlier value",
                        node_path.display(),
                        file,
                        controller
                    ));
                }
                merged.insert(file, content);
            }
        }

        merged
    }

    /// Visits `node_path` and sends the merged metrics under `node` if any
    /// were read.
    ///
    /// Blocks while the channel is full.
    pub fn publish(
        &self,
        tx: &Sender<NodeReport>,
        node: &str,
        node_path: &Path,
        controllers: &[String],
    ) -> Publish {
        let metrics = self.visit(node_path, controllers);
        if metrics.is_empty() {
            return Publish::Empty;
        }

        let report = NodeReport {
            node: node.to_string(),
            metrics,
        };
        match tx.send(report) {
            Ok(()) => Publish::Sent,
            Err(_) => {
                self.sink.debug(&format!(
                    "aggregator closed, dropping metrics of \"{}\"",
                    node
                ));
                Publish::Closed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::MockFs;
    use crate::collector::cgroup::{CgroupReader, ControllerRegistry};
    use crate::util::MemorySink;
    use crossbeam_channel::bounded;
    use tracing::Level;

    fn visitor(fs: MockFs, registry: ControllerRegistry, sink: &Arc<MemorySink>) -> NodeVisitor {
        let reader = Arc::new(CgroupReader::new(fs, registry, sink.clone()));
        NodeVisitor::new(reader, sink.clone())
    }

    fn controllers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_visit_unsupported_controller_keeps_others() {
        let mut fs = MockFs::new();
        fs.add_node("/cg/a", &[("memory.current", "100\n")]);
        let sink = Arc::new(MemorySink::new());
        let v = visitor(fs, ControllerRegistry::default(), &sink);

        let metrics = v.visit(Path::new("/cg/a"), &controllers(&["cpu", "memory"]));

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics["memory.current"], "100");
        assert!(sink.contains(Level::ERROR, "Controller \"cpu\" is currently not supported."));
    }

    #[test]
    fn test_visit_is_repeatable() {
        let fs = MockFs::typical_hierarchy();
        let sink = Arc::new(MemorySink::new());
        let v = visitor(fs, ControllerRegistry::default(), &sink);
        let path = Path::new("/sys/fs/cgroup/system.slice/postgresql.service");

        let first = v.visit(path, &controllers(&["memory"]));
        let second = v.visit(path, &controllers(&["memory"]));

        assert_eq!(first, second);
        assert_eq!(first["memory.max"], "1073741824");
    }

    #[test]
    fn test_visit_overlapping_controllers_later_wins() {
        let mut fs = MockFs::new();
        fs.add_node("/cg/a", &[("memory.current", "100\n"), ("pids.current", "3\n")]);
        let mut registry = ControllerRegistry::empty();
        registry.register("memory", ["memory.current"]);
        registry.register("mem-alias", ["memory.current", "pids.current"]);
        let sink = Arc::new(MemorySink::new());
        let v = visitor(fs, registry, &sink);

        let metrics = v.visit(Path::new("/cg/a"), &controllers(&["memory", "mem-alias"]));

        assert_eq!(metrics.len(), 2);
        assert_eq!(sink.count(Level::WARN), 1);
        assert!(sink.contains(Level::WARN, "mem-alias"));
    }

    #[test]
    fn test_publish_sends_non_empty() {
        let mut fs = MockFs::new();
        fs.add_node("/cg/a", &[("memory.current", "100\n")]);
        let sink = Arc::new(MemorySink::new());
        let v = visitor(fs, ControllerRegistry::default(), &sink);
        let (tx, rx) = bounded(4);

        let outcome = v.publish(&tx, "a", Path::new("/cg/a"), &controllers(&["memory"]));

        assert_eq!(outcome, Publish::Sent);
        let report = rx.try_recv().unwrap();
        assert_eq!(report.node, "a");
        assert_eq!(report.metrics["memory.current"], "100");
    }

    #[test]
    fn test_publish_skips_empty() {
        let mut fs = MockFs::new();
        fs.add_dir("/cg/empty");
        let sink = Arc::new(MemorySink::new());
        let v = visitor(fs, ControllerRegistry::default(), &sink);
        let (tx, rx) = bounded(4);

        let outcome = v.publish(&tx, "empty", Path::new("/cg/empty"), &controllers(&["memory"]));

        assert_eq!(outcome, Publish::Empty);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_publish_after_aggregator_gone() {
        let mut fs = MockFs::new();
        fs.add_node("/cg/a", &[("memory.current", "1\n")]);
        let sink = Arc::new(MemorySink::new());
        let v = visitor(fs, ControllerRegistry::default(), &sink);
        let (tx, rx) = bounded(1);
        drop(rx);

        let outcome = v.publish(&tx, "a", Path::new("/cg/a"), &controllers(&["memory"]));

        assert_eq!(outcome, Publish::Closed);
        assert!(sink.contains(Level::DEBUG, "aggregator closed"));
    }
}
