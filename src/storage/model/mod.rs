mod snapshot;

pub use snapshot::{NodeMetrics, NodeReport, Snapshot};
