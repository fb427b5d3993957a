//! Single consumer that folds node reports into one snapshot.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use chrono::Local;
use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::collector::error::CollectError;
use crate::storage::model::{NodeReport, Snapshot};
use crate::util::LogSink;

/// Name given to the aggregator thread.
pub const AGGREGATOR_THREAD_NAME: &str = "cgar-aggregate";

/// Drains `rx` into a snapshot.
///
/// The timestamp is taken before the first receive. Returns once every
/// sender is dropped and the buffer is empty, or when `deadline` passes,
/// in which case whatever arrived so far is returned.
pub fn aggregate(
    rx: &Receiver<NodeReport>,
    deadline: Option<Instant>,
    sink: &dyn LogSink,
) -> Snapshot {
    let mut snapshot = Snapshot::new(Local::now());

    match deadline {
        None => {
            for report in rx.iter() {
                snapshot.insert(report);
            }
        }
        Some(deadline) => loop {
            match rx.recv_deadline(deadline) {
                Ok(report) => snapshot.insert(report),
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    sink.warn(&format!(
                        "collection deadline reached, emitting partial snapshot with {} nodes",
                        snapshot.len()
                    ));
                    break;
                }
            }
        },
    }

    sink.debug(&format!("aggregated {} nodes", snapshot.len()));
    snapshot
}

/// Handle to the running aggregator thread.
pub struct Aggregator {
    handle: JoinHandle<Snapshot>,
}

impl Aggregator {
    /// Starts the aggregator on its own thread.
    ///
    /// Must be started before any walker publishes.
    pub fn spawn(
        rx: Receiver<NodeReport>,
        deadline: Option<Instant>,
        sink: Arc<dyn LogSink>,
    ) -> Result<Self, CollectError> {
        let handle = thread::Builder::new()
            .name(AGGREGATOR_THREAD_NAME.to_string())
            .spawn(move || aggregate(&rx, deadline, sink.as_ref()))
            .map_err(CollectError::Spawn)?;
        Ok(Self { handle })
    }

    /// Waits for the snapshot. Only meaningful once the channel is closed.
    pub fn join(self) -> Result<Snapshot, CollectError> {
        self.handle.join().map_err(|_| CollectError::AggregatorLost)
    }
}
