//! Utility modules for cgar.

mod sink;

pub use sink::{LogRecord, LogSink, MemorySink, TracingSink};
