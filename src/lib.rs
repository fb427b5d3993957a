//! cgar - cgroup hierarchy snapshot collector library.
//!
//! Provides:
//! - `collector` - concurrent tree walker, aggregator and run coordinator
//! - `config` - JSON configuration and scan requests
//! - `storage` - snapshot model and append-only JSON line output
//! - `util` - injectable log sink
//!
//! The `cgar-collect` binary wires these together for a single
//! collect-and-emit pass.

pub mod collector;
pub mod config;
pub mod storage;
pub mod util;
