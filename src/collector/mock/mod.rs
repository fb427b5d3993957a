//! Mock filesystem implementations for testing.
//!
//! This module provides `MockFs` and pre-built cgroup hierarchies for testing
//! collectors without requiring a real cgroup v2 mount.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
