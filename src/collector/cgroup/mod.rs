//! Cgroup v2 leaf reading.
//!
//! This module maps controller names to the files read under each node and
//! provides the `LeafReader` used by the tree walker.

mod reader;
mod registry;

pub use reader::{CgroupReader, LeafReader, normalize};
pub use registry::{ControllerRegistry, MEMORY_FILES};
