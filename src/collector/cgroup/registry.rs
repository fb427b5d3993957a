//! Controller → metric file list mapping.
//!
//! This is the extension point for new controllers: a controller is
//! supported exactly when it has an entry here.

use std::collections::BTreeMap;

/// Files read for the `memory` controller.
pub const MEMORY_FILES: &[&str] = &[
    "memory.current",
    "memory.high",
    "memory.min",
    "memory.pressure",
    "memory.low",
    "memory.stat",
    "memory.swap.high",
    "memory.max",
    "memory.swap.current",
    "memory.swap.max",
];

/// Known controllers and the files read for each of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerRegistry {
    controllers: BTreeMap<String, Vec<String>>,
}

impl ControllerRegistry {
    /// Creates a registry with no controllers.
    pub fn empty() -> Self {
        Self {
            controllers: BTreeMap::new(),
        }
    }

    /// Registers `name`, replacing any previous file list for it.
    pub fn register<I, S>(&mut self, name: impl Into<String>, files: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.controllers
            .insert(name.into(), files.into_iter().map(Into::into).collect());
    }

    /// Returns the file list of `name`, or `None` if it is unsupported.
    pub fn files(&self, name: &str) -> Option<&[String]> {
        self.controllers.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.controllers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.controllers.keys().map(String::as_str)
    }
}

impl Default for ControllerRegistry {
    /// Built-in controllers.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("memory", MEMORY_FILES.iter().copied());
        registry
    }
}
