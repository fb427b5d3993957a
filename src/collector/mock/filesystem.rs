//! In-memory mock filesystem for testing collectors without a real cgroup tree.
//!
//! This module provides `MockFs` which simulates a filesystem in memory,
//! allowing tests to run on macOS and in CI environments without Linux.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Stores files and directories in memory, allowing tests to simulate
/// various cgroup hierarchies, including directories that cannot be listed.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
    /// Paths that fail with `PermissionDenied`.
    denied: HashSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Adds a cgroup node directory together with its controller files.
    ///
    /// # Arguments
    /// * `path` - Directory of the node (e.g., "/sys/fs/cgroup/system.slice")
    /// * `files` - `(file name, content)` pairs placed inside the directory
    pub fn add_node(&mut self, path: impl AsRef<Path>, files: &[(&str, &str)]) {
        let base = path.as_ref().to_path_buf();
        self.add_dir(&base);
        for (name, content) in files {
            self.add_file(base.join(name), *content);
        }
    }

    /// Makes every read of `path` fail with `PermissionDenied`.
    ///
    /// Applies to both `read_dir` and `read_to_string`; the path keeps its
    /// place in the parent's listing.
    pub fn deny(&mut self, path: impl AsRef<Path>) {
        self.denied.insert(path.as_ref().to_path_buf());
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    fn check_denied(&self, path: &Path) -> io::Result<()> {
        if self.denied.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {:?}", path),
            ));
        }
        Ok(())
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.check_denied(path)?;
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        self.check_denied(path)?;
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries = HashSet::new();

        // Direct children only
        for file_path in self.files.keys() {
            if file_path.parent().is_some_and(|parent| parent == path) {
                entries.insert(file_path.clone());
            }
        }

        for dir_path in &self.directories {
            if dir_path.parent().is_some_and(|parent| parent == path) && dir_path != path {
                entries.insert(dir_path.clone());
            }
        }

        Ok(entries.into_iter().collect())
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.directories.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_add_file() {
        let mut fs = MockFs::new();
        fs.add_file("/sys/fs/cgroup/memory.current", "4096\n");

        assert!(fs.is_dir(Path::new("/sys/fs/cgroup")));
        assert!(fs.is_dir(Path::new("/sys")));

        let content = fs
            .read_to_string(Path::new("/sys/fs/cgroup/memory.current"))
            .unwrap();
        assert_eq!(content, "4096\n");
    }

    #[test]
    fn test_mock_fs_read_dir() {
        let mut fs = MockFs::new();
        fs.add_file("/cg/a/memory.current", "1");
        fs.add_file("/cg/a/memory.max", "max");
        fs.add_file("/cg/b/memory.current", "2");
        fs.add_dir("/cg/c");

        let root_entries = fs.read_dir(Path::new("/cg")).unwrap();
        assert_eq!(root_entries.len(), 3);

        let a_entries = fs.read_dir(Path::new("/cg/a")).unwrap();
        assert_eq!(a_entries.len(), 2);

        assert!(fs.read_dir(Path::new("/cg/c")).unwrap().is_empty());
    }

    #[test]
    fn test_mock_fs_add_node() {
        let mut fs = MockFs::new();
        fs.add_node(
            "/cg/user.slice",
            &[("memory.current", "10\n"), ("memory.max", "max\n")],
        );

        assert!(fs.is_dir(Path::new("/cg/user.slice")));
        assert_eq!(
            fs.read_to_string(Path::new("/cg/user.slice/memory.max"))
                .unwrap(),
            "max\n"
        );
    }

    #[test]
    fn test_mock_fs_deny() {
        let mut fs = MockFs::new();
        fs.add_node("/cg/locked", &[("memory.current", "1\n")]);
        fs.add_dir("/cg/locked/child");
        fs.deny("/cg/locked");

        let err = fs.read_dir(Path::new("/cg/locked")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);

        // Still listed by its parent, and its files stay readable
        assert_eq!(fs.read_dir(Path::new("/cg")).unwrap().len(), 1);
        assert!(
            fs.read_to_string(Path::new("/cg/locked/memory.current"))
                .is_ok()
        );
    }

    #[test]
    fn test_mock_fs_not_found() {
        let fs = MockFs::new();
        let result = fs.read_to_string(Path::new("/nonexistent"));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
