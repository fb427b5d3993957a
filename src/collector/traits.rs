//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait allows the collector to work with both the real
//! cgroup filesystem on Linux and mock implementations for testing on macOS
//! or in CI.

use std::io;
use std::path::{Path, PathBuf};

/// Abstraction for filesystem operations.
///
/// This trait allows collectors to read from the real filesystem or from
/// a mock implementation for testing purposes.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    ///
    /// Invalid UTF-8 is replaced with U+FFFD rather than failing the read.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Lists entries in a directory.
    ///
    /// # Returns
    /// A vector of paths to entries in the directory, or an I/O error.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Returns `true` if the path is a directory. Symlinks are not followed.
    fn is_dir(&self, path: &Path) -> bool;
}

/// Real filesystem implementation that delegates to `std::fs`.
///
/// Use this in production to read from the actual `/sys/fs/cgroup` tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }

    fn is_dir(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path)
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_fs_read_to_string() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("memory.current");
        std::fs::write(&file, "4096\n").unwrap();

        let fs = RealFs::new();
        assert_eq!(fs.read_to_string(&file).unwrap(), "4096\n");
    }

    #[test]
    fn test_real_fs_read_dir_and_is_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("child")).unwrap();
        std::fs::write(dir.path().join("memory.max"), "max\n").unwrap();

        let fs = RealFs::new();
        let mut entries = fs.read_dir(dir.path()).unwrap();
        entries.sort();
        assert_eq!(entries.len(), 2);
        assert!(fs.is_dir(&dir.path().join("child")));
        assert!(!fs.is_dir(&dir.path().join("memory.max")));
    }

    #[test]
    fn test_real_fs_read_invalid_utf8_is_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("memory.stat");
        std::fs::write(&file, b"anon 1\xff\n").unwrap();

        let fs = RealFs::new();
        assert_eq!(fs.read_to_string(&file).unwrap(), "anon 1\u{FFFD}\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_real_fs_is_dir_does_not_follow_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("child")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("child"), dir.path().join("link")).unwrap();

        let fs = RealFs::new();
        assert!(fs.is_dir(&dir.path().join("child")));
        assert!(!fs.is_dir(&dir.path().join("link")));
        assert!(!fs.is_dir(&dir.path().join("missing")));
    }

    #[test]
    fn test_real_fs_read_dir_missing() {
        let fs = RealFs::new();
        let result = fs.read_dir(Path::new("/nonexistent/cgroup/path/12345"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
