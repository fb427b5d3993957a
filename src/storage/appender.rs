//! Append-only JSON line output.
//!
//! Each run appends exactly one line to the log file. The file is created
//! on first use and never truncated.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::storage::model::Snapshot;

/// Error writing a snapshot to the output log.
#[derive(Debug)]
pub enum OutputError {
    /// Snapshot could not be encoded as JSON.
    Serialize(serde_json::Error),
    /// Output file could not be opened for appending.
    Open { path: PathBuf, source: io::Error },
    /// Line could not be written.
    Write { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Serialize(e) => write!(f, "failed to serialize snapshot: {}", e),
            OutputError::Open { path, source } => {
                write!(f, "failed to open {}: {}", path.display(), source)
            }
            OutputError::Write { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Serialize(e) => Some(e),
            OutputError::Open { source, .. } | OutputError::Write { source, .. } => Some(source),
        }
    }
}

impl From<serde_json::Error> for OutputError {
    fn from(e: serde_json::Error) -> Self {
        OutputError::Serialize(e)
    }
}

/// Encodes a snapshot as one newline-terminated JSON line.
pub fn render_line(snapshot: &Snapshot) -> Result<String, OutputError> {
    let mut line = serde_json::to_string(snapshot)?;
    line.push('\n');
    Ok(line)
}

/// Appends snapshots to a log file, one JSON object per line.
#[derive(Debug, Clone)]
pub struct SnapshotAppender {
    path: PathBuf,
}

impl SnapshotAppender {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `snapshot` and returns the number of bytes written.
    pub fn append(&self, snapshot: &Snapshot) -> Result<usize, OutputError> {
        let line = render_line(snapshot)?;

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }

        let mut file = options.open(&self.path).map_err(|source| OutputError::Open {
            path: self.path.clone(),
            source,
        })?;

        file.write_all(line.as_bytes())
            .map_err(|source| OutputError::Write {
                path: self.path.clone(),
                source,
            })?;

        Ok(line.len())
    }
}
