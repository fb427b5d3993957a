//! JSON configuration for a collection run.
//!
//! ```json
//! {
//!   "logfile": "/var/log/cgar/cgar.log",
//!   "cgroup_root": "/sys/fs/cgroup",
//!   "channel_capacity": 100,
//!   "timeout_secs": 30,
//!   "extra_controllers": { "pids": ["pids.current", "pids.max"] },
//!   "collect": [
//!     { "cgroup": "system.slice", "depth": 1, "controllers": ["memory"] }
//!   ]
//! }
//! ```
//!
//! Only `logfile` and `collect` are required. The capitalized keys of older
//! configuration files (`Logfile`, `Collect`, ...) are accepted as well.
//!
//! `depth` is unsigned. A negative depth, which older files used to mean
//! "do not descend", is rejected as a parse error; write `0` instead.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::collector::{ControllerRegistry, ScanRequest};

/// Configuration file used when none is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/cgar/conf.json";

const DEFAULT_CGROUP_ROOT: &str = "/sys/fs/cgroup";
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Error loading the configuration. Always fatal for the run.
#[derive(Debug)]
pub enum ConfigError {
    Open { path: PathBuf, source: io::Error },
    Read { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Open { path, source } => {
                write!(f, "Error opening \"{}\": {}", path.display(), source)
            }
            ConfigError::Read { path, source } => {
                write!(f, "Error reading \"{}\": {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Error parsing \"{}\": {}", path.display(), source)
            }
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Open { source, .. } | ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}

fn default_cgroup_root() -> PathBuf {
    PathBuf::from(DEFAULT_CGROUP_ROOT)
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

/// Settings for one collection run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Output log that receives one JSON line per run.
    #[serde(alias = "Logfile")]
    pub logfile: PathBuf,

    /// Roots to walk.
    #[serde(alias = "Collect")]
    pub collect: Vec<ScanRequest>,

    /// Mount point of the cgroup hierarchy.
    #[serde(alias = "CgroupRoot", default = "default_cgroup_root")]
    pub cgroup_root: PathBuf,

    /// Capacity of the channel between walkers and the aggregator.
    #[serde(alias = "ChannelCapacity", default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Upper bound for the whole run, in seconds. No bound when absent.
    #[serde(alias = "TimeoutSecs", default)]
    pub timeout_secs: Option<u64>,

    /// Additional controllers, or replacement file lists for built-in ones.
    #[serde(alias = "ExtraControllers", default)]
    pub extra_controllers: BTreeMap<String, Vec<String>>,
}

impl Config {
    /// Loads and validates the configuration at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::InvalidData {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            } else {
                ConfigError::Open {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let config: Config =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validated()
    }

    /// Normalizes scan requests and rejects unusable values.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "channel_capacity must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.logfile.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("logfile must not be empty".to_string()));
        }

        self.collect = self
            .collect
            .into_iter()
            .map(ScanRequest::normalized)
            .collect();
        Ok(self)
    }

    /// Built-in controllers merged with `extra_controllers`.
    pub fn registry(&self) -> ControllerRegistry {
        let mut registry = ControllerRegistry::default();
        for (name, files) in &self.extra_controllers {
            registry.register(name.clone(), files.iter().cloned());
        }
        registry
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
