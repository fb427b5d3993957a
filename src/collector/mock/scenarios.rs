//! Pre-built mock cgroup hierarchies for testing.
//!
//! These scenarios provide realistic cgroup v2 trees mounted at
//! `/sys/fs/cgroup` for testing the walker end to end.

use super::filesystem::MockFs;

/// Mount point used by all scenarios.
pub const SCENARIO_ROOT: &str = "/sys/fs/cgroup";

impl MockFs {
    /// Creates a typical systemd host hierarchy.
    ///
    /// ```text
    /// /sys/fs/cgroup                 (root: memory.stat, memory.pressure)
    /// ├── init.scope
    /// ├── system.slice
    /// │   ├── sshd.service
    /// │   └── postgresql.service
    /// └── user.slice
    ///     └── user-1000.slice
    ///         └── session-2.scope
    /// ```
    pub fn typical_hierarchy() -> Self {
        let mut fs = Self::new();

        fs.add_node(
            SCENARIO_ROOT,
            &[
                (
                    "memory.stat",
                    "anon 104857600\nfile 209715200\nkernel 52428800\n",
                ),
                (
                    "memory.pressure",
                    "some avg10=0.00 avg60=0.00 avg300=0.00 total=0\nfull avg10=0.00 avg60=0.00 avg300=0.00 total=0\n",
                ),
                ("cgroup.controllers", "cpuset cpu io memory pids\n"),
            ],
        );
        fs.add_node(
            format!("{SCENARIO_ROOT}/init.scope"),
            &[("memory.current", "8388608\n"), ("memory.max", "max\n")],
        );
        fs.add_node(
            format!("{SCENARIO_ROOT}/system.slice"),
            &[
                ("memory.current", "536870912\n"),
                ("memory.max", "max\n"),
                ("memory.high", "max\n"),
                ("memory.low", "0\n"),
                ("memory.min", "0\n"),
            ],
        );
        fs.add_node(
            format!("{SCENARIO_ROOT}/system.slice/sshd.service"),
            &[("memory.current", "4194304\n"), ("memory.max", "max\n")],
        );
        fs.add_node(
            format!("{SCENARIO_ROOT}/system.slice/postgresql.service"),
            &[
                ("memory.current", "268435456\n"),
                ("memory.max", "1073741824\n"),
                ("memory.swap.current", "0\n"),
                ("memory.swap.max", "max\n"),
                ("pids.current", "17\n"),
                ("pids.max", "512\n"),
            ],
        );
        fs.add_node(
            format!("{SCENARIO_ROOT}/user.slice"),
            &[("memory.current", "134217728\n")],
        );
        fs.add_node(
            format!("{SCENARIO_ROOT}/user.slice/user-1000.slice"),
            &[("memory.current", "67108864\n")],
        );
        fs.add_node(
            format!("{SCENARIO_ROOT}/user.slice/user-1000.slice/session-2.scope"),
            &[("memory.current", "33554432\n")],
        );

        fs
    }

    /// Creates a hierarchy where `system.slice` cannot be listed.
    ///
    /// Its own files remain readable, so it still contributes metrics
    /// while its services are unreachable.
    pub fn with_unlistable_slice() -> Self {
        let mut fs = Self::typical_hierarchy();
        fs.deny(format!("{SCENARIO_ROOT}/system.slice"));
        fs
    }

    /// Creates a hierarchy of empty directories with no controller files.
    pub fn empty_hierarchy() -> Self {
        let mut fs = Self::new();
        fs.add_dir(format!("{SCENARIO_ROOT}/a/b"));
        fs.add_dir(format!("{SCENARIO_ROOT}/c"));
        fs
    }
}
