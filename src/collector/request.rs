//! Scan requests: which subtree to walk, how deep, which controllers.

use serde::Deserialize;

/// One configured root of the walk.
///
/// Accepts both the lowercase keys and the capitalized keys written by
/// older configuration files (`Cgroup`, `Depth`, `Controllers`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScanRequest {
    /// Node identifier relative to the hierarchy mount point.
    /// Empty means the mount point itself.
    #[serde(alias = "Cgroup", alias = "root", default)]
    pub cgroup: String,

    /// Number of levels below `cgroup` to descend. 0 samples only `cgroup`.
    #[serde(alias = "Depth", default)]
    pub depth: u32,

    /// Controllers read at every visited node, in merge order.
    #[serde(alias = "Controllers")]
    pub controllers: Vec<String>,
}

impl ScanRequest {
    pub fn new<I, S>(cgroup: impl Into<String>, depth: u32, controllers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cgroup: cgroup.into(),
            depth,
            controllers: controllers.into_iter().map(Into::into).collect(),
        }
        .normalized()
    }

    /// Strips leading and trailing slashes so the identifier can be joined
    /// onto the mount point.
    pub fn normalized(mut self) -> Self {
        self.cgroup = self.cgroup.trim_matches('/').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_slashes() {
        let req = ScanRequest::new("/system.slice/", 1, ["memory"]);
        assert_eq!(req.cgroup, "system.slice");
        assert_eq!(req.controllers, vec!["memory".to_string()]);
    }

    #[test]
    fn test_deserialize_capitalized_keys() {
        let req: ScanRequest = serde_json::from_str(
            r#"{"Cgroup": "user.slice", "Depth": 2, "Controllers": ["memory"]}"#,
        )
        .unwrap();
        assert_eq!(req, ScanRequest::new("user.slice", 2, ["memory"]));
    }

    #[test]
    fn test_deserialize_defaults_to_mount_point() {
        let req: ScanRequest = serde_json::from_str(r#"{"controllers": []}"#).unwrap();
        assert_eq!(req.cgroup, "");
        assert_eq!(req.depth, 0);
    }
}
