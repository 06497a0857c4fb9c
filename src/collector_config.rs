//! Configuration types for the collectors.
//!
//! These are embedded in the exporter's configuration file under the
//! `zfs_arc` and `ioping` keys. Every field has a default so an empty
//! section (or no section at all) gives a working collector.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_ARCSTATS_PATH: &str = "/proc/spl/kstat/zfs/arcstats";
pub const DEFAULT_CAPABILITY_KEY: &str = "l2_size";

/// ZFS ARC collector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcCollectorConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metric namespace prefix (e.g. `zfs` → `zfs.arc.hits`).
    #[serde(default = "default_arc_path")]
    pub path: String,

    /// kstat pseudo-file with the ARC counters.
    #[serde(default = "default_kstat_path", alias = "kstat-path")]
    pub kstat_path: PathBuf,

    /// Read counters from this command's output instead of `kstat_path`.
    #[serde(default)]
    pub command: Option<Vec<String>>,

    /// Counter whose non-zero presence on the first read enables L2ARC metrics.
    #[serde(default = "default_capability_key", alias = "capability-key")]
    pub capability_key: String,
}

/// ioping latency collector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IopingCollectorConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metric namespace prefix (e.g. `ioping` → `ioping.avg`).
    #[serde(default = "default_ioping_path")]
    pub path: String,

    /// Directory the probe issues requests against.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// ioping executable name or path.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Extra seconds the watchdog allows beyond the probe deadline.
    #[serde(default = "default_grace_seconds", alias = "grace-seconds")]
    pub grace_seconds: u64,
}

fn default_true() -> bool {
    true
}
fn default_arc_path() -> String {
    "zfs".to_string()
}
fn default_kstat_path() -> PathBuf {
    PathBuf::from(DEFAULT_ARCSTATS_PATH)
}
fn default_capability_key() -> String {
    DEFAULT_CAPABILITY_KEY.to_string()
}
fn default_ioping_path() -> String {
    "ioping".to_string()
}
fn default_directory() -> PathBuf {
    PathBuf::from("/tmp")
}
fn default_binary() -> String {
    "ioping".to_string()
}
fn default_grace_seconds() -> u64 {
    1
}

impl Default for ArcCollectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_arc_path(),
            kstat_path: default_kstat_path(),
            command: None,
            capability_key: default_capability_key(),
        }
    }
}

impl Default for IopingCollectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_ioping_path(),
            directory: default_directory(),
            binary: default_binary(),
            grace_seconds: default_grace_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_config_default() {
        let config = ArcCollectorConfig::default();
        assert!(config.enabled);
        assert_eq!(config.path, "zfs");
        assert_eq!(config.kstat_path, PathBuf::from(DEFAULT_ARCSTATS_PATH));
        assert!(config.command.is_none());
        assert_eq!(config.capability_key, "l2_size");
    }

    #[test]
    fn test_ioping_config_default() {
        let config = IopingCollectorConfig::default();
        assert_eq!(config.path, "ioping");
        assert_eq!(config.directory, PathBuf::from("/tmp"));
        assert_eq!(config.grace_seconds, 1);
    }

    #[test]
    fn test_partial_section_fills_defaults() {
        let config: IopingCollectorConfig =
            serde_yaml::from_str("directory: /tank/probe\n").expect("valid yaml");
        assert!(config.enabled);
        assert_eq!(config.directory, PathBuf::from("/tank/probe"));
        assert_eq!(config.binary, "ioping");
    }
}
