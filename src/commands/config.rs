//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Default output file, named after the chosen format so it loads back.
fn default_output(format: &ConfigFormat) -> PathBuf {
    let ext = match format {
        ConfigFormat::Yaml => "yaml",
        ConfigFormat::Json => "json",
        ConfigFormat::Toml => "toml",
    };
    PathBuf::from(format!("herakles-zfs-exporter.{ext}"))
}

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output.unwrap_or_else(|| default_output(&format));

    let mut content = render_config(&Config::default(), &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Herakles ZFS Exporter Configuration
# ===================================
#
# Server Configuration
# --------------------
# bind: "0.0.0.0"              # Bind IP (0.0.0.0 = all interfaces)
# port: 9216                   # HTTP port
# interval: 30                 # Poll interval in seconds
# enable_health: true          # Enable /health endpoint
# log_level: "info"            # off, error, warn, info, debug, trace
#
# ZFS ARC Collector
# -----------------
# zfs_arc:
#   enabled: true
#   path: "zfs"                # Metric prefix (zfs.arc.hits, ...)
#   kstat_path: "/proc/spl/kstat/zfs/arcstats"
#   command: null              # e.g. ["cat", "/proc/spl/kstat/zfs/arcstats"]
#   capability_key: "l2_size"  # Non-zero on first read enables L2ARC metrics
#
# ioping Collector
# ----------------
# ioping:
#   enabled: true
#   path: "ioping"             # Metric prefix (ioping.avg, ...)
#   directory: "/tmp"          # Directory to probe
#   binary: "ioping"           # Executable name or path
#   grace_seconds: 1           # Watchdog slack beyond the probe deadline
#                              # (deadline = max(1, interval / 3))
"#;

    format!("{comments}\n{yaml}")
}
