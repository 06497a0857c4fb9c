//! Configuration management for herakles-zfs-exporter.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use herakles_zfs_exporter::probe::probe_deadline_secs;
use herakles_zfs_exporter::{ArcCollectorConfig, IopingCollectorConfig};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::{Args, ConfigFormat, LogLevel};

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9216;
pub const DEFAULT_INTERVAL: u64 = 30;

/// Exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,

    /// Poll interval in seconds; also bounds the ioping deadline.
    pub interval: Option<u64>,

    // Feature flags
    #[serde(alias = "enable-health")]
    pub enable_health: Option<bool>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,

    // Collectors
    #[serde(default, alias = "zfs-arc")]
    pub zfs_arc: ArcCollectorConfig,
    #[serde(default)]
    pub ioping: IopingCollectorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_PORT),
            interval: Some(DEFAULT_INTERVAL),
            enable_health: Some(true),
            log_level: Some("info".into()),
            zfs_arc: ArcCollectorConfig::default(),
            ioping: IopingCollectorConfig::default(),
        }
    }
}

impl Config {
    pub fn interval_secs(&self) -> u64 {
        self.interval.unwrap_or(DEFAULT_INTERVAL)
    }

    /// Effective log level; unset means info.
    pub fn log_level(&self) -> Result<LogLevel, String> {
        match self.log_level.as_deref() {
            None => Ok(LogLevel::Info),
            Some(s) => LogLevel::from_str(s.trim(), true)
                .map_err(|_| format!("unknown log_level '{}'", s)),
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    cfg.log_level()?;

    let interval = cfg.interval_secs();
    if interval == 0 {
        return Err("interval must be at least 1 second".into());
    }

    if !(cfg.zfs_arc.enabled || cfg.ioping.enabled) {
        return Err("At least one of zfs_arc/ioping must be enabled".into());
    }

    if cfg.zfs_arc.enabled {
        if cfg.zfs_arc.path.trim().is_empty() {
            return Err("zfs_arc.path (metric namespace) must not be empty".into());
        }
        if cfg.zfs_arc.capability_key.trim().is_empty() {
            return Err("zfs_arc.capability_key must not be empty".into());
        }
        if cfg.zfs_arc.command.as_ref().is_some_and(|c| c.is_empty()) {
            return Err("zfs_arc.command is set but empty".into());
        }
    }

    if cfg.ioping.enabled {
        if cfg.ioping.path.trim().is_empty() {
            return Err("ioping.path (metric namespace) must not be empty".into());
        }
        if cfg.ioping.binary.trim().is_empty() {
            return Err("ioping.binary must not be empty".into());
        }

        // The probe must finish inside its own poll window.
        let watchdog = probe_deadline_secs(interval) + cfg.ioping.grace_seconds;
        if watchdog >= interval {
            return Err(format!(
                "ioping watchdog ({}s = deadline {}s + grace {}s) must be shorter than interval ({}s)",
                watchdog,
                probe_deadline_secs(interval),
                cfg.ioping.grace_seconds,
                interval
            )
            .into());
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    // Override with CLI args
    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }

    // Only override port if the user supplied it on the CLI.
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }

    if let Some(interval) = args.interval {
        config.interval = Some(interval);
    }

    if let Some(level) = args.log_level {
        if let Some(value) = level.to_possible_value() {
            config.log_level = Some(value.get_name().to_string());
        }
    }

    // Feature flags
    if args.disable_health {
        config.enable_health = Some(false);
    }
    if args.disable_arc {
        config.zfs_arc.enabled = false;
    }
    if args.disable_ioping {
        config.ioping.enabled = false;
    }

    if let Some(path) = &args.kstat_path {
        config.zfs_arc.kstat_path = path.clone();
    }
    if let Some(dir) = &args.ioping_directory {
        config.ioping.directory = dir.clone();
    }

    Ok(config)
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = if let Some(p) = path {
        PathBuf::from(p)
    } else {
        // Try default locations
        let defaults = [
            "/etc/herakles/zfs-exporter.yaml",
            "/etc/herakles/zfs-exporter.yml",
            "/etc/herakles/zfs-exporter.json",
            "./herakles-zfs-exporter.yaml",
            "./herakles-zfs-exporter.yml",
            "./herakles-zfs-exporter.json",
        ];

        defaults
            .iter()
            .find(|p| Path::new(p).exists())
            .map(PathBuf::from)
            .unwrap_or_default()
    };

    if path.as_os_str().is_empty() || !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)?;
    let config = parse_config(&content, path.extension().and_then(|s| s.to_str()))?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Parses configuration text; the extension selects the format (YAML by default).
pub fn parse_config(
    content: &str,
    extension: Option<&str>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match extension {
        Some("json") => serde_json::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        _ => serde_yaml::from_str(content)?,
    };
    Ok(config)
}

/// Renders configuration in the requested format
pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, &format)?);
    Ok(())
}
