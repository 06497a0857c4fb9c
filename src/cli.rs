//! CLI arguments and subcommands for herakles-zfs-exporter.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "herakles-zfs-exporter",
    about = "Prometheus exporter for ZFS ARC statistics and ioping latency",
    long_about = "Prometheus exporter for ZFS ARC statistics and ioping latency.\n\n\
                  Polls /proc/spl/kstat/zfs/arcstats and an ioping probe on a fixed \
                  interval, derives per-second hit/miss rates and percentages, and \
                  serves the latest values on /metrics.",
    author = "Michael Moll <exporter@herakles.now> - Herakles",
    version = "0.1.0",
    propagate_version = true,
    after_help = "Project: https://github.com/cansp-dev/herakles-zfs-exporter | More info: https://www.herakles.now | Support: exporter@herakles.now"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Log level (overrides `log_level` from the config file; default info)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Poll interval in seconds
    #[arg(short = 'i', long)]
    pub interval: Option<u64>,

    /// Disable /health endpoint
    #[arg(long)]
    pub disable_health: bool,

    /// Disable the ZFS ARC collector
    #[arg(long)]
    pub disable_arc: bool,

    /// Disable the ioping collector
    #[arg(long)]
    pub disable_ioping: bool,

    /// Override the arcstats kstat file
    #[arg(long)]
    pub kstat_path: Option<PathBuf>,

    /// Override the directory probed by ioping
    #[arg(long)]
    pub ioping_directory: Option<PathBuf>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify counter sources and probe binary are usable
    Check,

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Poll every collector and print the published metrics
    Once {
        /// Number of polls (the second and later show real rates)
        #[arg(short = 'n', long, default_value_t = 2)]
        iterations: usize,

        /// Pause between polls in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
    },
}
