//! CLI command implementations for herakles-zfs-exporter.
//!
//! - `check`: verify collector sources and configuration
//! - `config`: configuration file generation
//! - `once`: poll the collectors and print what they publish

pub mod check;
pub mod config;
pub mod once;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use once::command_once;
