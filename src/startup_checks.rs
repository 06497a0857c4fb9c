//! Startup requirement validation for herakles-zfs-exporter.
//!
//! Checks that the enabled collectors' sources are usable before the poll
//! loop starts. A missing arcstats file only warns, since the ZFS module may
//! be loaded after the exporter.

use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Cannot read ARC statistics at {path}: {reason}")]
    KstatUnreadable { path: String, reason: String },

    #[error("Probe binary '{0}' not found in PATH")]
    ProbeBinaryMissing(String),

    #[error("Probe directory {0} does not exist")]
    ProbeDirectoryMissing(String),
}

/// Validate all runtime requirements of the enabled collectors
pub fn validate_requirements(config: &Config) -> Result<(), ValidationError> {
    info!("Validating runtime requirements...");

    let arc = &config.zfs_arc;
    if arc.enabled {
        match &arc.command {
            Some(cmd) if !cmd.is_empty() => check_binary(&cmd[0])?,
            _ => check_kstat_access(&arc.kstat_path)?,
        }
    }

    if config.ioping.enabled {
        check_binary(&config.ioping.binary)?;
        check_probe_directory(&config.ioping.directory)?;
    }

    info!("All runtime requirements validated");
    Ok(())
}

fn check_kstat_access(path: &Path) -> Result<(), ValidationError> {
    match fs::read_to_string(path) {
        Ok(content) => {
            info!(
                "ARC statistics readable: {} ({} lines)",
                path.display(),
                content.lines().count()
            );
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("{} not found - is the zfs module loaded?", path.display());
            warn!("   ARC metrics will be absent until it appears");
            Ok(())
        }
        Err(e) => {
            error!("Cannot read {}: {}", path.display(), e);
            Err(ValidationError::KstatUnreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    }
}

fn check_binary(program: &str) -> Result<(), ValidationError> {
    match which::which(program) {
        Ok(resolved) => {
            info!("Found {} at {}", program, resolved.display());
            Ok(())
        }
        Err(_) => {
            error!("'{}' not found in PATH", program);
            Err(ValidationError::ProbeBinaryMissing(program.to_string()))
        }
    }
}

fn check_probe_directory(dir: &Path) -> Result<(), ValidationError> {
    if dir.is_dir() {
        Ok(())
    } else {
        error!("Probe directory {} does not exist", dir.display());
        Err(ValidationError::ProbeDirectoryMissing(
            dir.display().to_string(),
        ))
    }
}
