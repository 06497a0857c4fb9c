//! Configuration display endpoint handler.
//!
//! This module provides the `/config` endpoint handler that displays
//! the current exporter configuration.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use herakles_zfs_exporter::probe::probe_deadline_secs;
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::config::{Config, DEFAULT_BIND_ADDR, DEFAULT_PORT};
use crate::handlers::health::FOOTER_TEXT;
use crate::state::SharedState;

/// Renders the effective configuration as plain text.
pub fn render_config_text(cfg: &Config) -> String {
    let mut out = String::new();

    writeln!(out, "HERAKLES ZFS EXPORTER - CONFIGURATION").ok();
    writeln!(out, "=====================================").ok();
    writeln!(out).ok();

    writeln!(out, "SERVER CONFIGURATION").ok();
    writeln!(out, "--------------------").ok();
    writeln!(
        out,
        "bind:                       {}",
        cfg.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    )
    .ok();
    writeln!(
        out,
        "port:                       {}",
        cfg.port.unwrap_or(DEFAULT_PORT)
    )
    .ok();
    writeln!(
        out,
        "interval:                   {} seconds",
        cfg.interval_secs()
    )
    .ok();
    writeln!(
        out,
        "enable_health:              {}",
        cfg.enable_health.unwrap_or(true)
    )
    .ok();
    writeln!(out).ok();

    let arc = &cfg.zfs_arc;
    writeln!(out, "ZFS ARC COLLECTOR").ok();
    writeln!(out, "-----------------").ok();
    writeln!(out, "enabled:                    {}", arc.enabled).ok();
    writeln!(out, "path:                       {}", arc.path).ok();
    match &arc.command {
        Some(cmd) if !cmd.is_empty() => {
            writeln!(out, "command:                    {}", cmd.join(" ")).ok();
        }
        _ => {
            writeln!(
                out,
                "kstat_path:                 {}",
                arc.kstat_path.display()
            )
            .ok();
        }
    }
    writeln!(out, "capability_key:             {}", arc.capability_key).ok();
    writeln!(out).ok();

    let ioping = &cfg.ioping;
    writeln!(out, "IOPING COLLECTOR").ok();
    writeln!(out, "----------------").ok();
    writeln!(out, "enabled:                    {}", ioping.enabled).ok();
    writeln!(out, "path:                       {}", ioping.path).ok();
    writeln!(
        out,
        "directory:                  {}",
        ioping.directory.display()
    )
    .ok();
    writeln!(out, "binary:                     {}", ioping.binary).ok();
    writeln!(
        out,
        "deadline:                   {} seconds",
        probe_deadline_secs(cfg.interval_secs())
    )
    .ok();
    writeln!(
        out,
        "grace_seconds:              {}",
        ioping.grace_seconds
    )
    .ok();
    writeln!(out).ok();

    writeln!(out, "LOGGING").ok();
    writeln!(out, "-------").ok();
    writeln!(
        out,
        "log_level:                  {}",
        cfg.log_level.as_deref().unwrap_or("info")
    )
    .ok();
    writeln!(out).ok();
    writeln!(out, "{FOOTER_TEXT}").ok();

    out
}

/// Handler for the /config endpoint.
#[instrument(skip(state))]
pub async fn config_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /config request");

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        render_config_text(&state.config),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_shows_collector_sections() {
        let text = render_config_text(&Config::default());
        assert!(text.contains("ZFS ARC COLLECTOR"));
        assert!(text.contains("/proc/spl/kstat/zfs/arcstats"));
        assert!(text.contains("deadline:                   10 seconds"));
    }

    #[test]
    fn test_render_prefers_command_source() {
        let mut cfg = Config::default();
        cfg.zfs_arc.command = Some(vec!["kstat".into(), "-p".into()]);
        let text = render_config_text(&cfg);
        assert!(text.contains("command:                    kstat -p"));
        assert!(!text.contains("kstat_path:"));
    }
}
