//! Health check endpoint handler.
//!
//! Returns per-collector poll statistics as a plain-text table. The status is
//! 503 until every enabled collector has completed one successful poll.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::{debug, instrument};

use crate::state::SharedState;

// Time conversion constants
const SECONDS_PER_HOUR: f64 = 3600.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Footer text for human-readable HTTP endpoints.
pub const FOOTER_TEXT: &str = "Project: https://github.com/cansp-dev/herakles-zfs-exporter | More info: https://www.herakles.now | Support: exporter@herakles.now";

/// Formats an uptime in the coarsest fitting unit.
pub fn format_uptime(uptime_seconds: u64) -> String {
    let uptime_hours = uptime_seconds as f64 / SECONDS_PER_HOUR;
    if uptime_hours < 1.0 {
        format!("{:.1} minutes", uptime_hours * MINUTES_PER_HOUR)
    } else if uptime_hours < HOURS_PER_DAY {
        format!("{:.1} hours", uptime_hours)
    } else {
        format!("{:.1} days", uptime_hours / HOURS_PER_DAY)
    }
}

/// Handler for the /health endpoint.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");

    let poll_count = state.cache.read().await.poll_count;

    let (status, message) = if state.health_stats.all_collectors_succeeded() {
        (StatusCode::OK, "OK")
    } else if poll_count == 0 {
        (StatusCode::SERVICE_UNAVAILABLE, "Waiting for first poll")
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Not all collectors have succeeded yet",
        )
    };

    let uptime_str = format_uptime(state.health_stats.get_uptime_seconds());
    let table = state.health_stats.render_table();

    debug!("Health check: {} - {}", status, message);
    (
        status,
        [("Content-Type", "text/plain; charset=utf-8")],
        format!("{message}\n\nUptime: {uptime_str}\nPolls: {poll_count}\n\n{table}\n{FOOTER_TEXT}"),
    )
}
