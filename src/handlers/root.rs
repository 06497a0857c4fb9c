//! Root endpoint handler for the landing page.
//!
//! This module provides the `/` endpoint handler that displays
//! a landing page with all available endpoints and descriptions.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use tracing::{debug, instrument};

use crate::handlers::health::FOOTER_TEXT;
use crate::state::SharedState;

/// Routes served by the exporter: path, description, health-only.
const ENDPOINTS: [(&str, &str, bool); 3] = [
    ("/metrics", "Prometheus-compatible metrics endpoint", false),
    ("/health", "Per-collector poll statistics (text)", true),
    ("/config", "Active runtime configuration (read-only)", false),
];

/// Renders the `<li>` entries for the routes that are actually registered.
pub fn render_endpoint_list(enable_health: bool) -> String {
    ENDPOINTS
        .iter()
        .filter(|(_, _, health_only)| enable_health || !health_only)
        .map(|(path, desc, _)| {
            format!(
                "        <li>\n            <a href=\"{path}\">{path}</a>\n            <div class=\"endpoint-desc\">{desc}</div>\n        </li>\n"
            )
        })
        .collect()
}

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing / request");

    let version = env!("CARGO_PKG_VERSION");
    let built = option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown");
    let interval = state.config.interval_secs();
    let poll_count = state.cache.read().await.poll_count;

    // Calculate actual uptime from service start time
    let uptime_secs = state.start_time.elapsed().as_secs();
    let hours = uptime_secs / 3600;
    let minutes = (uptime_secs % 3600) / 60;
    let seconds = uptime_secs % 60;
    let uptime_str = format!("{}h {}m {}s", hours, minutes, seconds);

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Herakles ZFS Exporter</title>
    <style>
        body {{ font-family: sans-serif; margin: 0; padding: 20px; background: #f4f6f8; }}
        .container {{ max-width: 820px; margin: 0 auto; background: #fff; padding: 32px; border-radius: 6px; }}
        h1 {{ color: #2b3a42; border-bottom: 3px solid #1f7a8c; padding-bottom: 12px; }}
        .subtitle {{ color: #666; margin-bottom: 24px; }}
        .info {{ display: flex; flex-wrap: wrap; gap: 24px; background: #e8eef1; padding: 12px 16px; border-radius: 4px; }}
        .info-label {{ display: block; font-size: 0.85em; font-weight: 600; color: #555; }}
        .info-value {{ font-size: 1.15em; color: #1f7a8c; }}
        .endpoint-list {{ list-style: none; padding: 0; }}
        .endpoint-list li {{ margin: 14px 0; padding: 12px; background: #f8f9fa; border-left: 4px solid #1f7a8c; }}
        .endpoint-list a {{ color: #1f7a8c; font-weight: 600; text-decoration: none; }}
        .endpoint-desc {{ color: #666; margin-top: 4px; }}
        .footer {{ margin-top: 32px; padding-top: 16px; border-top: 1px solid #ddd; color: #777; font-size: 0.85em; text-align: center; }}
    </style>
</head>
<body>
<div class="container">
    <h1>Herakles ZFS Exporter</h1>
    <p class="subtitle">ZFS ARC hit/miss rates and ioping latency for Prometheus</p>

    <div class="info">
        <div class="info-item">
            <span class="info-label">Version</span>
            <span class="info-value">{version}</span>
        </div>
        <div class="info-item">
            <span class="info-label">Uptime</span>
            <span class="info-value">{uptime}</span>
        </div>
        <div class="info-item">
            <span class="info-label">Poll interval</span>
            <span class="info-value">{interval}s</span>
        </div>
        <div class="info-item">
            <span class="info-label">Polls</span>
            <span class="info-value">{poll_count}</span>
        </div>
    </div>

    <h2>Available Endpoints</h2>
    <ul class="endpoint-list">
{endpoints}    </ul>

    <div class="footer">
        <p>Built {built}</p>
        <p>{footer}</p>
    </div>
</div>
</body>
</html>"#,
        version = version,
        uptime = uptime_str,
        interval = interval,
        poll_count = poll_count,
        built = built,
        endpoints = render_endpoint_list(state.config.enable_health.unwrap_or(true)),
        footer = FOOTER_TEXT
    );

    Html(html)
}
