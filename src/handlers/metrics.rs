//! Metrics endpoint handler for Prometheus scraping.
//!
//! The registry is rebuilt from the poll cache on every scrape. A metric that
//! the last poll did not publish is therefore absent from the output instead
//! of being reported with its previous value.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::time::Instant;
use tracing::{debug, error, instrument, warn};

use crate::cache::MetricsCache;
use crate::state::SharedState;

/// Buffer capacity for metrics encoding.
const BUFFER_CAP: usize = 16 * 1024;

/// Prefix of the exporter's own metrics.
const SELF_PREFIX: &str = "herakles_zfs_exporter";

/// Error type for metrics endpoint failures.
#[derive(Debug)]
pub enum MetricsError {
    EncodingFailed,
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to encode metrics",
        )
            .into_response()
    }
}

/// Maps a dotted metric name onto the Prometheus name charset.
///
/// `zfs.arc.hits` becomes `zfs_arc_hits`; a leading digit gets a `_` prefix.
pub fn sanitize_metric_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == ':' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Builds a registry holding one gauge per cached metric plus the
/// exporter's own per-collector status series.
pub fn build_registry(cache: &MetricsCache) -> Registry {
    let registry = Registry::new();

    for (name, value) in cache.iter_metrics() {
        let prom_name = sanitize_metric_name(name);
        let gauge = match Gauge::new(prom_name.clone(), name.to_string()) {
            Ok(g) => g,
            Err(e) => {
                warn!("Skipping metric {}: {}", name, e);
                continue;
            }
        };
        gauge.set(value);
        if let Err(e) = registry.register(Box::new(gauge)) {
            warn!("Failed to register {}: {}", prom_name, e);
        }
    }

    register_status(&registry, cache);
    registry
}

fn register_status(registry: &Registry, cache: &MetricsCache) {
    let up = GaugeVec::new(
        Opts::new(
            format!("{SELF_PREFIX}_collector_success"),
            "1 if the collector's last poll succeeded",
        ),
        &["collector"],
    );
    let published = GaugeVec::new(
        Opts::new(
            format!("{SELF_PREFIX}_collector_metrics"),
            "Metrics published by the collector's last poll",
        ),
        &["collector"],
    );
    let polls = Gauge::new(
        format!("{SELF_PREFIX}_polls_total"),
        "Completed poll rounds since start",
    );

    let (Ok(up), Ok(published), Ok(polls)) = (up, published, polls) else {
        error!("Failed to create exporter status metrics");
        return;
    };

    for (name, result) in &cache.collectors {
        up.with_label_values(&[name.as_str()])
            .set(if result.success { 1.0 } else { 0.0 });
        published
            .with_label_values(&[name.as_str()])
            .set(result.metrics.len() as f64);
    }
    polls.set(cache.poll_count as f64);

    let status: Vec<Box<dyn prometheus::core::Collector>> =
        vec![Box::new(up), Box::new(published), Box::new(polls)];
    for collector in status {
        if let Err(e) = registry.register(collector) {
            warn!("Failed to register exporter status metric: {}", e);
        }
    }
}

/// Handler for the /metrics endpoint.
#[instrument(skip(state))]
pub async fn metrics_handler(State(state): State<SharedState>) -> Result<String, MetricsError> {
    let start = Instant::now();
    debug!("Processing /metrics request");

    let registry = {
        let cache = state.cache.read().await;
        build_registry(&cache)
    };
    let families = registry.gather();

    let mut buffer = Vec::with_capacity(BUFFER_CAP);
    let encoder = TextEncoder::new();
    if encoder.encode(&families, &mut buffer).is_err() {
        error!("Failed to encode Prometheus metrics");
        return Err(MetricsError::EncodingFailed);
    }

    state.health_stats.record_metrics_endpoint_call();

    debug!(
        "Metrics request completed: {} families, {} bytes, {:.3}ms",
        families.len(),
        buffer.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    String::from_utf8(buffer).map_err(|_| MetricsError::EncodingFailed)
}
