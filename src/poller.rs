//! Poll loop for the exporter.
//!
//! Polls every collector once per interval, sequentially, and swaps each
//! collector's results into the metrics cache.

use herakles_zfs_exporter::{poll_once, Collector, MemorySink};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use crate::state::SharedState;

/// Polls each collector once and stores the results.
#[instrument(skip_all)]
pub async fn poll_all(collectors: &mut [Box<dyn Collector>], state: &SharedState) {
    for collector in collectors.iter_mut() {
        let sink = MemorySink::new();
        let outcome = poll_once(collector.as_mut(), &sink).await;
        let duration_ms = outcome.duration.as_secs_f64() * 1000.0;

        if let Some(stats) = state.health_stats.collector(collector.name()) {
            match &outcome.error {
                None => stats.record_success(outcome.published, duration_ms),
                Some(e) => stats.record_failure(&e.to_string(), duration_ms),
            }
        }

        let mut cache = state.cache.write().await;
        cache.store(collector.name(), sink.take(), outcome.is_success());
    }

    let mut cache = state.cache.write().await;
    cache.poll_count += 1;
    debug!(
        "Poll #{} complete, {} metrics cached",
        cache.poll_count,
        cache.metric_count()
    );
}

/// Runs [`poll_all`] every `interval` until the task is dropped.
///
/// Ticks that fall behind (e.g. a slow probe) are skipped, not bunched up.
pub async fn run_poll_loop(
    mut collectors: Vec<Box<dyn Collector>>,
    state: SharedState,
    interval: Duration,
) {
    if collectors.is_empty() {
        warn!("No collectors enabled, poll loop not started");
        return;
    }

    info!(
        "Polling {} collectors every {}s",
        collectors.len(),
        interval.as_secs()
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        poll_all(&mut collectors, &state).await;
    }
}
