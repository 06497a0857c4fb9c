//! Collectors and the per-poll entry point.
//!
//! - [`arc::ArcCollector`]: ZFS ARC counters, differenced between polls
//! - [`ioping::IopingCollector`]: ioping request latency, no state
//!
//! [`poll_once`] runs one collector, forwards its metrics to a sink under the
//! collector's namespace and turns every error into an empty poll.

pub mod arc;
pub mod ioping;

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::collector_config::{ArcCollectorConfig, IopingCollectorConfig};
use crate::derive::DerivedMetricSet;
use crate::error::CollectError;
use crate::sink::MetricSink;

pub use arc::ArcCollector;
pub use ioping::IopingCollector;

/// A metric collector polled periodically by the host.
#[async_trait]
pub trait Collector: Send {
    /// Stable collector name used in logs and statistics.
    fn name(&self) -> &str;

    /// Prefix prepended to every published metric name.
    fn namespace(&self) -> &str;

    /// Gathers one poll's worth of metrics.
    async fn collect(&mut self) -> Result<DerivedMetricSet, CollectError>;
}

/// What happened during one poll.
#[derive(Debug)]
pub struct PollOutcome {
    pub published: usize,
    pub duration: Duration,
    pub error: Option<CollectError>,
}

impl PollOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Fully-qualified metric name: `<namespace>.<metric>`.
pub fn qualified_name(namespace: &str, metric: &str) -> String {
    if namespace.is_empty() {
        metric.to_string()
    } else {
        format!("{}.{}", namespace, metric)
    }
}

/// Polls `collector` once and publishes its metrics to `sink`.
///
/// Never fails: errors are logged and reported in the outcome, and nothing is
/// published for a failed poll.
#[instrument(skip_all, fields(collector = collector.name()))]
pub async fn poll_once(collector: &mut dyn Collector, sink: &dyn MetricSink) -> PollOutcome {
    let start = Instant::now();

    match collector.collect().await {
        Ok(metrics) => {
            for (name, value) in &metrics {
                sink.publish(&qualified_name(collector.namespace(), name), *value);
            }
            let duration = start.elapsed();
            debug!(
                "Published {} metrics in {:.2}ms",
                metrics.len(),
                duration.as_secs_f64() * 1000.0
            );
            PollOutcome {
                published: metrics.len(),
                duration,
                error: None,
            }
        }
        Err(e) => {
            warn!(kind = e.kind(), "{}: could not get stats: {}", collector.name(), e);
            PollOutcome {
                published: 0,
                duration: start.elapsed(),
                error: Some(e),
            }
        }
    }
}

/// Creates all enabled collectors.
pub fn create_collectors(
    arc: &ArcCollectorConfig,
    ioping: &IopingCollectorConfig,
    interval_secs: u64,
) -> Vec<Box<dyn Collector>> {
    let mut collectors: Vec<Box<dyn Collector>> = Vec::new();

    if arc.enabled {
        collectors.push(Box::new(ArcCollector::from_config(arc, interval_secs)));
    }

    if ioping.enabled {
        collectors.push(Box::new(IopingCollector::from_config(ioping, interval_secs)));
    }

    info!("Initialized {} collectors", collectors.len());
    collectors
}
