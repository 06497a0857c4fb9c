//! Cache of the most recent poll results.
//!
//! Each collector's entry is replaced wholesale after every poll, so the
//! values of a failed poll are absent rather than stale.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Latest results of one collector.
#[derive(Debug, Clone, Default)]
pub struct CollectorResult {
    pub metrics: BTreeMap<String, f64>,
    pub polled_at: Option<DateTime<Utc>>,
    pub success: bool,
}

/// Poll results for all collectors, keyed by collector name.
#[derive(Debug, Clone, Default)]
pub struct MetricsCache {
    pub collectors: BTreeMap<String, CollectorResult>,
    pub poll_count: u64,
}

impl MetricsCache {
    pub fn store(&mut self, collector: &str, metrics: BTreeMap<String, f64>, success: bool) {
        self.collectors.insert(
            collector.to_string(),
            CollectorResult {
                metrics,
                polled_at: Some(Utc::now()),
                success,
            },
        );
    }

    /// All cached metrics across collectors.
    pub fn iter_metrics(&self) -> impl Iterator<Item = (&str, f64)> {
        self.collectors
            .values()
            .flat_map(|r| r.metrics.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    pub fn metric_count(&self) -> usize {
        self.collectors.values().map(|r| r.metrics.len()).sum()
    }
}
