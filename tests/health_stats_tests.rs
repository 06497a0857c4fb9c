//! Integration tests for health stats module.
//!
//! Feeds real poll outcomes into `HealthStats` and checks what `/health`
//! would render.

use async_trait::async_trait;
use herakles_zfs_exporter::health_stats::HealthStats;
use herakles_zfs_exporter::{poll_once, CollectError, Collector, DerivedMetricSet, MemorySink};
use std::sync::atomic::Ordering;

/// Succeeds on odd-numbered polls (the 1st, 3rd, ...), fails on even ones.
struct Flaky {
    polls: usize,
}

#[async_trait]
impl Collector for Flaky {
    fn name(&self) -> &str {
        "flaky"
    }

    fn namespace(&self) -> &str {
        "test"
    }

    async fn collect(&mut self) -> Result<DerivedMetricSet, CollectError> {
        self.polls += 1;
        if self.polls % 2 == 0 {
            Err(CollectError::unavailable("flaky", "simulated outage"))
        } else {
            Ok([("a".to_string(), 1.0), ("b".to_string(), 2.0)]
                .into_iter()
                .collect())
        }
    }
}

async fn poll_and_record(collector: &mut Flaky, stats: &HealthStats) {
    let sink = MemorySink::new();
    let outcome = poll_once(collector, &sink).await;
    let slot = stats.collector(collector.name()).expect("registered");
    let ms = outcome.duration.as_secs_f64() * 1000.0;
    match &outcome.error {
        None => slot.record_success(outcome.published, ms),
        Some(e) => slot.record_failure(&e.to_string(), ms),
    }
}

#[test]
fn test_health_stats_initialize_empty() {
    let stats = HealthStats::new(["zfs_arc", "ioping"]);

    let arc = stats.collector("zfs_arc").expect("registered");
    assert_eq!(arc.polls.load(Ordering::Relaxed), 0);
    assert_eq!(arc.success_rate(), 100.0);
    assert!(arc.last_success().is_none());
    assert!(stats.collector("unknown").is_none());
    assert!(!stats.all_collectors_succeeded());
}

#[tokio::test]
async fn test_poll_outcomes_are_recorded() {
    let stats = HealthStats::new(["flaky"]);
    let mut collector = Flaky { polls: 0 };

    for _ in 0..4 {
        poll_and_record(&mut collector, &stats).await;
    }

    let slot = stats.collector("flaky").expect("registered");
    assert_eq!(slot.polls.load(Ordering::Relaxed), 4);
    assert_eq!(slot.failures.load(Ordering::Relaxed), 2);
    assert_eq!(slot.success_rate(), 50.0);
    assert!(slot
        .last_error()
        .is_some_and(|e| e.contains("simulated outage")));

    let (_, avg, max, min, count) = slot.metrics_published.snapshot();
    assert_eq!(count, 2);
    assert_eq!((avg, max, min), (2.0, 2.0, 2.0));
    assert!(stats.all_collectors_succeeded());
}

#[tokio::test]
async fn test_render_table_lists_collectors() {
    let stats = HealthStats::new(["flaky", "ioping"]);
    let mut collector = Flaky { polls: 0 };
    poll_and_record(&mut collector, &stats).await;
    stats.record_metrics_endpoint_call();

    let table = stats.render_table();
    assert!(table.contains("COLLECTOR FLAKY"));
    assert!(table.contains("COLLECTOR IOPING"));
    assert!(table.contains("metrics endpoint calls: 1"));
    // ioping never succeeded
    assert!(!stats.all_collectors_succeeded());
}
