//! ioping latency collector.
//!
//! Runs one bounded ioping probe per poll and publishes `min`, `avg`, `max`
//! and `mdev` in microseconds. Keeps no state between polls.

use async_trait::async_trait;
use std::time::Duration;

use super::Collector;
use crate::collector_config::IopingCollectorConfig;
use crate::derive::DerivedMetricSet;
use crate::error::CollectError;
use crate::probe::IopingProbe;

pub struct IopingCollector {
    namespace: String,
    probe: IopingProbe,
}

impl IopingCollector {
    pub fn new(namespace: impl Into<String>, probe: IopingProbe) -> Self {
        Self {
            namespace: namespace.into(),
            probe,
        }
    }

    pub fn from_config(config: &IopingCollectorConfig, interval_secs: u64) -> Self {
        let probe = IopingProbe::new(
            config.binary.clone(),
            config.directory.clone(),
            interval_secs,
            Duration::from_secs(config.grace_seconds),
        );
        Self::new(config.path.clone(), probe)
    }

    pub fn probe(&self) -> &IopingProbe {
        &self.probe
    }
}

#[async_trait]
impl Collector for IopingCollector {
    fn name(&self) -> &str {
        "ioping"
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn collect(&mut self) -> Result<DerivedMetricSet, CollectError> {
        Ok(self.probe.run().await?.to_metrics())
    }
}
