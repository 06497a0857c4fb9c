//! ZFS ARC collector.
//!
//! Reads `/proc/spl/kstat/zfs/arcstats` (or a configured command), differences
//! it against the previous poll and derives hit/miss rates and percentages.

use async_trait::async_trait;
use std::time::Duration;

use super::Collector;
use crate::collector_config::ArcCollectorConfig;
use crate::delta::DeltaEngine;
use crate::derive::{derive_arc_metrics, DerivedMetricSet};
use crate::error::CollectError;
use crate::probe::probe_deadline_secs;
use crate::snapshot::{CommandReader, KstatFileReader, SnapshotReader};

pub struct ArcCollector {
    namespace: String,
    engine: DeltaEngine,
}

impl ArcCollector {
    pub fn new(
        namespace: impl Into<String>,
        reader: Box<dyn SnapshotReader>,
        capability_key: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            engine: DeltaEngine::new(reader, capability_key),
        }
    }

    /// Builds the collector from its config section.
    ///
    /// A command source gets the same deadline as the latency probe.
    pub fn from_config(config: &ArcCollectorConfig, interval_secs: u64) -> Self {
        let reader: Box<dyn SnapshotReader> = match config.command.as_deref() {
            Some([program, args @ ..]) => Box::new(CommandReader::new(
                program.clone(),
                args.to_vec(),
                Duration::from_secs(probe_deadline_secs(interval_secs)),
            )),
            _ => Box::new(KstatFileReader::new(&config.kstat_path)),
        };
        Self::new(config.path.clone(), reader, config.capability_key.clone())
    }

    /// Whether L2ARC metrics are emitted; `None` until the first successful read.
    pub fn l2_enabled(&self) -> Option<bool> {
        self.engine.capability()
    }

    pub fn source(&self) -> String {
        self.engine.source()
    }
}

#[async_trait]
impl Collector for ArcCollector {
    fn name(&self) -> &str {
        "zfs_arc"
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn collect(&mut self) -> Result<DerivedMetricSet, CollectError> {
        let sample = self.engine.sample().await?;
        let l2 = self.engine.capability().unwrap_or(false);
        derive_arc_metrics(&sample, l2)
    }
}
