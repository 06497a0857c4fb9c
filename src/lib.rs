//! Herakles ZFS Exporter Library
//!
//! Collectors for ZFS storage hosts, usable from any host that calls them
//! periodically and provides a publish sink.
//!
//! # Features
//!
//! - **ARC statistics**: per-second hit/miss rates and percentages derived from
//!   `/proc/spl/kstat/zfs/arcstats`, differenced between polls
//! - **L2ARC statistics**: emitted only when a cache device was present at startup
//! - **ioping latency**: min/avg/max/mdev of a bounded ioping run
//! - **Fail-soft polling**: a failed poll publishes nothing and never panics
//!
//! # Usage
//!
//! ```rust,no_run
//! use herakles_zfs_exporter::collectors::{poll_once, ArcCollector};
//! use herakles_zfs_exporter::snapshot::KstatFileReader;
//! use herakles_zfs_exporter::sink::MemorySink;
//!
//! # async fn run() {
//! let reader = KstatFileReader::new("/proc/spl/kstat/zfs/arcstats");
//! let mut collector = ArcCollector::new("zfs", Box::new(reader), "l2_size");
//! let sink = MemorySink::new();
//!
//! let outcome = poll_once(&mut collector, &sink).await;
//! println!("published {} metrics", outcome.published);
//! println!("hit rate: {:?}", sink.get("zfs.arc.hit_percent"));
//! # }
//! ```

pub mod collector_config;
pub mod collectors;
pub mod delta;
pub mod derive;
pub mod error;
pub mod health_stats;
pub mod probe;
pub mod sink;
pub mod snapshot;
pub mod watchdog;

// Re-export main types for convenience
pub use collector_config::{ArcCollectorConfig, IopingCollectorConfig};
pub use collectors::{poll_once, Collector, PollOutcome};
pub use delta::{DeltaEngine, DeltaSet, Sample};
pub use derive::{derive_arc_metrics, DerivedMetricSet, HitMiss};
pub use error::CollectError;
pub use sink::{MemorySink, MetricSink};
pub use snapshot::{CounterSnapshot, SnapshotReader};
