//! Stateful differencing of counter snapshots.
//!
//! The [`DeltaEngine`] keeps exactly one previous snapshot. Each call to
//! [`DeltaEngine::sample`] reads a fresh snapshot, differences it against the
//! previous one and returns the deltas together with the elapsed interval.

use ahash::AHashMap as HashMap;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::CollectError;
use crate::snapshot::{CounterSnapshot, SnapshotReader};

/// Interval reported for the very first sample, in seconds.
pub const FIRST_SAMPLE_INTERVAL: f64 = 1.0;

/// Per-counter differences between two consecutive snapshots.
#[derive(Debug, Clone, Default)]
pub struct DeltaSet {
    values: HashMap<String, i128>,
}

impl DeltaSet {
    /// Differences `current` against `previous`.
    ///
    /// A counter missing from `previous` gets its raw current value as delta
    /// (cold-start baseline). Counters only present in `previous` are dropped.
    pub fn between(previous: Option<&CounterSnapshot>, current: &CounterSnapshot) -> Self {
        let values = current
            .iter()
            .map(|(name, value)| {
                let delta = match previous.and_then(|p| p.get(name)) {
                    Some(prev) => value - prev,
                    None => value,
                };
                (name.to_string(), delta)
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<i128> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, i128)> for DeltaSet {
    fn from_iter<I: IntoIterator<Item = (String, i128)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Result of one sampling call.
#[derive(Debug, Clone)]
pub struct Sample {
    pub delta: DeltaSet,
    /// Elapsed seconds since the previous sample.
    pub interval: f64,
    /// Raw values, for metrics that are absolute rather than rates.
    pub current: CounterSnapshot,
}

/// Owns the previous snapshot and timestamp for one monitored resource.
pub struct DeltaEngine {
    reader: Box<dyn SnapshotReader>,
    capability_key: String,
    previous: Option<CounterSnapshot>,
    last_timestamp: Option<Instant>,
    capability: Option<bool>,
}

impl DeltaEngine {
    /// Creates an engine. Nothing is read until the first sample.
    ///
    /// `capability_key` names the counter whose presence (with a non-zero
    /// value) in the first snapshot enables the gated metric family.
    pub fn new(reader: Box<dyn SnapshotReader>, capability_key: impl Into<String>) -> Self {
        Self {
            reader,
            capability_key: capability_key.into(),
            previous: None,
            last_timestamp: None,
            capability: None,
        }
    }

    /// Capability flag, or `None` before the first successful read.
    pub fn capability(&self) -> Option<bool> {
        self.capability
    }

    pub fn source(&self) -> String {
        self.reader.describe()
    }

    pub async fn sample(&mut self) -> Result<Sample, CollectError> {
        self.sample_at(Instant::now()).await
    }

    /// Samples using `now` as the clock reading for the interval.
    ///
    /// On a read error the engine state is left untouched.
    pub async fn sample_at(&mut self, now: Instant) -> Result<Sample, CollectError> {
        let current = self.reader.read().await?;

        if self.capability.is_none() {
            let enabled = current
                .get(&self.capability_key)
                .is_some_and(|value| value != 0);
            info!(
                "{}: capability {} is {}",
                self.reader.describe(),
                self.capability_key,
                if enabled { "present" } else { "absent" }
            );
            self.capability = Some(enabled);
        }

        let interval = match self.last_timestamp {
            Some(last) => now.saturating_duration_since(last).as_secs_f64(),
            None => FIRST_SAMPLE_INTERVAL,
        };
        self.last_timestamp = Some(now);

        let delta = DeltaSet::between(self.previous.as_ref(), &current);
        self.previous = Some(current.clone());

        debug!(
            "Sampled {} counters from {} over {:.3}s",
            delta.len(),
            self.reader.describe(),
            interval
        );

        Ok(Sample {
            delta,
            interval,
            current,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Hands out a fixed sequence of read results.
    struct ScriptedReader {
        reads: Mutex<VecDeque<Result<Vec<(&'static str, i128)>, ()>>>,
    }

    impl ScriptedReader {
        fn new(reads: Vec<Result<Vec<(&'static str, i128)>, ()>>) -> Box<Self> {
            Box::new(Self {
                reads: Mutex::new(reads.into()),
            })
        }
    }

    #[async_trait]
    impl SnapshotReader for ScriptedReader {
        fn describe(&self) -> String {
            "scripted".into()
        }

        async fn read(&self) -> Result<CounterSnapshot, CollectError> {
            let next = self
                .reads
                .lock()
                .expect("reads lock poisoned")
                .pop_front()
                .expect("no scripted reads left");
            match next {
                Ok(pairs) => Ok(CounterSnapshot::new(
                    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
                )),
                Err(()) => Err(CollectError::unavailable("scripted", "gone")),
            }
        }
    }

    #[tokio::test]
    async fn test_first_sample_uses_raw_values_and_unit_interval() {
        let reader = ScriptedReader::new(vec![Ok(vec![("hits", 500), ("misses", 20)])]);
        let mut engine = DeltaEngine::new(reader, "l2_size");

        let sample = engine.sample().await.expect("sample");
        assert_eq!(sample.interval, FIRST_SAMPLE_INTERVAL);
        assert_eq!(sample.delta.get("hits"), Some(500));
        assert_eq!(sample.delta.get("misses"), Some(20));
    }

    #[tokio::test]
    async fn test_second_sample_differences_and_measures_interval() {
        let reader = ScriptedReader::new(vec![
            Ok(vec![("hits", 500), ("misses", 20)]),
            Ok(vec![("hits", 800), ("misses", 20), ("evict_skip", 9)]),
        ]);
        let mut engine = DeltaEngine::new(reader, "l2_size");

        let t0 = Instant::now();
        engine.sample_at(t0).await.expect("first sample");
        let sample = engine
            .sample_at(t0 + Duration::from_millis(2500))
            .await
            .expect("second sample");

        assert!((sample.interval - 2.5).abs() < 1e-9);
        assert_eq!(sample.delta.get("hits"), Some(300));
        assert_eq!(sample.delta.get("misses"), Some(0));
        // new counter: cold-start baseline
        assert_eq!(sample.delta.get("evict_skip"), Some(9));
        assert_eq!(sample.current.get("hits"), Some(800));
    }

    #[tokio::test]
    async fn test_counter_reset_yields_negative_delta() {
        let reader = ScriptedReader::new(vec![Ok(vec![("hits", 500)]), Ok(vec![("hits", 100)])]);
        let mut engine = DeltaEngine::new(reader, "l2_size");
        engine.sample().await.expect("first");
        let sample = engine.sample().await.expect("second");
        assert_eq!(sample.delta.get("hits"), Some(-400));
    }

    #[tokio::test]
    async fn test_capability_fixed_after_first_read() {
        let reader = ScriptedReader::new(vec![
            Ok(vec![("hits", 1)]),
            Ok(vec![("hits", 2), ("l2_size", 4096)]),
        ]);
        let mut engine = DeltaEngine::new(reader, "l2_size");
        assert_eq!(engine.capability(), None);

        engine.sample().await.expect("first");
        assert_eq!(engine.capability(), Some(false));
        engine.sample().await.expect("second");
        assert_eq!(engine.capability(), Some(false));
    }

    #[tokio::test]
    async fn test_capability_stays_true_when_counter_disappears() {
        let reader = ScriptedReader::new(vec![
            Ok(vec![("l2_size", 4096)]),
            Ok(vec![("hits", 2)]),
        ]);
        let mut engine = DeltaEngine::new(reader, "l2_size");
        engine.sample().await.expect("first");
        engine.sample().await.expect("second");
        assert_eq!(engine.capability(), Some(true));
    }

    #[tokio::test]
    async fn test_zero_capability_counter_is_absent() {
        let reader = ScriptedReader::new(vec![Ok(vec![("l2_size", 0)])]);
        let mut engine = DeltaEngine::new(reader, "l2_size");
        engine.sample().await.expect("first");
        assert_eq!(engine.capability(), Some(false));
    }

    #[tokio::test]
    async fn test_failed_read_leaves_state_untouched() {
        let reader = ScriptedReader::new(vec![
            Ok(vec![("hits", 100)]),
            Err(()),
            Ok(vec![("hits", 160)]),
        ]);
        let mut engine = DeltaEngine::new(reader, "l2_size");

        let t0 = Instant::now();
        engine.sample_at(t0).await.expect("first");
        assert!(engine.sample_at(t0 + Duration::from_secs(1)).await.is_err());

        let sample = engine
            .sample_at(t0 + Duration::from_secs(3))
            .await
            .expect("third");
        assert_eq!(sample.delta.get("hits"), Some(60));
        assert!((sample.interval - 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_failed_first_read_leaves_capability_unset() {
        let reader = ScriptedReader::new(vec![Err(()), Ok(vec![("l2_size", 1)])]);
        let mut engine = DeltaEngine::new(reader, "l2_size");
        assert!(engine.sample().await.is_err());
        assert_eq!(engine.capability(), None);

        let sample = engine.sample().await.expect("second");
        assert_eq!(sample.interval, FIRST_SAMPLE_INTERVAL);
        assert_eq!(engine.capability(), Some(true));
    }
}
