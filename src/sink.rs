//! Publish sinks.
//!
//! Collectors hand every metric to a [`MetricSink`] one call at a time. There
//! is no batching contract: each `publish` stands on its own.

use std::collections::BTreeMap;
use std::sync::Mutex;

/// Receiver of published metrics.
pub trait MetricSink: Send + Sync {
    fn publish(&self, name: &str, value: f64);
}

/// Buffers published metrics in memory, keyed by name.
///
/// The poll loop publishes into one of these per collector and then swaps the
/// buffer into the metrics cache, so a failed poll leaves no stale values.
#[derive(Default)]
pub struct MemorySink {
    values: Mutex<BTreeMap<String, f64>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.lock().ok()?.get(name).copied()
    }

    /// Takes the buffered values, leaving the sink empty.
    pub fn take(&self) -> BTreeMap<String, f64> {
        self.values
            .lock()
            .map(|mut v| std::mem::take(&mut *v))
            .unwrap_or_default()
    }
}

impl MetricSink for MemorySink {
    fn publish(&self, name: &str, value: f64) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(name.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_take_empties() {
        let sink = MemorySink::new();
        sink.publish("zfs.arc.hits", 10.0);
        sink.publish("zfs.arc.hits", 12.0);
        sink.publish("zfs.arc.miss", 1.0);

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.get("zfs.arc.hits"), Some(12.0));

        let taken = sink.take();
        assert_eq!(taken.len(), 2);
        assert!(sink.is_empty());
    }
}
