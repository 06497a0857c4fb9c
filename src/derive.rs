//! Derived ARC metrics.
//!
//! Pure functions over one [`Sample`]: per-second rates, hit/miss percentages,
//! raw size pass-throughs and the L2ARC family gated by the capability flag.

use std::collections::BTreeMap;

use crate::delta::Sample;
use crate::error::CollectError;

/// Metric name → value, produced once per poll.
pub type DerivedMetricSet = BTreeMap<String, f64>;

/// Hit and miss rates for one cache access category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitMiss {
    pub hit: f64,
    pub miss: f64,
}

impl HitMiss {
    pub fn total(&self) -> f64 {
        self.hit + self.miss
    }

    pub fn hit_percent(&self) -> f64 {
        let total = self.total();
        if total > 0.0 {
            100.0 * self.hit / total
        } else {
            0.0
        }
    }

    /// Zero on an idle interval, not `100 - 0`.
    pub fn miss_percent(&self) -> f64 {
        if self.total() > 0.0 {
            100.0 - self.hit_percent()
        } else {
            0.0
        }
    }
}

/// Names under which one [`HitMiss`] pair is emitted.
struct PairNames {
    hit: &'static str,
    miss: &'static str,
    read: &'static str,
    hit_percent: &'static str,
    miss_percent: &'static str,
}

const ARC_TOTAL: PairNames = PairNames {
    hit: "arc.hits",
    miss: "arc.miss",
    read: "arc.read",
    hit_percent: "arc.hit_percent",
    miss_percent: "arc.miss_percent",
};

const ARC_DEMAND: PairNames = PairNames {
    hit: "arc.dhit",
    miss: "arc.dmis",
    read: "arc.dread",
    hit_percent: "arc.dh_percent",
    miss_percent: "arc.dm_percent",
};

const ARC_PREFETCH: PairNames = PairNames {
    hit: "arc.phit",
    miss: "arc.pmis",
    read: "arc.pread",
    hit_percent: "arc.ph_percent",
    miss_percent: "arc.pm_percent",
};

const ARC_METADATA: PairNames = PairNames {
    hit: "arc.mhit",
    miss: "arc.mmis",
    read: "arc.mread",
    hit_percent: "arc.mh_percent",
    miss_percent: "arc.mm_percent",
};

const L2ARC: PairNames = PairNames {
    hit: "l2arc.hits",
    miss: "l2arc.miss",
    read: "l2arc.read",
    hit_percent: "l2arc.hit_percent",
    miss_percent: "l2arc.miss_percent",
};

/// Plain per-second rates: metric name, counter name.
const ARC_RATES: [(&str, &str); 6] = [
    ("arc.mfu", "mfu_hits"),
    ("arc.mru", "mru_hits"),
    ("arc.mrug", "mru_ghost_hits"),
    ("arc.mfug", "mfu_ghost_hits"),
    ("arc.eskip", "evict_skip"),
    ("arc.mtxmis", "mutex_miss"),
];

/// Counter lookups against one sample.
struct Counters<'a> {
    sample: &'a Sample,
}

impl Counters<'_> {
    /// Sum of the deltas of `names`, per second.
    fn rate(&self, names: &[&str]) -> Result<f64, CollectError> {
        let mut sum: i128 = 0;
        for name in names {
            sum += self
                .sample
                .delta
                .get(name)
                .ok_or_else(|| CollectError::MissingCounter(name.to_string()))?;
        }
        let interval = self.sample.interval;
        Ok(if interval > 0.0 {
            sum as f64 / interval
        } else {
            0.0
        })
    }

    fn raw(&self, name: &str) -> Result<f64, CollectError> {
        self.sample
            .current
            .get(name)
            .map(|v| v as f64)
            .ok_or_else(|| CollectError::MissingCounter(name.to_string()))
    }

    fn pair(&self, hits: &[&str], misses: &[&str]) -> Result<HitMiss, CollectError> {
        Ok(HitMiss {
            hit: self.rate(hits)?,
            miss: self.rate(misses)?,
        })
    }
}

fn insert_pair(out: &mut DerivedMetricSet, names: &PairNames, pair: HitMiss) {
    out.insert(names.hit.into(), pair.hit);
    out.insert(names.miss.into(), pair.miss);
    out.insert(names.read.into(), pair.total());
    out.insert(names.hit_percent.into(), pair.hit_percent());
    out.insert(names.miss_percent.into(), pair.miss_percent());
}

/// Computes the ARC (and, when `l2_enabled`, L2ARC) metric set.
///
/// Fails with `MissingCounter` if any counter a metric depends on is absent;
/// no partial set is returned in that case.
pub fn derive_arc_metrics(
    sample: &Sample,
    l2_enabled: bool,
) -> Result<DerivedMetricSet, CollectError> {
    let c = Counters { sample };
    let mut out = DerivedMetricSet::new();

    insert_pair(&mut out, &ARC_TOTAL, c.pair(&["hits"], &["misses"])?);
    insert_pair(
        &mut out,
        &ARC_DEMAND,
        c.pair(
            &["demand_data_hits", "demand_metadata_hits"],
            &["demand_data_misses", "demand_metadata_misses"],
        )?,
    );
    insert_pair(
        &mut out,
        &ARC_PREFETCH,
        c.pair(
            &["prefetch_data_hits", "prefetch_metadata_hits"],
            &["prefetch_data_misses", "prefetch_metadata_misses"],
        )?,
    );
    insert_pair(
        &mut out,
        &ARC_METADATA,
        c.pair(
            &["prefetch_metadata_hits", "demand_metadata_hits"],
            &["prefetch_metadata_misses", "demand_metadata_misses"],
        )?,
    );

    out.insert("arc.arcsz".into(), c.raw("size")?);
    out.insert("arc.c".into(), c.raw("c")?);

    for (metric, counter) in ARC_RATES {
        out.insert(metric.into(), c.rate(&[counter])?);
    }

    if l2_enabled {
        insert_pair(&mut out, &L2ARC, c.pair(&["l2_hits"], &["l2_misses"])?);
        out.insert("l2arc.asize".into(), c.raw("l2_asize")?);
        out.insert("l2arc.size".into(), c.raw("l2_size")?);
        out.insert("l2arc.bytes".into(), c.rate(&["l2_read_bytes"])?);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::DeltaSet;
    use crate::snapshot::CounterSnapshot;

    const ARC_COUNTERS: [&str; 20] = [
        "hits",
        "misses",
        "demand_data_hits",
        "demand_data_misses",
        "demand_metadata_hits",
        "demand_metadata_misses",
        "prefetch_data_hits",
        "prefetch_data_misses",
        "prefetch_metadata_hits",
        "prefetch_metadata_misses",
        "size",
        "c",
        "mfu_hits",
        "mru_hits",
        "mru_ghost_hits",
        "mfu_ghost_hits",
        "evict_skip",
        "mutex_miss",
        "l2_hits",
        "l2_misses",
    ];

    /// Builds a sample where every known counter has the same delta and raw value,
    /// then applies `overrides` to both.
    fn sample_with(value: i128, overrides: &[(&str, i128)], interval: f64) -> Sample {
        let mut pairs: Vec<(String, i128)> = ARC_COUNTERS
            .iter()
            .chain(["l2_asize", "l2_size", "l2_read_bytes"].iter())
            .map(|k| (k.to_string(), value))
            .collect();
        for (name, v) in overrides {
            pairs.retain(|(k, _)| k != name);
            pairs.push((name.to_string(), *v));
        }
        Sample {
            delta: pairs.iter().cloned().collect::<DeltaSet>(),
            interval,
            current: CounterSnapshot::new(pairs.into_iter().collect()),
        }
    }

    #[test]
    fn test_hit_miss_percentages() {
        let pair = HitMiss {
            hit: 100.0 / 10.0,
            miss: 50.0 / 10.0,
        };
        assert_eq!(pair.hit, 10.0);
        assert_eq!(pair.miss, 5.0);
        assert_eq!(pair.total(), 15.0);
        assert!((pair.hit_percent() - 66.6667).abs() < 0.001);
        assert!((pair.miss_percent() - 33.3333).abs() < 0.001);
    }

    #[test]
    fn test_idle_pair_is_zero_zero() {
        let pair = HitMiss { hit: 0.0, miss: 0.0 };
        assert_eq!(pair.hit_percent(), 0.0);
        assert_eq!(pair.miss_percent(), 0.0);
    }

    #[test]
    fn test_arc_totals() {
        let sample = sample_with(0, &[("hits", 100), ("misses", 50)], 10.0);
        let metrics = derive_arc_metrics(&sample, false).expect("all counters present");

        assert_eq!(metrics["arc.hits"], 10.0);
        assert_eq!(metrics["arc.miss"], 5.0);
        assert_eq!(metrics["arc.read"], 15.0);
        assert!((metrics["arc.hit_percent"] - 66.67).abs() < 0.01);
        assert!((metrics["arc.miss_percent"] - 33.33).abs() < 0.01);
    }

    #[test]
    fn test_idle_system_has_zero_percentages() {
        let sample = sample_with(0, &[], 30.0);
        let metrics = derive_arc_metrics(&sample, true).expect("all counters present");

        for name in [
            "arc.hit_percent",
            "arc.miss_percent",
            "arc.dh_percent",
            "arc.dm_percent",
            "arc.ph_percent",
            "arc.pm_percent",
            "arc.mh_percent",
            "arc.mm_percent",
            "l2arc.hit_percent",
            "l2arc.miss_percent",
        ] {
            assert_eq!(metrics[name], 0.0, "{} should be 0 on an idle system", name);
        }
    }

    #[test]
    fn test_demand_prefetch_and_metadata_groups() {
        let sample = sample_with(
            0,
            &[
                ("demand_data_hits", 30),
                ("demand_metadata_hits", 10),
                ("demand_data_misses", 6),
                ("demand_metadata_misses", 4),
                ("prefetch_data_hits", 8),
                ("prefetch_metadata_hits", 2),
                ("prefetch_data_misses", 0),
                ("prefetch_metadata_misses", 10),
            ],
            2.0,
        );
        let metrics = derive_arc_metrics(&sample, false).expect("all counters present");

        assert_eq!(metrics["arc.dhit"], 20.0);
        assert_eq!(metrics["arc.dmis"], 5.0);
        assert_eq!(metrics["arc.dread"], 25.0);
        assert_eq!(metrics["arc.dh_percent"], 80.0);
        assert_eq!(metrics["arc.dm_percent"], 20.0);

        assert_eq!(metrics["arc.phit"], 5.0);
        assert_eq!(metrics["arc.pmis"], 5.0);
        assert_eq!(metrics["arc.ph_percent"], 50.0);

        // metadata = prefetch_metadata + demand_metadata
        assert_eq!(metrics["arc.mhit"], 6.0);
        assert_eq!(metrics["arc.mmis"], 7.0);
        assert_eq!(metrics["arc.mread"], 13.0);
    }

    #[test]
    fn test_sizes_are_raw_values_not_rates() {
        let mut sample = sample_with(0, &[], 10.0);
        sample.current = CounterSnapshot::new(
            ARC_COUNTERS
                .iter()
                .map(|k| (k.to_string(), 0))
                .chain([("size".to_string(), 4096), ("c".to_string(), 8192)])
                .collect(),
        );
        let metrics = derive_arc_metrics(&sample, false).expect("all counters present");
        assert_eq!(metrics["arc.arcsz"], 4096.0);
        assert_eq!(metrics["arc.c"], 8192.0);
    }

    #[test]
    fn test_l2_family_absent_without_capability() {
        let sample = sample_with(5, &[], 1.0);
        let metrics = derive_arc_metrics(&sample, false).expect("all counters present");
        assert!(metrics.keys().all(|k| !k.starts_with("l2arc.")));
        assert_eq!(metrics.len(), 28);
    }

    #[test]
    fn test_l2_family_present_with_capability() {
        let sample = sample_with(
            0,
            &[
                ("l2_hits", 40),
                ("l2_misses", 10),
                ("l2_size", 1 << 30),
                ("l2_asize", 1 << 29),
                ("l2_read_bytes", 4000),
            ],
            4.0,
        );
        let metrics = derive_arc_metrics(&sample, true).expect("all counters present");
        assert_eq!(metrics["l2arc.hits"], 10.0);
        assert_eq!(metrics["l2arc.miss"], 2.5);
        assert_eq!(metrics["l2arc.read"], 12.5);
        assert_eq!(metrics["l2arc.hit_percent"], 80.0);
        assert_eq!(metrics["l2arc.size"], (1u64 << 30) as f64);
        assert_eq!(metrics["l2arc.asize"], (1u64 << 29) as f64);
        assert_eq!(metrics["l2arc.bytes"], 1000.0);
        assert_eq!(metrics.len(), 36);
    }

    #[test]
    fn test_missing_counter_fails_whole_set() {
        let mut sample = sample_with(1, &[], 1.0);
        sample.delta = sample
            .current
            .iter()
            .filter(|(k, _)| *k != "mutex_miss")
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        match derive_arc_metrics(&sample, false) {
            Err(CollectError::MissingCounter(name)) => assert_eq!(name, "mutex_miss"),
            other => panic!("expected MissingCounter, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_interval_does_not_divide() {
        let sample = sample_with(10, &[], 0.0);
        let metrics = derive_arc_metrics(&sample, false).expect("all counters present");
        assert!(metrics.values().all(|v| v.is_finite()));
        assert_eq!(metrics["arc.hits"], 0.0);
    }
}
