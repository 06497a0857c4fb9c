//! Poll statistics for the exporter.
//!
//! Tracks, per collector, how many polls ran, how many failed and why, how
//! many metrics were published and how long polls took.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock as StdRwLock};
use std::time::Instant;

/// Running statistics for a single metric.
#[derive(Clone, Copy, Default)]
pub struct RunningStat {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl RunningStat {
    pub fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
            self.last = value;
            self.sum = value;
            self.count = 1;
            return;
        }
        self.count += 1;
        self.sum += value;
        self.last = value;
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / (self.count as f64)
        }
    }
}

/// Thread-safe wrapper for running statistics.
#[derive(Default)]
pub struct Stat {
    inner: Mutex<RunningStat>,
}

impl Stat {
    pub fn add_sample(&self, value: f64) {
        if let Ok(mut s) = self.inner.lock() {
            s.add(value);
        }
    }

    /// Returns `(last, avg, max, min, count)`.
    pub fn snapshot(&self) -> (f64, f64, f64, f64, u64) {
        if let Ok(s) = self.inner.lock() {
            (s.last, s.avg(), s.max, s.min, s.count)
        } else {
            (0.0, 0.0, 0.0, 0.0, 0)
        }
    }
}

/// Statistics for one collector.
#[derive(Default)]
pub struct CollectorStats {
    pub polls: AtomicU64,
    pub failures: AtomicU64,
    pub metrics_published: Stat,
    pub poll_duration_ms: Stat,
    last_error: StdRwLock<Option<String>>,
    last_success: StdRwLock<Option<DateTime<Utc>>>,
}

impl CollectorStats {
    pub fn record_success(&self, published: usize, duration_ms: f64) {
        self.polls.fetch_add(1, Ordering::Relaxed);
        self.metrics_published.add_sample(published as f64);
        self.poll_duration_ms.add_sample(duration_ms);
        if let Ok(mut guard) = self.last_success.write() {
            *guard = Some(Utc::now());
        }
        if let Ok(mut guard) = self.last_error.write() {
            *guard = None;
        }
    }

    pub fn record_failure(&self, error: &str, duration_ms: f64) {
        self.polls.fetch_add(1, Ordering::Relaxed);
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.poll_duration_ms.add_sample(duration_ms);
        if let Ok(mut guard) = self.last_error.write() {
            *guard = Some(error.to_string());
        }
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().ok()?.clone()
    }

    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        *self.last_success.read().ok()?
    }

    pub fn success_rate(&self) -> f64 {
        let polls = self.polls.load(Ordering::Relaxed);
        let failures = self.failures.load(Ordering::Relaxed);
        if polls == 0 {
            100.0
        } else {
            ((polls - failures) as f64 / polls as f64) * 100.0
        }
    }
}

/// Health statistics for the whole exporter.
pub struct HealthStats {
    collectors: BTreeMap<String, CollectorStats>,
    pub metrics_endpoint_calls: AtomicU64,
    pub start_time: Instant,
}

impl HealthStats {
    /// Creates statistics slots for the given collector names.
    pub fn new<I, S>(collectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            collectors: collectors
                .into_iter()
                .map(|name| (name.into(), CollectorStats::default()))
                .collect(),
            metrics_endpoint_calls: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn collector(&self, name: &str) -> Option<&CollectorStats> {
        self.collectors.get(name)
    }

    pub fn record_metrics_endpoint_call(&self) {
        self.metrics_endpoint_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// True once every collector has completed at least one successful poll.
    pub fn all_collectors_succeeded(&self) -> bool {
        !self.collectors.is_empty() && self.collectors.values().all(|c| c.last_success().is_some())
    }

    pub fn render_table(&self) -> String {
        let left_col = 26usize;
        let col_w = 12usize;

        let mut out = String::new();

        writeln!(out, "HEALTH ENDPOINT - EXPORTER INTERNAL STATS").ok();
        writeln!(out, "==========================================").ok();
        writeln!(out).ok();
        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "",
            "current",
            "average",
            "max",
            "min",
            left = left_col,
            col = col_w
        )
        .ok();

        for (name, stats) in &self.collectors {
            let (pd_cur, pd_avg, pd_max, pd_min, _) = stats.poll_duration_ms.snapshot();
            let (mp_cur, mp_avg, mp_max, mp_min, _) = stats.metrics_published.snapshot();
            let success_rate = stats.success_rate();

            writeln!(out).ok();
            writeln!(out, "COLLECTOR {}", name.to_uppercase()).ok();
            writeln!(out, "{}", "-".repeat(10 + name.len())).ok();

            writeln!(
                out,
                "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
                "poll_duration (ms)",
                format!("{:.2}", pd_cur),
                format!("{:.2}", pd_avg),
                format!("{:.2}", pd_max),
                format!("{:.2}", pd_min),
                left = left_col,
                col = col_w
            )
            .ok();

            writeln!(
                out,
                "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
                "metrics_published",
                format!("{:.0}", mp_cur),
                format!("{:.1}", mp_avg),
                format!("{:.0}", mp_max),
                format!("{:.0}", mp_min),
                left = left_col,
                col = col_w
            )
            .ok();

            writeln!(
                out,
                "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
                "poll_success_rate (%)",
                format!("{:.1}", success_rate),
                format!("{:.1}", success_rate),
                format!("{:.1}", success_rate),
                format!("{:.1}", success_rate),
                left = left_col,
                col = col_w
            )
            .ok();

            writeln!(
                out,
                "{:left$} | {} polls, {} failed",
                "totals",
                stats.polls.load(Ordering::Relaxed),
                stats.failures.load(Ordering::Relaxed),
                left = left_col
            )
            .ok();

            let last_success = stats
                .last_success()
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "N/A".to_string());
            writeln!(out, "{:left$} | {}", "last_success", last_success, left = left_col).ok();

            if let Some(err) = stats.last_error() {
                writeln!(out, "{:left$} | {}", "last_error", err, left = left_col).ok();
            }
        }

        writeln!(out).ok();
        writeln!(
            out,
            "metrics endpoint calls: {}",
            self.metrics_endpoint_calls.load(Ordering::Relaxed)
        )
        .ok();
        out
    }
}
