//! ioping latency probe.
//!
//! `ioping -q` prints a statistics block ending with a summary line such as
//!
//! ```text
//! min/avg/max/mdev = 243 us / 438 us / 552 us / 92 us
//! ```
//!
//! which is parsed into a [`ProbeSummary`] with all values in microseconds.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::time::Duration;

use crate::derive::DerivedMetricSet;
use crate::error::CollectError;
use crate::watchdog::run_with_timeout;

/// Prefix identifying the summary line in ioping output.
pub const SUMMARY_PREFIX: &str = "min/avg/max/mdev";

static VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([0-9]+(?:\.[0-9]+)?)\s*([a-zµ]*)\s*$").expect("static regex is valid")
});

/// Latency statistics from one probe run, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeSummary {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
    pub mdev: f64,
}

impl ProbeSummary {
    pub fn to_metrics(&self) -> DerivedMetricSet {
        [
            ("min", self.min),
            ("avg", self.avg),
            ("max", self.max),
            ("mdev", self.mdev),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

fn to_micros(value: f64, unit: &str) -> Option<f64> {
    match unit {
        "ns" => Some(value / 1000.0),
        "" | "us" | "µs" => Some(value),
        "ms" => Some(value * 1000.0),
        "s" => Some(value * 1_000_000.0),
        _ => None,
    }
}

/// Parses a single `min/avg/max/mdev = ...` line.
pub fn parse_summary_line(line: &str, line_no: usize) -> Result<ProbeSummary, CollectError> {
    let malformed = || CollectError::MalformedRecord {
        line: line_no,
        content: line.to_string(),
    };

    let values = line
        .strip_prefix(SUMMARY_PREFIX)
        .and_then(|rest| rest.split_once('='))
        .map(|(_, values)| values)
        .ok_or_else(malformed)?;

    let parsed = values
        .split('/')
        .map(|field| {
            let caps = VALUE_RE.captures(field)?;
            let value: f64 = caps[1].parse().ok()?;
            to_micros(value, &caps[2])
        })
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(malformed)?;

    match parsed.as_slice() {
        [min, avg, max, mdev] => Ok(ProbeSummary {
            min: *min,
            avg: *avg,
            max: *max,
            mdev: *mdev,
        }),
        _ => Err(malformed()),
    }
}

/// Finds and parses the first summary line in ioping output.
pub fn parse_probe_output(output: &str) -> Result<ProbeSummary, CollectError> {
    output
        .lines()
        .enumerate()
        .find(|(_, line)| line.starts_with(SUMMARY_PREFIX))
        .map(|(idx, line)| parse_summary_line(line, idx + 1))
        .unwrap_or_else(|| {
            Err(CollectError::MalformedRecord {
                line: 0,
                content: format!("no {} line in probe output", SUMMARY_PREFIX),
            })
        })
}

/// Probe deadline in whole seconds: a third of the poll interval, at least one.
pub fn probe_deadline_secs(interval_secs: u64) -> u64 {
    (interval_secs / 3).max(1)
}

/// One configured ioping invocation.
#[derive(Debug, Clone)]
pub struct IopingProbe {
    pub binary: String,
    pub directory: PathBuf,
    pub deadline_secs: u64,
    pub grace: Duration,
}

impl IopingProbe {
    pub fn new(
        binary: impl Into<String>,
        directory: impl Into<PathBuf>,
        interval_secs: u64,
        grace: Duration,
    ) -> Self {
        Self {
            binary: binary.into(),
            directory: directory.into(),
            deadline_secs: probe_deadline_secs(interval_secs),
            grace,
        }
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "-w".to_string(),
            self.deadline_secs.to_string(),
            "-q".to_string(),
            self.directory.display().to_string(),
        ]
    }

    /// Watchdog applied around the child process.
    pub fn watchdog(&self) -> Duration {
        Duration::from_secs(self.deadline_secs) + self.grace
    }

    pub async fn run(&self) -> Result<ProbeSummary, CollectError> {
        let stdout = run_with_timeout(&self.binary, &self.args(), self.watchdog()).await?;
        parse_probe_output(&stdout)
    }
}
