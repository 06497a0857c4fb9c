//! Error types shared by all collectors.
//!
//! Every failure a poll can run into is a [`CollectError`]. None of them are
//! fatal: the poll loop logs the error and publishes nothing for that poll.

use std::time::Duration;

/// Errors raised while reading a counter source, running a probe or deriving metrics.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// The backing file or command could not be read.
    #[error("source {source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// A data line did not have the expected shape.
    #[error("malformed record at line {line}: {content:?}")]
    MalformedRecord { line: usize, content: String },

    /// The external probe did not finish within its watchdog.
    #[error("{program} did not finish within {timeout:?}")]
    ProbeTimeout { program: String, timeout: Duration },

    /// A counter needed by a derived metric is not in the snapshot.
    #[error("counter {0:?} missing from snapshot")]
    MissingCounter(String),
}

impl CollectError {
    pub fn unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        CollectError::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Short label used for poll statistics.
    pub fn kind(&self) -> &'static str {
        match self {
            CollectError::SourceUnavailable { .. } => "source_unavailable",
            CollectError::MalformedRecord { .. } => "malformed_record",
            CollectError::ProbeTimeout { .. } => "probe_timeout",
            CollectError::MissingCounter(_) => "missing_counter",
        }
    }
}
