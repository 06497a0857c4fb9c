//! Bounded subprocess execution.
//!
//! External tools are spawned with `kill_on_drop` and awaited under
//! `tokio::time::timeout`, so a hung child is killed instead of stalling the poll.

use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

use crate::error::CollectError;

/// Runs `program` with `args` and returns its standard output.
///
/// A non-zero exit status is reported as `SourceUnavailable`, an expired
/// watchdog as `ProbeTimeout`.
pub async fn run_with_timeout(
    program: &str,
    args: &[String],
    timeout: Duration,
) -> Result<String, CollectError> {
    let start = Instant::now();

    let result = tokio::time::timeout(
        timeout,
        Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output(),
    )
    .await;

    let output = match result {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return Err(CollectError::unavailable(program, e)),
        Err(_) => {
            return Err(CollectError::ProbeTimeout {
                program: program.to_string(),
                timeout,
            })
        }
    };

    debug!(
        "{} exited with {} after {:.1}ms",
        program,
        output.status,
        start.elapsed().as_secs_f64() * 1000.0
    );

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CollectError::unavailable(
            program,
            format!("{}: {}", output.status, stderr.trim()),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
