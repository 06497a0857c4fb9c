//! Once command implementation.
//!
//! Polls every enabled collector a fixed number of times and prints the
//! published metrics. The first ARC poll only establishes the baseline, so
//! its rates cover a nominal one-second interval.

use herakles_zfs_exporter::collectors::create_collectors;
use herakles_zfs_exporter::{poll_once, MemorySink};
use std::time::Duration;

use crate::config::Config;

/// Polls the collectors `iterations` times, `delay_ms` apart.
pub async fn command_once(
    iterations: usize,
    delay_ms: u64,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🧪 Herakles ZFS Exporter - Poll Test");
    println!("====================================");

    let mut collectors = create_collectors(&config.zfs_arc, &config.ioping, config.interval_secs());
    let mut failures = 0usize;

    for iteration in 1..=iterations {
        if iteration > 1 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        println!("\n🔄 Iteration {}/{}:", iteration, iterations);

        for collector in collectors.iter_mut() {
            let sink = MemorySink::new();
            let outcome = poll_once(collector.as_mut(), &sink).await;

            println!(
                "   📊 {} ({:.2}ms)",
                collector.name(),
                outcome.duration.as_secs_f64() * 1000.0
            );
            if let Some(e) = &outcome.error {
                failures += 1;
                println!("   │  ❌ {}", e);
                continue;
            }
            for (name, value) in sink.take() {
                println!("   │  {:40} {:>16.3}", name, value);
            }
        }
    }

    println!();
    if failures == 0 {
        println!("✅ All polls succeeded");
    } else {
        println!("⚠️  {} polls failed", failures);
    }
    Ok(())
}
