//! Check command implementation.
//!
//! Validates collector sources and configuration.

use herakles_zfs_exporter::probe::probe_deadline_secs;

use crate::config::{validate_effective_config, Config};
use crate::startup_checks::validate_requirements;

/// Validates the configuration and the enabled collectors' sources.
pub fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Herakles ZFS Exporter - System Check");
    println!("=======================================");

    let mut all_ok = true;

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📁 Checking collector sources...");
    if config.zfs_arc.enabled {
        println!(
            "   ℹ️  zfs_arc reads {}",
            config.zfs_arc.kstat_path.display()
        );
    }
    if config.ioping.enabled {
        println!(
            "   ℹ️  ioping probes {} with a {}s deadline",
            config.ioping.directory.display(),
            probe_deadline_secs(config.interval_secs())
        );
    }
    match validate_requirements(config) {
        Ok(_) => println!("   ✅ Collector sources usable"),
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}
