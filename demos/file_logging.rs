//! File logging example
//!
//! Demonstrates per-level routing, size rotation and retention.
//!
//! Run with: cargo run --example file_logging

use rust_leveled_logger::prelude::*;
use std::fs;
use std::path::Path;
use std::time::Duration;

fn list(dir: &Path, depth: usize) -> std::io::Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let path = entry.path();
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        println!(
            "{}{} ({} bytes)",
            "  ".repeat(depth),
            entry.file_name().to_string_lossy(),
            size
        );
        if path.is_dir() {
            list(&path, depth + 1)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    println!("=== Rust Leveled Logger - File Logging Example ===\n");

    let log_dir = std::env::temp_dir().join("rust_leveled_logger_demo");
    let _ = fs::remove_dir_all(&log_dir);

    let logger = Logger::builder()
        .app_name("files")
        .log_dir(&log_dir)
        .routing(RoutingPolicy::Both)
        .levels(LevelSet::at_least(LogLevel::Info))
        .rotation(RotationTrigger::size(4 * 1024))
        .retention(RetentionPolicy::new(Duration::from_secs(3600), 3))
        .build()?;

    for i in 0..200 {
        logger.infof("order %d accepted", &[i.into()]);
        if i % 20 == 0 {
            logger.warnf("order %d is slow", &[i.into()]);
        }
    }
    logger.error("payment gateway unreachable");
    logger.debug("not written: Debug is disabled");
    logger.close();

    println!("Log directory: {}\n", log_dir.display());
    list(&log_dir, 0)?;

    let metrics = logger.metrics();
    println!(
        "\naccepted={} routed={} write_failures={}",
        metrics.accepted(),
        metrics.routed(),
        metrics.write_failures()
    );

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
