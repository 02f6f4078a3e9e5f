//! Concurrent logging example
//!
//! Demonstrates many producer threads, backpressure metrics and the
//! process-wide default logger.
//!
//! Run with: cargo run --example async_logging

use rust_leveled_logger::global;
use rust_leveled_logger::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    println!("=== Rust Leveled Logger - Async Logging Example ===\n");

    let log_dir = std::env::temp_dir().join("rust_leveled_logger_async_demo");
    let logger = Arc::new(
        Logger::builder()
            .app_name("workers")
            .log_dir(&log_dir)
            .routing(RoutingPolicy::Separated)
            .buffer_capacity(2048)
            .flush_interval(Duration::from_millis(500))
            .build()?,
    );

    println!("1. Eight producer threads, 10,000 records each:");
    let start = Instant::now();
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for job in 0..10_000 {
                    if job % 1000 == 0 {
                        logger.warnf("worker %d reached job %d", &[worker.into(), job.into()]);
                    } else {
                        logger.infof("worker %d finished job %d", &[worker.into(), job.into()]);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        let _ = handle.join();
    }
    logger.close();

    let metrics = logger.metrics();
    println!("   elapsed:             {:?}", start.elapsed());
    println!("   accepted:            {}", metrics.accepted());
    println!("   routed:              {}", metrics.routed());
    println!("   backpressure events: {}", metrics.backpressure_events());
    println!("   pressure drains:     {}", metrics.pressure_drains());
    println!("   files under:         {}", log_dir.display());

    println!("\n2. Default instance:");
    global::init(Logger::builder().app_name("global").stdout(true))?;
    global::info("logged through the default instance");
    global::errorf("exit code %d", &[3.into()]);
    global::close();

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
