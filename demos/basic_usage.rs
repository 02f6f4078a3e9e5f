//! Basic logger usage example
//!
//! Demonstrates console logging, level sets, templates and Panic recovery.
//!
//! Run with: cargo run --example basic_usage

use rust_leveled_logger::prelude::*;
use rust_leveled_logger::{info, warn};

fn main() -> Result<()> {
    println!("=== Rust Leveled Logger - Basic Usage Example ===\n");

    let logger = Logger::builder().app_name("basic").stdout(true).build()?;

    println!("1. Logging at different levels:");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");
    logger.flush();

    println!("\n2. Templates and macros:");
    logger.infof("user %s logged in from %s", &["alice".into(), "10.0.0.7".into()]);
    logger.warnf("retry %d of %d", &[2.into(), 5.into()]);
    logger.infof("", &["up".into(), 3.into(), 4.into()]);
    info!(logger, "macro with {} arguments", 2);
    warn!(logger, "100% literal, %d is not a verb here");
    logger.flush();

    println!("\n3. Panic records are recovered:");
    logger.panic("cache invariant violated");
    logger.info("still running after the panic record");
    logger.close();

    println!("\n4. Only errors and debug enabled:");
    let picky = Logger::builder()
        .stdout(true)
        .levels(LogLevel::Error | LogLevel::Debug)
        .build()?;
    picky.debug("Debug message (visible)");
    picky.info("Info message (hidden)");
    picky.warn("Warning message (hidden)");
    picky.error("Error message (visible)");
    picky.close();

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
