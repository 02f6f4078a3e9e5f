//! # Rust Leveled Logger
//!
//! A leveled, asynchronous logging library. Callers emit panic, fatal, error,
//! warn, info and debug records; the library formats them on the calling
//! thread, buffers them in a bounded queue and writes them from background
//! threads to the console and to rotating files.
//!
//! ## Features
//!
//! - **Level sets**: any subset of levels can be enabled, not just a threshold
//! - **Routing**: one merged file, one file per level, or both
//! - **Rotation**: by size or by fixed period, with age/count retention
//! - **Backpressure**: full queues block producers instead of dropping records
//! - **Drain on close**: every accepted record is written before `close` returns
//!
//! ```no_run
//! use rust_leveled_logger::prelude::*;
//!
//! let logger = Logger::builder()
//!     .app_name("orders")
//!     .stdout(true)
//!     .log_dir("logs")
//!     .routing(RoutingPolicy::Both)
//!     .build()?;
//!
//! logger.info("started");
//! logger.errorf("order %d rejected: %s", &[42.into(), "no stock".into()]);
//! logger.close();
//! # Ok::<(), LoggerError>(())
//! ```

pub mod core;
pub mod global;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        LevelSet, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics,
        Result, RoutingPolicy, Value,
    };
    pub use crate::sinks::{RetentionPolicy, RotationTrigger};
}

pub use crate::core::{
    format_message, CallSite, CallerLocator, LevelSet, Line, LineFormatter, LogLevel, LogRecord,
    Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, RecordPool, Result,
    RoutingPolicy, Sink, TrackCallerLocator, Value, CALLER_FRAME_DEPTH,
};
pub use crate::sinks::{ConsoleSink, FileSink, RetentionPolicy, RotationTrigger, SinkRegistry};
