//! Core logger types and traits

pub mod config;
pub mod error;
pub mod formatter;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod sink;

pub use config::{LoggerConfig, RoutingPolicy, Targets, MERGED_KEY, STDOUT_KEY};
pub use error::{LoggerError, Result};
pub use formatter::{
    format_message, CallSite, CallerLocator, LineFormatter, TrackCallerLocator, Value,
    CALLER_FRAME_DEPTH, TIMESTAMP_FORMAT,
};
pub use log_level::{LevelSet, LogLevel};
pub use log_record::{LogRecord, RecordPool};
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use sink::{Line, Sink};
