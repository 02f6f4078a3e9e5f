//! Logger configuration snapshot and routing policy
//!
//! A [`LoggerConfig`] is assembled once (usually through
//! [`LoggerBuilder`](crate::LoggerBuilder)), normalized, and then owned by the
//! logger for its whole life. Nothing is reconfigurable after start.

use super::log_level::{LevelSet, LogLevel};
use crate::sinks::rotating_file::{RetentionPolicy, RotationTrigger};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MIN_BUFFER_CAPACITY: usize = 1024;
pub const MAX_BUFFER_CAPACITY: usize = 1_024_000;
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

pub const MIN_FLUSH_INTERVAL: Duration = Duration::from_millis(500);
pub const MAX_FLUSH_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

pub const MIN_SINK_QUEUE_CAPACITY: usize = 1;
pub const MAX_SINK_QUEUE_CAPACITY: usize = 1_024_000;
pub const DEFAULT_SINK_QUEUE_CAPACITY: usize = 1024;

/// Sink key of the console mirror.
pub const STDOUT_KEY: &str = "stdout";
/// Sink key of the stream receiving every level.
pub const MERGED_KEY: &str = "merged";

/// Which file stream(s) a record is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoutingPolicy {
    /// Every level goes to one stream at the root of the log directory
    #[default]
    Merged,
    /// Each enabled level goes to its own subdirectory
    Separated,
    /// Level subdirectory and the merged stream
    Both,
}

/// Up to two sink keys a record is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Targets([Option<&'static str>; 2]);

impl Targets {
    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().flatten().copied()
    }

    pub fn len(&self) -> usize {
        self.0.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RoutingPolicy {
    /// File sink keys for a record at `level`.
    pub fn targets(&self, level: LogLevel) -> Targets {
        match self {
            RoutingPolicy::Merged => Targets([Some(MERGED_KEY), None]),
            RoutingPolicy::Separated => Targets([Some(level.dir_name()), None]),
            RoutingPolicy::Both => Targets([Some(level.dir_name()), Some(MERGED_KEY)]),
        }
    }

    /// File streams to open: `None` is the merged stream, `Some(level)` a level stream.
    pub fn streams(&self, levels: LevelSet) -> Vec<Option<LogLevel>> {
        let per_level = levels.iter().map(Some);
        match self {
            RoutingPolicy::Merged => vec![None],
            RoutingPolicy::Separated => per_level.collect(),
            RoutingPolicy::Both => std::iter::once(None).chain(per_level).collect(),
        }
    }
}

/// Immutable option set consumed by the dispatcher at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Application tag written in front of every line; empty omits the tag
    pub app_name: String,
    /// Mirror every record to standard output
    pub stdout: bool,
    pub routing: RoutingPolicy,
    pub rotation: RotationTrigger,
    pub retention: RetentionPolicy,
    /// Dispatcher queue length
    pub buffer_capacity: usize,
    /// Period of the dispatcher drain loop
    pub flush_interval: Duration,
    pub levels: LevelSet,
    /// Base directory of the log files; `None` disables file output
    pub log_dir: Option<PathBuf>,
    /// Queue length of every individual sink
    pub sink_queue_capacity: usize,
    /// Terminate the process after a Fatal record has been flushed
    pub exit_on_fatal: bool,
    /// Color console lines by level
    pub console_colors: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            stdout: false,
            routing: RoutingPolicy::default(),
            rotation: RotationTrigger::default(),
            retention: RetentionPolicy::default(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            levels: LevelSet::all(),
            log_dir: None,
            sink_queue_capacity: DEFAULT_SINK_QUEUE_CAPACITY,
            exit_on_fatal: true,
            console_colors: true,
        }
    }
}

impl LoggerConfig {
    /// Clamp bounded values and replace invalid ones with defaults.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.buffer_capacity = clamp_buffer_capacity(self.buffer_capacity);
        self.flush_interval = clamp_flush_interval(self.flush_interval);
        self.sink_queue_capacity = self
            .sink_queue_capacity
            .clamp(MIN_SINK_QUEUE_CAPACITY, MAX_SINK_QUEUE_CAPACITY);
        if !self.rotation.is_valid() {
            self.rotation = RotationTrigger::default();
        }
        if self
            .log_dir
            .as_ref()
            .is_some_and(|dir| dir.as_os_str().is_empty())
        {
            self.log_dir = None;
        }
        self
    }

    /// Base directory when file output is enabled.
    pub fn file_output(&self) -> Option<&Path> {
        self.log_dir.as_deref().filter(|dir| !dir.as_os_str().is_empty())
    }

    /// At least one of stdout or file output is configured.
    pub fn has_destination(&self) -> bool {
        self.stdout || self.file_output().is_some()
    }
}

pub fn clamp_buffer_capacity(capacity: usize) -> usize {
    capacity.clamp(MIN_BUFFER_CAPACITY, MAX_BUFFER_CAPACITY)
}

pub fn clamp_flush_interval(interval: Duration) -> Duration {
    interval.clamp(MIN_FLUSH_INTERVAL, MAX_FLUSH_INTERVAL)
}
