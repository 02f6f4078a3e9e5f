//! File sink implementation

use super::rotating_file::{RetentionPolicy, RotatingFile, RotationTrigger};
use super::worker::{Consumer, SinkMessage, SinkQueue};
use crate::core::{LogLevel, Line, Result, Sink};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How often the worker checks period rotation and sweeps retention while idle.
pub const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(30);

/// Writes one stream into a [`RotatingFile`] from its own thread.
///
/// # Examples
///
/// ```no_run
/// use rust_leveled_logger::sinks::{FileSink, RetentionPolicy, RotationTrigger};
/// use rust_leveled_logger::Sink;
/// use std::time::Duration;
///
/// let mut sink = FileSink::open(
///     "errors",
///     "/var/log/app/errors",
///     RotationTrigger::size(10 * 1024 * 1024),
///     RetentionPolicy::new(Duration::from_secs(7 * 24 * 3600), 20),
///     1024,
/// )
/// .unwrap();
/// sink.start().unwrap();
/// ```
pub struct FileSink {
    dir: PathBuf,
    queue: SinkQueue<FileConsumer>,
}

impl FileSink {
    /// Open the pending file in `dir` and prepare (but not start) the worker.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or pending file cannot be created
    pub fn open<P: AsRef<Path>>(
        name: impl Into<String>,
        dir: P,
        trigger: RotationTrigger,
        retention: RetentionPolicy,
        capacity: usize,
    ) -> Result<Self> {
        let file = RotatingFile::open(dir.as_ref(), trigger)?;
        let dir = file.dir().to_path_buf();
        let consumer = FileConsumer {
            file,
            retention,
            maintenance: MAINTENANCE_INTERVAL,
        };

        Ok(Self {
            dir,
            queue: SinkQueue::new(name, capacity, consumer),
        })
    }

    /// Override the maintenance tick. Only effective before [`Sink::start`].
    #[must_use]
    pub fn with_maintenance_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.queue.configure(|consumer| consumer.maintenance = interval);
        }
        self
    }

    /// Directory of this stream.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        self.queue.name()
    }

    fn start(&mut self) -> Result<()> {
        self.queue.start()
    }

    fn write(&self, level: LogLevel, line: Line) -> Result<usize> {
        self.queue.write(level, line)
    }

    fn stop(&mut self) {
        self.queue.stop();
    }
}

struct FileConsumer {
    file: RotatingFile,
    retention: RetentionPolicy,
    maintenance: Duration,
}

impl FileConsumer {
    fn rotate(&mut self) {
        match self.file.rotate() {
            Ok(_) => self.sweep(),
            Err(e) => eprintln!("[LOGGER WARNING] Log rotation failed: {}. Continuing with current file.", e),
        }
    }

    fn sweep(&mut self) {
        if !self.retention.is_enabled() {
            return;
        }
        if let Err(e) = self.file.sweep_retention(&self.retention) {
            eprintln!("[LOGGER WARNING] Retention sweep failed: {}", e);
        }
    }
}

impl Consumer for FileConsumer {
    fn consume(&mut self, message: SinkMessage) {
        if let Err(e) = self.file.write(message.line.as_bytes()) {
            eprintln!("[LOGGER ERROR] {}", e);
        }
        if self.file.should_rotate() {
            self.rotate();
        }
    }

    fn idle(&mut self) {
        if let Err(e) = self.file.flush() {
            eprintln!("[LOGGER ERROR] {}", e);
        }
    }

    fn tick(&mut self) {
        if self.file.should_rotate() {
            self.rotate();
        } else {
            self.sweep();
        }
    }

    fn tick_interval(&self) -> Option<Duration> {
        let periodic = matches!(self.file.trigger(), RotationTrigger::Period { .. });
        (periodic || self.retention.is_enabled()).then_some(self.maintenance)
    }

    fn finish(&mut self) {
        if self.file.should_rotate() {
            self.rotate();
        }
        if let Err(e) = self.file.close() {
            eprintln!("[LOGGER ERROR] Failed to close {}: {}", self.file.pending_path().display(), e);
        }
    }
}
