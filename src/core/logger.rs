//! Main logger implementation
//!
//! The [`Logger`] is the dispatcher of the pipeline. Caller threads format a
//! [`LogRecord`] and push it onto a bounded queue; one background thread
//! drains that queue on every flush interval (or as soon as it is ~90% full)
//! and routes each record to its sinks through the [`SinkRegistry`].

use super::{
    config::{
        clamp_buffer_capacity, clamp_flush_interval, LoggerConfig, RoutingPolicy, MERGED_KEY,
        STDOUT_KEY,
    },
    error::{LoggerError, Result},
    formatter::{format_message, CallerLocator, LineFormatter, TrackCallerLocator, Value},
    log_level::{LevelSet, LogLevel},
    log_record::{LogRecord, RecordPool},
    metrics::LoggerMetrics,
    sink::Line,
};
use crate::sinks::{ConsoleSink, FileSink, RetentionPolicy, RotationTrigger, SinkRegistry};
use crossbeam_channel::{bounded, select, tick, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use std::backtrace::Backtrace;
use std::fmt::Display;
use std::io::{self, Write};
use std::panic::{self, Location};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Fraction of the dispatcher queue (in percent) that wakes the drain loop early.
pub const HIGH_WATER_PERCENT: usize = 90;

/// State shared between caller threads and the drain thread.
struct Shared {
    registry: RwLock<SinkRegistry>,
    pool: RecordPool,
    metrics: LoggerMetrics,
    routing: RoutingPolicy,
    stdout: bool,
    file_output: bool,
}

impl Shared {
    /// Route up to the current queue length, so producers cannot starve the loop.
    fn drain(&self, receiver: &Receiver<LogRecord>) {
        for _ in 0..receiver.len() {
            match receiver.try_recv() {
                Ok(record) => self.route(record),
                Err(_) => break,
            }
        }
    }

    fn route(&self, record: LogRecord) {
        let level = record.level();
        let line: Line = Arc::from(record.text());
        let registry = self.registry.read();
        let mut delivered = false;

        if self.stdout {
            delivered |= self.deliver(&registry, STDOUT_KEY, level, &line);
        }
        if self.file_output {
            for key in self.routing.targets(level).iter() {
                delivered |= self.deliver(&registry, key, level, &line);
            }
        }
        drop(registry);

        if delivered {
            self.metrics.record_routed();
        }
        self.pool.release(record);
    }

    fn deliver(&self, registry: &SinkRegistry, key: &str, level: LogLevel, line: &Line) -> bool {
        match registry.write(key, level, Line::clone(line)) {
            Ok(_) => true,
            Err(e) => {
                self.metrics.record_write_failure();
                eprintln!("[LOGGER ERROR] Failed to route record to '{}': {}", key, e);
                false
            }
        }
    }
}

/// Leveled asynchronous logger.
///
/// Every logging method is fire-and-forget: it never returns an error and
/// only blocks while the dispatcher queue is full.
///
/// # Example
///
/// ```no_run
/// use rust_leveled_logger::{Logger, RoutingPolicy};
///
/// let logger = Logger::builder()
///     .app_name("billing")
///     .log_dir("/var/log/billing")
///     .routing(RoutingPolicy::Both)
///     .build()
///     .unwrap();
///
/// logger.info("service started");
/// logger.warnf("retrying %s in %d ms", &["upstream".into(), 250.into()]);
/// logger.close();
/// ```
pub struct Logger {
    config: LoggerConfig,
    formatter: LineFormatter,
    locator: Arc<dyn CallerLocator>,
    closed: AtomicBool,
    /// Producers hold the read side while sending; `close` takes the sender under the write side.
    sender: RwLock<Option<Sender<LogRecord>>>,
    high_water: usize,
    wake: Sender<()>,
    flush_requests: Sender<Sender<()>>,
    shutdown: Mutex<Option<Sender<()>>>,
    drain_handle: Mutex<Option<thread::JoinHandle<()>>>,
    /// Held for the whole shutdown; later `close` callers wait on it.
    closing: Mutex<()>,
    shared: Arc<Shared>,
}

impl Logger {
    /// Create a builder with default configuration
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Build a logger from a configuration snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::NoDestination`] when neither stdout nor a log
    /// directory is configured, or the error of the first sink that fails to open.
    pub fn from_config(config: LoggerConfig) -> Result<Self> {
        LoggerBuilder::from_config(config).build()
    }

    fn start(
        config: LoggerConfig,
        registry: SinkRegistry,
        locator: Arc<dyn CallerLocator>,
    ) -> Result<Self> {
        let capacity = config.buffer_capacity;
        let (sender, receiver) = bounded(capacity);
        let (wake_tx, wake_rx) = bounded(1);
        let (flush_tx, flush_rx) = crossbeam_channel::unbounded();
        let (shutdown_tx, shutdown_rx) = bounded(0);

        let shared = Arc::new(Shared {
            registry: RwLock::new(registry),
            pool: RecordPool::new(capacity),
            metrics: LoggerMetrics::new(),
            routing: config.routing,
            stdout: config.stdout,
            file_output: config.file_output().is_some(),
        });

        let worker_shared = Arc::clone(&shared);
        let interval = config.flush_interval;
        let handle = thread::Builder::new()
            .name("log-dispatcher".to_string())
            .spawn(move || {
                run_drain_loop(
                    &worker_shared,
                    &receiver,
                    &wake_rx,
                    &flush_rx,
                    &shutdown_rx,
                    interval,
                )
            })
            .map_err(|e| {
                LoggerError::io_operation("spawning dispatcher", "Failed to start drain thread", e)
            })?;

        Ok(Self {
            formatter: LineFormatter::new(config.app_name.clone()),
            config,
            locator,
            closed: AtomicBool::new(false),
            sender: RwLock::new(Some(sender)),
            high_water: (capacity * HIGH_WATER_PERCENT / 100).max(1),
            wake: wake_tx,
            flush_requests: flush_tx,
            shutdown: Mutex::new(Some(shutdown_tx)),
            drain_handle: Mutex::new(Some(handle)),
            closing: Mutex::new(()),
            shared,
        })
    }

    /// Configuration the logger was built with (after normalization)
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use rust_leveled_logger::Logger;
    ///
    /// let logger = Logger::builder().stdout(true).build().unwrap();
    /// logger.info("ready");
    /// logger.close();
    ///
    /// let metrics = logger.metrics();
    /// assert_eq!(metrics.accepted(), 1);
    /// assert_eq!(metrics.routed(), 1);
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.config.levels.is_enabled(level)
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Log `template` formatted against `args` at `level`.
    ///
    /// Fatal and Panic records carry their post-actions; see [`Logger::fatal`]
    /// and [`Logger::panic`].
    #[track_caller]
    pub fn log(&self, level: LogLevel, template: &str, args: &[Value]) {
        let origin = Location::caller();
        let message = || format_message(template, args);
        match level {
            LogLevel::Panic => self.panic_with(origin, message),
            LogLevel::Fatal => self.fatal_with(origin, message),
            _ => {
                self.dispatch(level, origin, message);
            }
        }
    }

    /// Log at Panic level, then raise and recover a panic carrying `message`.
    ///
    /// The recovered panic is logged as a second Panic record with a backtrace;
    /// the call then returns normally. Builds with `panic = "abort"` cannot
    /// recover and terminate instead.
    #[track_caller]
    pub fn panic(&self, message: impl Display) {
        self.panic_with(Location::caller(), || message.to_string());
    }

    #[track_caller]
    pub fn panicf(&self, template: &str, args: &[Value]) {
        self.panic_with(Location::caller(), || format_message(template, args));
    }

    /// Log at Fatal level, close the logger and exit the process with status 1.
    ///
    /// With `exit_on_fatal(false)` the logger is closed but the process keeps running.
    #[track_caller]
    pub fn fatal(&self, message: impl Display) {
        self.fatal_with(Location::caller(), || message.to_string());
    }

    #[track_caller]
    pub fn fatalf(&self, template: &str, args: &[Value]) {
        self.fatal_with(Location::caller(), || format_message(template, args));
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, message: impl Display) {
        self.dispatch(LogLevel::Error, Location::caller(), || message.to_string());
    }

    #[inline]
    #[track_caller]
    pub fn errorf(&self, template: &str, args: &[Value]) {
        self.dispatch(LogLevel::Error, Location::caller(), || {
            format_message(template, args)
        });
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, message: impl Display) {
        self.dispatch(LogLevel::Warn, Location::caller(), || message.to_string());
    }

    #[inline]
    #[track_caller]
    pub fn warnf(&self, template: &str, args: &[Value]) {
        self.dispatch(LogLevel::Warn, Location::caller(), || {
            format_message(template, args)
        });
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, message: impl Display) {
        self.dispatch(LogLevel::Info, Location::caller(), || message.to_string());
    }

    #[inline]
    #[track_caller]
    pub fn infof(&self, template: &str, args: &[Value]) {
        self.dispatch(LogLevel::Info, Location::caller(), || {
            format_message(template, args)
        });
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: impl Display) {
        self.dispatch(LogLevel::Debug, Location::caller(), || message.to_string());
    }

    #[inline]
    #[track_caller]
    pub fn debugf(&self, template: &str, args: &[Value]) {
        self.dispatch(LogLevel::Debug, Location::caller(), || {
            format_message(template, args)
        });
    }

    /// Route everything queued so far into the sink queues and wait for it.
    ///
    /// No-op once the logger is closed.
    pub fn flush(&self) {
        if self.is_closed() {
            return;
        }
        let (ack_tx, ack_rx) = bounded(1);
        if self.flush_requests.send(ack_tx).is_ok() {
            // Err means the drain thread is gone; nothing left to wait for
            let _ = ack_rx.recv();
        }
    }

    /// Stop accepting records, drain the queue, stop every sink.
    ///
    /// Every record accepted before `close` is written exactly once before
    /// this returns. A concurrent caller blocks until that shutdown is done;
    /// calls after it are no-ops.
    pub fn close(&self) {
        let _closing = self.closing.lock();
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        // waits for producers still inside a send
        drop(self.sender.write().take());
        drop(self.shutdown.lock().take());

        if let Some(handle) = self.drain_handle.lock().take() {
            if let Err(e) = handle.join() {
                eprintln!("[LOGGER ERROR] Drain thread panicked during shutdown: {:?}", e);
            }
        }

        self.shared.registry.write().stop();

        let failures = self.shared.metrics.write_failures();
        if failures > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} failed sink writes",
                failures
            );
        }
    }

    /// Returns `true` when the record passed the closed and level checks.
    fn dispatch<F>(&self, level: LogLevel, origin: &'static Location<'static>, message: F) -> bool
    where
        F: FnOnce() -> String,
    {
        if self.is_closed() || !self.is_enabled(level) {
            return false;
        }

        let Some(site) = self.locator.locate(origin) else {
            self.shared.metrics.record_dropped();
            return true;
        };

        let message = message();
        let mut record = self.shared.pool.acquire(level);
        let created_at = record.created_at();
        self.formatter
            .write_line(record.text_mut(), level, &created_at, &site, &message);
        self.enqueue(record);
        true
    }

    fn enqueue(&self, record: LogRecord) {
        let guard = self.sender.read();
        let Some(sender) = guard.as_ref() else {
            self.shared.pool.release(record);
            return;
        };

        self.shared.metrics.record_accepted();
        match sender.try_send(record) {
            Ok(()) => {
                if sender.len() >= self.high_water {
                    let _ = self.wake.try_send(());
                }
            }
            Err(TrySendError::Full(record)) => {
                self.shared.metrics.record_backpressure();
                let _ = self.wake.try_send(());
                if let Err(e) = sender.send(record) {
                    self.shared.pool.release(e.into_inner());
                }
            }
            Err(TrySendError::Disconnected(record)) => {
                self.shared.pool.release(record);
            }
        }
    }

    fn fatal_with<F>(&self, origin: &'static Location<'static>, message: F)
    where
        F: FnOnce() -> String,
    {
        if !self.dispatch(LogLevel::Fatal, origin, message) {
            return;
        }
        self.close();
        if self.config.exit_on_fatal {
            std::process::exit(1);
        }
    }

    fn panic_with<F>(&self, origin: &'static Location<'static>, message: F)
    where
        F: FnOnce() -> String,
    {
        if self.is_closed() || !self.is_enabled(LogLevel::Panic) {
            return;
        }
        let message = message();
        if !self.dispatch(LogLevel::Panic, origin, || message.clone()) {
            return;
        }

        let outcome: thread::Result<()> =
            panic::catch_unwind(move || panic::resume_unwind(Box::new(message)));
        if let Err(payload) = outcome {
            let recovered = if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = payload.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Unknown panic".to_string()
            };
            let trace = Backtrace::force_capture();
            self.dispatch(LogLevel::Panic, origin, || {
                format!("panic recovered: {}\n{}", recovered, trace.to_string().trim_end())
            });
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.close();
    }
}

fn run_drain_loop(
    shared: &Shared,
    receiver: &Receiver<LogRecord>,
    wake: &Receiver<()>,
    flush_requests: &Receiver<Sender<()>>,
    shutdown: &Receiver<()>,
    interval: Duration,
) {
    let ticker = tick(interval);

    loop {
        select! {
            recv(shutdown) -> _ => break,
            recv(ticker) -> _ => shared.drain(receiver),
            recv(wake) -> _ => {
                shared.metrics.record_pressure_drain();
                shared.drain(receiver);
            }
            recv(flush_requests) -> request => {
                shared.drain(receiver);
                if let Ok(ack) = request {
                    let _ = ack.send(());
                }
            }
        }
    }

    // every sender is gone by now
    while let Ok(record) = receiver.try_recv() {
        shared.route(record);
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```no_run
/// use rust_leveled_logger::prelude::*;
/// use std::time::Duration;
///
/// let logger = Logger::builder()
///     .app_name("api")
///     .stdout(true)
///     .log_dir("logs")
///     .routing(RoutingPolicy::Separated)
///     .levels(LevelSet::at_least(LogLevel::Info))
///     .rotation(RotationTrigger::size(64 * 1024 * 1024))
///     .retention(RetentionPolicy::new(Duration::from_secs(7 * 24 * 3600), 50))
///     .build()
///     .unwrap();
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    locator: Arc<dyn CallerLocator>,
    console_writer: Option<Box<dyn Write + Send>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::from_config(LoggerConfig::default())
    }

    /// Start from an existing configuration snapshot
    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            config,
            locator: Arc::new(TrackCallerLocator),
            console_writer: None,
        }
    }

    /// Application tag of every line. An empty name is ignored.
    #[must_use = "builder methods return a new value"]
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.is_empty() {
            self.config.app_name = name;
        }
        self
    }

    /// Mirror records to standard output
    #[must_use = "builder methods return a new value"]
    pub fn stdout(mut self, enabled: bool) -> Self {
        self.config.stdout = enabled;
        self
    }

    /// Mirror records to `writer` instead of standard output
    ///
    /// Enables the console sink; colors still follow [`LoggerBuilder::console_colors`].
    #[must_use = "builder methods return a new value"]
    pub fn console_writer<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.config.stdout = true;
        self.console_writer = Some(Box::new(writer));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn routing(mut self, routing: RoutingPolicy) -> Self {
        self.config.routing = routing;
        self
    }

    /// Rotation trigger. A zero size or zero period is ignored.
    #[must_use = "builder methods return a new value"]
    pub fn rotation(mut self, trigger: RotationTrigger) -> Self {
        if trigger.is_valid() {
            self.config.rotation = trigger;
        }
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn retention(mut self, retention: RetentionPolicy) -> Self {
        self.config.retention = retention;
        self
    }

    /// Dispatcher queue length, clamped into the supported range
    #[must_use = "builder methods return a new value"]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = clamp_buffer_capacity(capacity);
        self
    }

    /// Drain period, clamped into the supported range
    #[must_use = "builder methods return a new value"]
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval = clamp_flush_interval(interval);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn levels(mut self, levels: impl Into<LevelSet>) -> Self {
        self.config.levels = levels.into();
        self
    }

    /// Enable file output under `dir`. An empty path keeps file output disabled.
    #[must_use = "builder methods return a new value"]
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.config.log_dir = (!dir.as_os_str().is_empty()).then_some(dir);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sink_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.sink_queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn exit_on_fatal(mut self, exit: bool) -> Self {
        self.config.exit_on_fatal = exit;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn console_colors(mut self, enabled: bool) -> Self {
        self.config.console_colors = enabled;
        self
    }

    /// Replace the call-site resolver
    #[must_use = "builder methods return a new value"]
    pub fn caller_locator(mut self, locator: Arc<dyn CallerLocator>) -> Self {
        self.locator = locator;
        self
    }

    /// Open every sink and start the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::NoDestination`] before anything is created when
    /// neither stdout nor a log directory is configured, or when routing and
    /// levels leave no stream to open.
    pub fn build(self) -> Result<Logger> {
        let config = self.config.normalized();
        if !config.has_destination() {
            return Err(LoggerError::NoDestination);
        }
        if let Some(base) = config.file_output() {
            if base.exists() && !base.is_dir() {
                return Err(LoggerError::config(
                    "log_dir",
                    format!("'{}' is not a directory", base.display()),
                ));
            }
        }

        let mut registry = SinkRegistry::new();
        if config.stdout {
            let console = match self.console_writer {
                Some(writer) => ConsoleSink::with_writer(writer, config.sink_queue_capacity),
                None => ConsoleSink::with_writer(io::stdout(), config.sink_queue_capacity),
            };
            registry.add_sink(Box::new(console.with_colors(config.console_colors)))?;
        }

        if let Some(base) = config.file_output() {
            for stream in config.routing.streams(config.levels) {
                let (key, dir) = match stream {
                    None => (MERGED_KEY, base.to_path_buf()),
                    Some(level) => (level.dir_name(), base.join(level.dir_name())),
                };
                let sink = FileSink::open(
                    key,
                    dir,
                    config.rotation,
                    config.retention,
                    config.sink_queue_capacity,
                )?;
                registry.add_sink(Box::new(sink))?;
            }
        }

        if registry.count() == 0 {
            return Err(LoggerError::NoDestination);
        }

        registry.start()?;
        Logger::start(config, registry, self.locator)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
