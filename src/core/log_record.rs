//! Log record and the record pool

use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use parking_lot::Mutex;

/// One formatted log line on its way from a caller to the sinks.
///
/// A record is filled on the caller thread, handed to the dispatcher queue,
/// routed by the drain loop and then returned to the [`RecordPool`].
#[derive(Debug, Clone)]
pub struct LogRecord {
    level: LogLevel,
    text: String,
    created_at: DateTime<Local>,
}

impl LogRecord {
    pub fn new(level: LogLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            created_at: Local::now(),
        }
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// The complete line, including the trailing newline.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    pub(crate) fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    fn reset(&mut self) {
        self.level = LogLevel::Debug;
        self.text.clear();
    }
}

/// Buffers above this capacity are not kept by the pool.
const MAX_POOLED_TEXT_CAPACITY: usize = 16 * 1024;

/// Upper bound on idle records, whatever the requested size.
pub const MAX_IDLE_RECORDS: usize = 1024;

/// Free list of reset records to avoid a fresh allocation per call.
#[derive(Debug)]
pub struct RecordPool {
    free: Mutex<Vec<LogRecord>>,
    max_idle: usize,
}

impl RecordPool {
    /// Pool keeping at most `max_idle` records, capped at [`MAX_IDLE_RECORDS`].
    pub fn new(max_idle: usize) -> Self {
        let max_idle = max_idle.min(MAX_IDLE_RECORDS);
        Self {
            free: Mutex::new(Vec::with_capacity(max_idle)),
            max_idle,
        }
    }

    /// Take a record stamped with `level` and the current time; its text is empty.
    pub fn acquire(&self, level: LogLevel) -> LogRecord {
        let mut record = self
            .free
            .lock()
            .pop()
            .unwrap_or_else(|| LogRecord::new(LogLevel::Debug, String::with_capacity(256)));
        record.level = level;
        record.created_at = Local::now();
        record
    }

    pub fn release(&self, mut record: LogRecord) {
        if record.text.capacity() > MAX_POOLED_TEXT_CAPACITY {
            return;
        }
        record.reset();
        let mut free = self.free.lock();
        if free.len() < self.max_idle {
            free.push(record);
        }
    }

    /// Number of idle records currently held.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }
}

impl Default for RecordPool {
    fn default() -> Self {
        Self::new(MAX_IDLE_RECORDS)
    }
}
