//! Sink trait for log output destinations

use super::{error::Result, log_level::LogLevel};
use std::sync::Arc;

/// A formatted line shared by every sink it is routed to.
pub type Line = Arc<str>;

/// One write destination with its own background consumer.
///
/// `write` only enqueues; it blocks while the sink's bounded queue is full.
/// After `stop` returns, `write` is a no-op returning `Ok(0)`.
pub trait Sink: Send + Sync {
    /// Registry key of this sink (compared case-insensitively).
    fn name(&self) -> &str;

    /// Spawn the background consumer.
    fn start(&mut self) -> Result<()>;

    /// Queue `line` and return its length in bytes.
    fn write(&self, level: LogLevel, line: Line) -> Result<usize>;

    /// Stop accepting lines, write everything already queued, release resources.
    fn stop(&mut self);
}
