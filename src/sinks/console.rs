//! Console sink implementation

use super::worker::{Consumer, SinkMessage, SinkQueue};
use crate::core::config::{DEFAULT_SINK_QUEUE_CAPACITY, STDOUT_KEY};
use crate::core::{LogLevel, Line, Result, Sink};
use std::io::{self, Write};

/// Mirrors lines to standard output (or any other writer) from its own thread.
pub struct ConsoleSink {
    queue: SinkQueue<ConsoleConsumer>,
}

impl ConsoleSink {
    /// Console sink writing to stdout with level colors.
    pub fn new() -> Self {
        Self::with_writer(io::stdout(), DEFAULT_SINK_QUEUE_CAPACITY).with_colors(true)
    }

    /// Console sink writing to `writer` without colors.
    pub fn with_writer<W: Write + Send + 'static>(writer: W, capacity: usize) -> Self {
        Self {
            queue: SinkQueue::new(
                STDOUT_KEY,
                capacity,
                ConsoleConsumer {
                    writer: Box::new(writer),
                    use_colors: false,
                },
            ),
        }
    }

    /// Wrap lines in ANSI colors keyed by level.
    ///
    /// Only effective before [`Sink::start`].
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.queue.configure(|consumer| consumer.use_colors = use_colors);
        self
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
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

struct ConsoleConsumer {
    writer: Box<dyn Write + Send>,
    use_colors: bool,
}

impl ConsoleConsumer {
    #[cfg(feature = "console")]
    fn render(&self, level: LogLevel, line: &str) -> String {
        use colored::Colorize;

        if !self.use_colors {
            return line.to_string();
        }
        format!("{}\n", line.trim_end_matches('\n').color(level.color_code()))
    }

    #[cfg(not(feature = "console"))]
    fn render(&self, _level: LogLevel, line: &str) -> String {
        line.to_string()
    }
}

impl Consumer for ConsoleConsumer {
    fn consume(&mut self, message: SinkMessage) {
        let output = self.render(message.level, &message.line);
        if let Err(e) = self.writer.write_all(output.as_bytes()) {
            eprintln!("[LOGGER ERROR] Console sink failed to write: {}", e);
        }
    }

    fn idle(&mut self) {
        let _ = self.writer.flush();
    }

    fn finish(&mut self) {
        let _ = self.writer.flush();
    }
}
