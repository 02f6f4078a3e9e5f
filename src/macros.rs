//! Logging macros for ergonomic log message formatting.
//!
//! These macros take an explicit logger and `format!`-style arguments. The
//! formatted text is passed on as a literal message, so `%` sequences in it
//! are never interpreted.
//!
//! # Examples
//!
//! ```
//! use rust_leveled_logger::prelude::*;
//! use rust_leveled_logger::info;
//!
//! let logger = Logger::builder().stdout(true).build().unwrap();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_leveled_logger::prelude::*;
/// # let logger = Logger::builder().stdout(true).build().unwrap();
/// use rust_leveled_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, &::std::format!($($arg)+), &[])
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_leveled_logger::prelude::*;
/// # let logger = Logger::builder().stdout(true).build().unwrap();
/// use rust_leveled_logger::warn;
/// warn!(logger, "Low disk space");
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message, then close the logger and (by default) exit.
///
/// # Examples
///
/// ```no_run
/// # use rust_leveled_logger::prelude::*;
/// # let logger = Logger::builder().stdout(true).build().unwrap();
/// use rust_leveled_logger::fatal;
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

/// Log a panic-level message; the induced panic is recovered and logged too.
///
/// Named `panic_log!` to stay clear of `std::panic!`.
#[macro_export]
macro_rules! panic_log {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Panic, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{LogLevel, Logger};
    use parking_lot::Mutex;
    use std::io::{self, Write};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logger() -> (Logger, Capture) {
        let capture = Capture::default();
        let logger = Logger::builder()
            .console_writer(capture.clone())
            .console_colors(false)
            .exit_on_fatal(false)
            .build()
            .unwrap();
        (logger, capture)
    }

    fn output(capture: &Capture) -> String {
        String::from_utf8(capture.0.lock().clone()).unwrap()
    }

    #[test]
    fn test_log_macro() {
        let (logger, capture) = logger();
        log!(logger, LogLevel::Info, "Test message");
        log!(logger, LogLevel::Info, "Formatted: {}", 42);
        logger.close();

        let output = output(&capture);
        assert!(output.contains("Test message"));
        assert!(output.contains("Formatted: 42"));
    }

    #[test]
    fn test_percent_is_literal() {
        let (logger, capture) = logger();
        info!(logger, "{}% done %d", 50);
        logger.close();

        assert!(output(&capture).contains("50% done %d"));
    }

    #[test]
    fn test_level_macros() {
        let (logger, capture) = logger();
        debug!(logger, "Count: {}", 5);
        info!(logger, "Items: {}", 100);
        warn!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);
        logger.close();

        let output = output(&capture);
        assert!(output.contains("[D]"));
        assert!(output.contains("[I]"));
        assert!(output.contains("[W]"));
        assert!(output.contains("[E]"));
    }

    #[test]
    fn test_fatal_macro() {
        let (logger, capture) = logger();
        fatal!(logger, "Critical failure: {}", "system");
        assert!(logger.is_closed());
        assert!(output(&capture).contains("Critical failure: system"));
    }

    #[test]
    fn test_panic_log_macro() {
        let (logger, capture) = logger();
        panic_log!(logger, "bad state {}", 3);
        logger.close();
        assert!(output(&capture).contains("panic recovered: bad state 3"));
    }
}
