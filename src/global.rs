//! Optional process-wide default logger
//!
//! Applications that would rather not pass a [`Logger`] around can install
//! one default instance with [`init`] and use the free functions of this
//! module. Every function is a no-op until [`init`] succeeds.
//!
//! ```no_run
//! use rust_leveled_logger::{global, Logger};
//!
//! global::init(Logger::builder().app_name("worker").stdout(true)).unwrap();
//! global::info("booted");
//! global::warnf("queue depth %d", &[512.into()]);
//! global::close();
//! ```

use crate::core::{LogLevel, Logger, LoggerBuilder, Result, Value};
use parking_lot::Mutex;
use std::fmt::Display;
use std::sync::OnceLock;

static DEFAULT: OnceLock<Logger> = OnceLock::new();
static INIT_GUARD: Mutex<()> = parking_lot::const_mutex(());

/// Build and install the default logger.
///
/// Only the first successful call builds anything; later calls return the
/// installed instance and drop `builder`.
///
/// # Errors
///
/// Returns the build error of the first call; nothing is installed then.
pub fn init(builder: LoggerBuilder) -> Result<&'static Logger> {
    let _guard = INIT_GUARD.lock();
    if let Some(logger) = DEFAULT.get() {
        return Ok(logger);
    }
    let logger = builder.build()?;
    Ok(DEFAULT.get_or_init(|| logger))
}

/// The default logger, if installed.
pub fn logger() -> Option<&'static Logger> {
    DEFAULT.get()
}

/// Close the default logger. It stays installed but ignores further records.
pub fn close() {
    if let Some(logger) = DEFAULT.get() {
        logger.close();
    }
}

#[track_caller]
pub fn log(level: LogLevel, template: &str, args: &[Value]) {
    if let Some(logger) = DEFAULT.get() {
        logger.log(level, template, args);
    }
}

#[track_caller]
pub fn panic(message: impl Display) {
    if let Some(logger) = DEFAULT.get() {
        logger.panic(message);
    }
}

#[track_caller]
pub fn panicf(template: &str, args: &[Value]) {
    if let Some(logger) = DEFAULT.get() {
        logger.panicf(template, args);
    }
}

#[track_caller]
pub fn fatal(message: impl Display) {
    if let Some(logger) = DEFAULT.get() {
        logger.fatal(message);
    }
}

#[track_caller]
pub fn fatalf(template: &str, args: &[Value]) {
    if let Some(logger) = DEFAULT.get() {
        logger.fatalf(template, args);
    }
}

#[track_caller]
pub fn error(message: impl Display) {
    if let Some(logger) = DEFAULT.get() {
        logger.error(message);
    }
}

#[track_caller]
pub fn errorf(template: &str, args: &[Value]) {
    if let Some(logger) = DEFAULT.get() {
        logger.errorf(template, args);
    }
}

#[track_caller]
pub fn warn(message: impl Display) {
    if let Some(logger) = DEFAULT.get() {
        logger.warn(message);
    }
}

#[track_caller]
pub fn warnf(template: &str, args: &[Value]) {
    if let Some(logger) = DEFAULT.get() {
        logger.warnf(template, args);
    }
}

#[track_caller]
pub fn info(message: impl Display) {
    if let Some(logger) = DEFAULT.get() {
        logger.info(message);
    }
}

#[track_caller]
pub fn infof(template: &str, args: &[Value]) {
    if let Some(logger) = DEFAULT.get() {
        logger.infof(template, args);
    }
}

#[track_caller]
pub fn debug(message: impl Display) {
    if let Some(logger) = DEFAULT.get() {
        logger.debug(message);
    }
}

#[track_caller]
pub fn debugf(template: &str, args: &[Value]) {
    if let Some(logger) = DEFAULT.get() {
        logger.debugf(template, args);
    }
}
