//! Log level definitions and the enabled-level set

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

/// Severity of a record. `Panic` is the most severe, `Debug` the least.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Fatal = 4,
    Panic = 5,
}

impl LogLevel {
    /// All levels, most severe first.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Panic,
        LogLevel::Fatal,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Panic => "PANIC",
            LogLevel::Fatal => "FATAL",
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Short tag written into every line, e.g. `[W]`.
    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Panic => "[P]",
            LogLevel::Fatal => "[F]",
            LogLevel::Error => "[E]",
            LogLevel::Warn => "[W]",
            LogLevel::Info => "[I]",
            LogLevel::Debug => "[D]",
        }
    }

    /// Directory (and sink key) used when records are separated by level.
    pub fn dir_name(&self) -> &'static str {
        match self {
            LogLevel::Panic => "panics",
            LogLevel::Fatal => "fatals",
            LogLevel::Error => "errors",
            LogLevel::Warn => "warns",
            LogLevel::Info => "infos",
            LogLevel::Debug => "debugs",
        }
    }

    #[inline]
    pub(crate) fn bit(self) -> u8 {
        1 << (self as u8)
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Panic => BrightMagenta,
            LogLevel::Fatal => BrightRed,
            LogLevel::Error => Red,
            LogLevel::Warn => Yellow,
            LogLevel::Info => Green,
            LogLevel::Debug => Blue,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PANIC" => Ok(LogLevel::Panic),
            "FATAL" => Ok(LogLevel::Fatal),
            "ERROR" => Ok(LogLevel::Error),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

/// Arbitrary subset of levels that are written.
///
/// The set is not a threshold: `LevelSet::from(LogLevel::Error) | LogLevel::Debug`
/// enables exactly those two levels. [`LevelSet::is_enabled`] is the only query.
///
/// ```
/// use rust_leveled_logger::{LevelSet, LogLevel};
///
/// let levels = LogLevel::Error | LogLevel::Debug;
/// assert!(levels.is_enabled(LogLevel::Debug));
/// assert!(!levels.is_enabled(LogLevel::Info));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelSet(u8);

impl LevelSet {
    const MASK: u8 = 0b0011_1111;

    #[must_use]
    pub const fn empty() -> Self {
        LevelSet(0)
    }

    #[must_use]
    pub const fn all() -> Self {
        LevelSet(Self::MASK)
    }

    /// Every level at least as severe as `min`.
    #[must_use]
    pub fn at_least(min: LogLevel) -> Self {
        LogLevel::ALL
            .into_iter()
            .filter(|level| *level >= min)
            .collect()
    }

    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.0 & level.bit() == level.bit()
    }

    #[must_use]
    pub fn with(mut self, level: LogLevel) -> Self {
        self.insert(level);
        self
    }

    #[must_use]
    pub fn without(mut self, level: LogLevel) -> Self {
        self.remove(level);
        self
    }

    pub fn insert(&mut self, level: LogLevel) {
        self.0 |= level.bit();
    }

    pub fn remove(&mut self, level: LogLevel) {
        self.0 &= !level.bit();
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Enabled levels, most severe first.
    pub fn iter(&self) -> impl Iterator<Item = LogLevel> + '_ {
        LogLevel::ALL
            .into_iter()
            .filter(move |level| self.is_enabled(*level))
    }
}

impl Default for LevelSet {
    fn default() -> Self {
        LevelSet::all()
    }
}

impl From<LogLevel> for LevelSet {
    fn from(level: LogLevel) -> Self {
        LevelSet(level.bit())
    }
}

impl FromIterator<LogLevel> for LevelSet {
    fn from_iter<I: IntoIterator<Item = LogLevel>>(iter: I) -> Self {
        iter.into_iter().fold(LevelSet::empty(), LevelSet::with)
    }
}

impl BitOr for LogLevel {
    type Output = LevelSet;

    fn bitor(self, rhs: LogLevel) -> LevelSet {
        LevelSet::from(self).with(rhs)
    }
}

impl BitOr<LogLevel> for LevelSet {
    type Output = LevelSet;

    fn bitor(self, rhs: LogLevel) -> LevelSet {
        self.with(rhs)
    }
}

impl BitOr for LevelSet {
    type Output = LevelSet;

    fn bitor(self, rhs: LevelSet) -> LevelSet {
        LevelSet(self.0 | rhs.0)
    }
}
