//! Named set of sinks

use crate::core::error::{LoggerError, Result};
use crate::core::{LogLevel, Line, Sink};
use std::collections::HashMap;

/// Owns every sink of a logger, keyed by lowercase name.
#[derive(Default)]
pub struct SinkRegistry {
    sinks: HashMap<String, Box<dyn Sink>>,
}

fn normalize(key: &str) -> String {
    key.to_ascii_lowercase()
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sink` under its normalized name.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::DuplicateSink`] if the key is taken
    pub fn add_sink(&mut self, sink: Box<dyn Sink>) -> Result<()> {
        let key = normalize(sink.name());
        if self.sinks.contains_key(&key) {
            return Err(LoggerError::duplicate_sink(key));
        }
        self.sinks.insert(key, sink);
        Ok(())
    }

    /// Route `line` to the sink registered under `key`.
    pub fn write(&self, key: &str, level: LogLevel, line: Line) -> Result<usize> {
        let sink = self
            .sinks
            .get(key)
            .or_else(|| self.sinks.get(&normalize(key)))
            .ok_or_else(|| LoggerError::unknown_sink(key))?;
        sink.write(level, line)
    }

    /// Write `line` to every sink; returns the number of sinks that accepted it.
    pub fn broadcast(&self, level: LogLevel, line: Line) -> usize {
        self.sinks
            .values()
            .filter(|sink| match sink.write(level, Line::clone(&line)) {
                Ok(_) => true,
                Err(e) => {
                    eprintln!("[LOGGER ERROR] Sink '{}' failed: {}", sink.name(), e);
                    false
                }
            })
            .count()
    }

    /// Start every sink.
    ///
    /// # Errors
    ///
    /// Returns the first start failure
    pub fn start(&mut self) -> Result<()> {
        for sink in self.sinks.values_mut() {
            sink.start()?;
        }
        Ok(())
    }

    /// Stop every sink; each one drains its own queue first.
    pub fn stop(&mut self) {
        for sink in self.sinks.values_mut() {
            sink.stop();
        }
    }

    pub fn count(&self) -> usize {
        self.sinks.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.sinks.contains_key(&normalize(key))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sinks.keys().map(String::as_str)
    }
}
