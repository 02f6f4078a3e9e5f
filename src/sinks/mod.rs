//! Sink implementations

pub mod console;
pub mod file;
pub mod registry;
pub mod rotating_file;
mod worker;

pub use console::ConsoleSink;
pub use file::FileSink;
pub use registry::SinkRegistry;
pub use rotating_file::{RetentionPolicy, RotatingFile, RotationTrigger};

pub use crate::core::Sink;
