//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Neither stdout nor a log directory was configured
    #[error("No log destination configured: enable stdout or set a log directory")]
    NoDestination,

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File sink error with path
    #[error("File sink error for '{path}': {message}")]
    FileSinkError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// No sink registered under the key
    #[error("No sink registered under '{0}'")]
    UnknownSink(String),

    /// A sink with the same key is already registered
    #[error("A sink is already registered under '{0}'")]
    DuplicateSink(String),

    /// The sink worker is gone
    #[error("Sink '{0}' is no longer accepting messages")]
    SinkDisconnected(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file sink error
    pub fn file_sink(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileSinkError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn unknown_sink(key: impl Into<String>) -> Self {
        LoggerError::UnknownSink(key.into())
    }

    pub fn duplicate_sink(key: impl Into<String>) -> Self {
        LoggerError::DuplicateSink(key.into())
    }

    pub fn sink_disconnected(key: impl Into<String>) -> Self {
        LoggerError::SinkDisconnected(key.into())
    }
}
