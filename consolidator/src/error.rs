//! Consolidator error types

use thiserror::Error;
use shared::SharedError;

/// Result type for consolidator operations
pub type ConsolidatorResult<T> = Result<T, ConsolidatorError>;

/// Errors that abort a consolidation run. Problems with individual input
/// files are not errors; they are recorded as skips in the report.
#[derive(Error, Debug)]
pub enum ConsolidatorError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Failed to read input directory {path}: {source}")]
    InputDirError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write consolidated output {path}: {source}")]
    OutputError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),
}

impl ConsolidatorError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn output(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::OutputError {
            path: path.into(),
            source,
        }
    }
}
