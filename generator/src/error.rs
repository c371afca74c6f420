//! Generator error types

use thiserror::Error;
use shared::SharedError;

/// Result type for generator operations
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Generator error types
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Seed data error in {path}: {message}")]
    SeedDataError { path: String, message: String },

    #[error("Checkpoint write failed for {path}: {source}")]
    PersistenceError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl GeneratorError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn seed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SeedDataError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn persistence(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::PersistenceError {
            path: path.into(),
            source,
        }
    }
}
