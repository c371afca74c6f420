//! Shared error types for the persona generation pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Serialization failed: {message}")]
    SerializationError { message: String },

    #[error("Deserialization failed: {message}")]
    DeserializationError { message: String },

    #[error("Invalid record: {field} {reason}")]
    InvalidRecord { field: String, reason: String },

    #[error("Batch file name does not follow prefix_model_timestamp.ext: {name}")]
    InvalidBatchName { name: String },
}

impl SharedError {
    pub fn invalid_record(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type SharedResult<T> = Result<T, SharedError>;
