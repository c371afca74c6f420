//! Checkpoint batch file naming
//!
//! Batches are named `prefix_{model}_{timestamp}.ext`. The generator builds
//! these names and the consolidator parses them back to recover the model
//! that produced each batch. Model identifiers may contain underscores; the
//! timestamp is always the last underscore-separated segment.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::errors::{SharedError, SharedResult};

static BATCH_NAME_PATTERN: OnceLock<Regex> = OnceLock::new();

fn batch_name_pattern() -> &'static Regex {
    BATCH_NAME_PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9]+)_(.+)_([0-9]+)\.([A-Za-z0-9]+)$").expect("batch name pattern compiles")
    })
}

/// Parsed components of a checkpoint batch file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchName {
    pub prefix: String,
    pub model: String,
    pub timestamp: u64,
    pub extension: String,
}

impl BatchName {
    /// Prefix used for files written by the generator
    pub const CHECKPOINT_PREFIX: &'static str = "data";

    /// Extension used for files written by the generator
    pub const CHECKPOINT_EXTENSION: &'static str = "jsonl";

    /// Name for a new checkpoint file. Only the last `/` segment of the model
    /// identifier is kept (`Qwen/Qwen3-8B` becomes `Qwen3-8B`).
    pub fn checkpoint(model_id: &str, timestamp: u64) -> Self {
        Self {
            prefix: Self::CHECKPOINT_PREFIX.to_string(),
            model: Self::short_model_name(model_id).to_string(),
            timestamp,
            extension: Self::CHECKPOINT_EXTENSION.to_string(),
        }
    }

    /// Strip any organisation path and provider suffix from a model identifier
    pub fn short_model_name(model_id: &str) -> &str {
        let last = model_id.rsplit('/').next().unwrap_or(model_id);
        last.split(':').next().unwrap_or(last)
    }

    /// Parse a bare file name (no directory components)
    pub fn parse(file_name: &str) -> SharedResult<Self> {
        let invalid = || SharedError::InvalidBatchName {
            name: file_name.to_string(),
        };

        let captures = batch_name_pattern().captures(file_name).ok_or_else(invalid)?;
        let timestamp = captures[3].parse::<u64>().map_err(|_| invalid())?;

        Ok(Self {
            prefix: captures[1].to_string(),
            model: captures[2].to_string(),
            timestamp,
            extension: captures[4].to_string(),
        })
    }

    pub fn file_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BatchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}.{}", self.prefix, self.model, self.timestamp, self.extension)
    }
}

impl FromStr for BatchName {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
