//! Consolidation report types

use std::fmt;
use std::path::PathBuf;

/// Why an input file contributed nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// File name does not follow `prefix_{model}_{timestamp}.ext`
    UnrecognizedName,
    Unreadable(String),
    InvalidJson(String),
    /// A `.json` batch whose top level is not an array
    NotAList,
    /// An element or line that is not a valid persona
    InvalidRecord { position: usize, message: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnrecognizedName => write!(f, "could not extract model name from file name"),
            SkipReason::Unreadable(e) => write!(f, "unreadable: {e}"),
            SkipReason::InvalidJson(e) => write!(f, "invalid JSON: {e}"),
            SkipReason::NotAList => write!(f, "does not contain a JSON list"),
            SkipReason::InvalidRecord { position, message } => {
                write!(f, "record {position} is not a valid persona: {message}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Outcome of a consolidation run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConsolidationReport {
    pub files_found: usize,
    pub files_processed: usize,
    pub skipped: Vec<SkippedFile>,
    pub records_loaded: usize,
    pub unique_records: usize,
    /// `None` when no input files were found and nothing was written
    pub output_path: Option<PathBuf>,
}

impl ConsolidationReport {
    pub fn duplicates_removed(&self) -> usize {
        self.records_loaded - self.unique_records
    }
}
