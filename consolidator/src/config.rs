//! Consolidator configuration

use std::path::PathBuf;

use crate::error::{ConsolidatorError, ConsolidatorResult};

/// Prefix of consolidated output files
pub const OUTPUT_PREFIX: &str = "processed_personas";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidatorConfig {
    /// Directories scanned for checkpoint batches
    pub input_dirs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    /// Write here instead of a timestamped file in `output_dir`
    pub output_file: Option<PathBuf>,
}

impl Default for ConsolidatorConfig {
    fn default() -> Self {
        Self {
            input_dirs: vec![PathBuf::from("data/raw")],
            output_dir: PathBuf::from("data/processed"),
            output_file: None,
        }
    }
}

impl ConsolidatorConfig {
    pub fn validate(&self) -> ConsolidatorResult<()> {
        if self.input_dirs.is_empty() {
            return Err(ConsolidatorError::config("at least one input directory is required"));
        }
        Ok(())
    }

    /// Where the consolidated corpus goes for a run started at `timestamp`
    pub fn output_path(&self, timestamp: i64) -> PathBuf {
        match &self.output_file {
            Some(path) => path.clone(),
            None => self.output_dir.join(format!("{OUTPUT_PREFIX}_{timestamp}.jsonl")),
        }
    }
}
