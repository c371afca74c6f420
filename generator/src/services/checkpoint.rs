//! JSONL checkpoint writer
//!
//! One file per run, named after the model and the run start time. Each
//! flush appends its whole batch with a single write so a batch is never
//! interleaved with another.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use shared::{process_debug, BatchName, Persona, ProcessId};
use crate::error::{GeneratorError, GeneratorResult};
use crate::traits::CheckpointSink;

pub struct JsonlCheckpointWriter {
    path: PathBuf,
}

impl JsonlCheckpointWriter {
    /// Writer for `{dir}/data_{short model}_{started_at}.jsonl`
    pub fn for_run(dir: impl AsRef<Path>, model_id: &str, started_at: u64) -> Self {
        let name = BatchName::checkpoint(model_id, started_at);
        Self::with_path(dir.as_ref().join(name.file_name()))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

#[async_trait]
impl CheckpointSink for JsonlCheckpointWriter {
    async fn flush(&mut self, records: &[Persona]) -> GeneratorResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut buffer = String::new();
        for record in records {
            buffer.push_str(&record.to_json_line()?);
            buffer.push('\n');
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| GeneratorError::persistence(parent.display().to_string(), e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| GeneratorError::persistence(self.display_path(), e))?;

        file.write_all(buffer.as_bytes())
            .await
            .map_err(|e| GeneratorError::persistence(self.display_path(), e))?;
        file.flush()
            .await
            .map_err(|e| GeneratorError::persistence(self.display_path(), e))?;

        process_debug!(
            ProcessId::current(),
            "Appended {} records to {}",
            records.len(),
            self.display_path()
        );
        Ok(records.len())
    }

    fn destination(&self) -> String {
        self.display_path()
    }
}
