//! Consolidation of checkpoint batches into one deduplicated corpus
//!
//! Files are visited in sorted path order. Each accepted file contributes all
//! of its personas, stamped with the model taken from its name and a fresh
//! id, and the combined sequence keeps the first persona for every
//! [`DedupKey`](crate::dedup::DedupKey).

use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use shared::{logging, process_info, process_warn, BatchName, ConsolidatedPersona, ProcessId};
use crate::config::ConsolidatorConfig;
use crate::dedup::dedup_first;
use crate::error::{ConsolidatorError, ConsolidatorResult};
use crate::loader::{discover, load_batch};
use crate::types::{ConsolidationReport, SkipReason, SkippedFile};

pub struct Consolidator {
    config: ConsolidatorConfig,
}

impl Consolidator {
    pub fn new(config: ConsolidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConsolidatorConfig {
        &self.config
    }

    /// Run with the current time as the output timestamp
    pub async fn run(&self) -> ConsolidatorResult<ConsolidationReport> {
        self.run_at(chrono::Utc::now().timestamp()).await
    }

    pub async fn run_at(&self, timestamp: i64) -> ConsolidatorResult<ConsolidationReport> {
        self.config.validate()?;

        let files = discover(&self.config.input_dirs).await?;
        let mut report = ConsolidationReport {
            files_found: files.len(),
            ..ConsolidationReport::default()
        };

        if files.is_empty() {
            process_warn!(ProcessId::current(), "⚠️ No batch files found, nothing to consolidate");
            return Ok(report);
        }
        process_info!(ProcessId::current(), "📂 Found {} batch files to process", files.len());

        let mut combined = Vec::new();
        for path in files {
            match stamp_batch(&path).await {
                Ok(records) => {
                    report.files_processed += 1;
                    report.records_loaded += records.len();
                    combined.extend(records);
                }
                Err(reason) => {
                    process_warn!(ProcessId::current(), "⚠️ Skipping '{}': {}", path.display(), reason);
                    report.skipped.push(SkippedFile { path, reason });
                }
            }
        }

        let unique = dedup_first(combined);
        report.unique_records = unique.len();
        process_info!(
            ProcessId::current(),
            "🧹 {} personas loaded, {} unique, {} duplicates removed",
            report.records_loaded,
            report.unique_records,
            report.duplicates_removed()
        );

        let output = self.config.output_path(timestamp);
        write_corpus(&output, &unique).await?;
        process_info!(ProcessId::current(), "💾 Saved consolidated corpus to {}", output.display());

        report.output_path = Some(output);
        Ok(report)
    }
}

/// Load one batch and stamp its personas with model and id
async fn stamp_batch(path: &Path) -> Result<Vec<ConsolidatedPersona>, SkipReason> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or(SkipReason::UnrecognizedName)?;
    let batch = BatchName::parse(file_name).map_err(|_| SkipReason::UnrecognizedName)?;

    let personas = load_batch(path).await?;
    logging::log_progress(
        ProcessId::current(),
        "Processing",
        &format!("'{}' (model: {}) with {} personas", file_name, batch.model, personas.len()),
    );

    Ok(personas
        .into_iter()
        .map(|persona| ConsolidatedPersona::new(persona, batch.model.clone(), Uuid::new_v4().simple().to_string()))
        .collect())
}

async fn write_corpus(path: &Path, records: &[ConsolidatedPersona]) -> ConsolidatorResult<()> {
    let display = path.display().to_string();

    let mut buffer = String::new();
    for record in records {
        let line = serde_json::to_string(record).map_err(|e| shared::SharedError::SerializationError {
            message: e.to_string(),
        })?;
        buffer.push_str(&line);
        buffer.push('\n');
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ConsolidatorError::output(parent.display().to_string(), e))?;
    }

    let mut file = fs::File::create(path)
        .await
        .map_err(|e| ConsolidatorError::output(&display, e))?;
    file.write_all(buffer.as_bytes())
        .await
        .map_err(|e| ConsolidatorError::output(&display, e))?;
    file.flush().await.map_err(|e| ConsolidatorError::output(&display, e))?;
    Ok(())
}
