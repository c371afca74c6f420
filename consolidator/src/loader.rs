//! Batch discovery and loading
//!
//! A batch file is all-or-nothing: either every record in it parses and
//! validates, or the file is skipped with a reason.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use shared::{process_warn, Persona, ProcessId};
use crate::config::OUTPUT_PREFIX;
use crate::error::{ConsolidatorError, ConsolidatorResult};
use crate::types::SkipReason;

/// On-disk layout of a batch file, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchFormat {
    /// One JSON array of persona objects
    JsonList,
    /// One persona object per non-blank line
    JsonLines,
}

impl BatchFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::JsonList),
            Some("jsonl") => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Every `.json`/`.jsonl` file directly inside the given directories, sorted
/// by path. A directory that does not exist contributes nothing, and earlier
/// consolidated corpora are never read back as batches.
pub async fn discover(dirs: &[PathBuf]) -> ConsolidatorResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for dir in dirs {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                process_warn!(ProcessId::current(), "⚠️ Input directory '{}' does not exist", dir.display());
                continue;
            }
            Err(source) => {
                return Err(ConsolidatorError::InputDirError {
                    path: dir.display().to_string(),
                    source,
                })
            }
        };

        let read_error = |source| ConsolidatorError::InputDirError {
            path: dir.display().to_string(),
            source,
        };
        while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
            let path = entry.path();
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if is_file && BatchFormat::from_path(&path).is_some() && !is_consolidated_output(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn is_consolidated_output(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(&format!("{OUTPUT_PREFIX}_")))
}

/// Load every persona in a batch file
pub async fn load_batch(path: &Path) -> Result<Vec<Persona>, SkipReason> {
    let format = BatchFormat::from_path(path).ok_or(SkipReason::UnrecognizedName)?;
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| SkipReason::Unreadable(e.to_string()))?;

    match format {
        BatchFormat::JsonList => parse_list(&content),
        BatchFormat::JsonLines => parse_lines(&content),
    }
}

fn parse_list(content: &str) -> Result<Vec<Persona>, SkipReason> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| SkipReason::InvalidJson(e.to_string()))?;
    let serde_json::Value::Array(items) = value else {
        return Err(SkipReason::NotAList);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| to_persona(item, i + 1))
        .collect()
}

fn parse_lines(content: &str) -> Result<Vec<Persona>, SkipReason> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let value: serde_json::Value =
                serde_json::from_str(line).map_err(|e| SkipReason::InvalidJson(format!("line {}: {}", i + 1, e)))?;
            to_persona(value, i + 1)
        })
        .collect()
}

fn to_persona(value: serde_json::Value, position: usize) -> Result<Persona, SkipReason> {
    let invalid = |message: String| SkipReason::InvalidRecord { position, message };

    let persona: Persona = serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
    persona.validate().map_err(|e| invalid(e.to_string()))?;
    Ok(persona)
}
