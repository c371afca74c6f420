//! Seed directory loading
//!
//! Expected layout:
//!
//! ```text
//! {seed_dir}/personas.jsonl            bootstrap personas, one per line
//! {seed_dir}/persona_components.json   weighted prompt building blocks
//! {seed_dir}/first_names.json          JSON list of strings
//! {seed_dir}/last_names.json           JSON list of strings
//! ```

use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

use shared::{process_info, Persona, ProcessId};
use crate::core::prompt::{NamePool, PersonaComponents};
use crate::error::{GeneratorError, GeneratorResult};

pub const BOOTSTRAP_FILE: &str = "personas.jsonl";
pub const COMPONENTS_FILE: &str = "persona_components.json";
pub const FIRST_NAMES_FILE: &str = "first_names.json";
pub const LAST_NAMES_FILE: &str = "last_names.json";

/// Everything the generator reads from the seed directory
#[derive(Debug, Clone)]
pub struct SeedData {
    pub personas: Vec<Persona>,
    pub components: PersonaComponents,
    pub names: NamePool,
}

impl SeedData {
    pub async fn load(dir: impl AsRef<Path>) -> GeneratorResult<Self> {
        let dir = dir.as_ref();

        let personas = load_bootstrap(&dir.join(BOOTSTRAP_FILE)).await?;
        let components: PersonaComponents = load_json(&dir.join(COMPONENTS_FILE)).await?;
        let first_names: Vec<String> = load_json(&dir.join(FIRST_NAMES_FILE)).await?;
        let last_names: Vec<String> = load_json(&dir.join(LAST_NAMES_FILE)).await?;

        let seed = Self {
            personas,
            components,
            names: NamePool {
                first_names,
                last_names,
            },
        };
        seed.check(dir)?;

        process_info!(
            ProcessId::current(),
            "🌱 Loaded {} seed personas, {} professions, {} first and {} last names from {}",
            seed.personas.len(),
            seed.components.professions.len(),
            seed.names.first_names.len(),
            seed.names.last_names.len(),
            dir.display()
        );
        Ok(seed)
    }

    fn check(&self, dir: &Path) -> GeneratorResult<()> {
        let empty = |file: &str, what: &str| GeneratorError::seed(dir.join(file).display().to_string(), format!("{what} is empty"));

        if self.personas.is_empty() {
            return Err(empty(BOOTSTRAP_FILE, "bootstrap persona list"));
        }
        let c = &self.components;
        for (label, len) in [
            ("professions", c.professions.len()),
            ("life_contexts", c.life_contexts.len()),
            ("chatting_quirks", c.chatting_quirks.len()),
            ("traits", c.traits.len()),
        ] {
            if len == 0 {
                return Err(empty(COMPONENTS_FILE, label));
            }
        }
        if self.names.first_names.is_empty() {
            return Err(empty(FIRST_NAMES_FILE, "first name list"));
        }
        if self.names.last_names.is_empty() {
            return Err(empty(LAST_NAMES_FILE, "last name list"));
        }
        Ok(())
    }
}

async fn read(path: &Path) -> GeneratorResult<String> {
    fs::read_to_string(path)
        .await
        .map_err(|e| GeneratorError::seed(path.display().to_string(), e.to_string()))
}

async fn load_json<T: DeserializeOwned>(path: &Path) -> GeneratorResult<T> {
    let content = read(path).await?;
    serde_json::from_str(&content).map_err(|e| GeneratorError::seed(path.display().to_string(), e.to_string()))
}

async fn load_bootstrap(path: &Path) -> GeneratorResult<Vec<Persona>> {
    let content = read(path).await?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            Persona::from_payload(line)
                .map_err(|e| GeneratorError::seed(path.display().to_string(), format!("line {}: {}", i + 1, e)))
        })
        .collect()
}
