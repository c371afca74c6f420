//! Core types used by the generator and the consolidator

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::OnceLock;

use crate::errors::{SharedError, SharedResult};

/// Global process ID singleton - set once at startup
static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();

/// Process identifier for any component in the system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// Generation run driving the remote model
    Generator,
    /// Offline merge of checkpoint batches
    Consolidator,
    /// Library use without an initialized process (tests, embedding)
    Standalone,
}

impl ProcessId {
    /// Initialize the global process ID for the generator
    pub fn init_generator() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Generator)
    }

    /// Initialize the global process ID for the consolidator
    pub fn init_consolidator() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Consolidator)
    }

    /// Get the global process ID, `Standalone` until one of the init_* calls ran
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get().unwrap_or(&ProcessId::Standalone)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Generator => write!(f, "generator"),
            ProcessId::Consolidator => write!(f, "consolidator"),
            ProcessId::Standalone => write!(f, "standalone"),
        }
    }
}

/// Oldest age a generated persona may claim
pub const MAX_PERSONA_AGE: u32 = 150;

/// One generated persona as produced by the model and written to checkpoints.
///
/// Carries no identifier or provenance; those are assigned during
/// consolidation by wrapping it in [`ConsolidatedPersona`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    pub age: u32,
    pub traits: Vec<String>,
    pub background: String,
    pub chatting_style: String,
}

impl Persona {
    /// Parse a raw model payload and validate it against the record schema
    pub fn from_payload(payload: &str) -> SharedResult<Self> {
        let persona: Persona = serde_json::from_str(payload.trim()).map_err(|e| {
            SharedError::DeserializationError {
                message: e.to_string(),
            }
        })?;
        persona.validate()?;
        Ok(persona)
    }

    /// Check the field constraints that serde alone cannot express
    pub fn validate(&self) -> SharedResult<()> {
        if self.name.trim().is_empty() {
            return Err(SharedError::invalid_record("name", "must not be blank"));
        }
        if self.age > MAX_PERSONA_AGE {
            return Err(SharedError::invalid_record(
                "age",
                format!("{} exceeds {}", self.age, MAX_PERSONA_AGE),
            ));
        }
        if self.traits.is_empty() {
            return Err(SharedError::invalid_record("traits", "must not be empty"));
        }
        if self.traits.iter().any(|t| t.trim().is_empty()) {
            return Err(SharedError::invalid_record("traits", "must not contain blank entries"));
        }
        if self.background.trim().is_empty() {
            return Err(SharedError::invalid_record("background", "must not be blank"));
        }
        if self.chatting_style.trim().is_empty() {
            return Err(SharedError::invalid_record("chatting_style", "must not be blank"));
        }
        Ok(())
    }

    /// JSON schema sent to the model as the structured output target
    pub fn json_schema() -> serde_json::Value {
        json!({
            "title": "Persona",
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "username": { "anyOf": [{ "type": "string" }, { "type": "null" }] },
                "age": { "type": "integer", "minimum": 0, "maximum": MAX_PERSONA_AGE },
                "traits": { "type": "array", "items": { "type": "string" } },
                "background": { "type": "string" },
                "chatting_style": { "type": "string" }
            },
            "required": ["name", "username", "age", "traits", "background", "chatting_style"],
            "additionalProperties": false
        })
    }

    /// Serialize as a single JSON line (no trailing newline)
    pub fn to_json_line(&self) -> SharedResult<String> {
        serde_json::to_string(self).map_err(|e| SharedError::SerializationError {
            message: e.to_string(),
        })
    }
}

/// A persona after consolidation, stamped with an id and its source model
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedPersona {
    #[serde(flatten)]
    pub persona: Persona,
    pub model: String,
    pub id: String,
}

impl ConsolidatedPersona {
    pub fn new(persona: Persona, model: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            persona,
            model: model.into(),
            id: id.into(),
        }
    }
}
