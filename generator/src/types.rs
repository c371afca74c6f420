//! Generator-specific data types

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use shared::Persona;

/// Why a single generation attempt failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiFailure {
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("service unavailable")]
    ServiceUnavailable,

    #[error("server error: {0}")]
    ServerError(String),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("payload does not match the persona schema: {0}")]
    InvalidPayload(String),

    #[error("attempt task panicked")]
    AttemptPanicked,
}

/// Role tag of a chat message sent to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Everything the remote model needs for one attempt
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Logical attempt index (accepted + in-flight at launch)
    pub attempt: usize,
    pub messages: Vec<ChatMessage>,
    pub schema: serde_json::Value,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Where a reference sample was drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOrigin {
    /// Original seed personas only (drift reset)
    Bootstrap,
    /// Lookback window over the most recent pool entries
    Recent,
}

/// Reference personas handed to one attempt as few-shot context
#[derive(Debug, Clone)]
pub struct ReferenceSample {
    pub origin: SampleOrigin,
    pub personas: Vec<Arc<Persona>>,
}

impl ReferenceSample {
    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.personas.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Terminal state of an attempt
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptResult {
    Succeeded(Persona),
    Failed(ApiFailure),
}

/// Completion notification sent from an attempt task back to the scheduler
#[derive(Debug, Clone)]
pub struct AttemptOutcome {
    pub attempt: usize,
    pub origin: SampleOrigin,
    pub result: AttemptResult,
}

/// Final report of a generation run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub requested: usize,
    pub accepted: usize,
    /// Accepted personas whose attempt referenced only seed personas
    pub reset_accepted: usize,
    pub launched: usize,
    pub failed: usize,
    pub intermediate_flushes: usize,
    pub records_written: usize,
    pub unflushed: usize,
    pub destination: String,
    pub interrupted: bool,
}

impl RunSummary {
    pub fn target_reached(&self) -> bool {
        self.accepted >= self.requested
    }
}
