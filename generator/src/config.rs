//! Generator configuration
//!
//! `GeneratorConfig` is built from the command line in `main.rs` and validated
//! once at startup. Any invalid value is fatal: the run never starts with a
//! configuration it cannot honour.

use std::path::PathBuf;
use std::time::Duration;

use crate::core::pool::SamplingPolicy;
use crate::error::{GeneratorError, GeneratorResult};

/// Environment variables checked for the inference API token, in order
pub const API_KEY_VARS: &[&str] = &["HF_TOKEN", "HUGGINGFACE_API_KEY"];

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Number of accepted personas to reach
    pub target: usize,
    /// Model identifier, e.g. `Qwen/Qwen3-235B-A22B-Instruct-2507`
    pub model: String,
    /// Inference provider appended to the model as `model:provider`
    pub provider: Option<String>,
    /// OpenAI-compatible API root
    pub base_url: String,
    pub concurrency: usize,
    pub checkpoint_every: usize,
    /// Drift reset interval in logical attempts, 0 disables resets
    pub reset_every: usize,
    pub num_references: usize,
    pub lookback: usize,
    pub temperature: f32,
    pub max_tokens: u32,
    pub failure_backoff: Duration,
    pub request_timeout: Duration,
    pub output_dir: PathBuf,
    pub seed_dir: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            target: 5000,
            model: "Qwen/Qwen3-235B-A22B-Instruct-2507".to_string(),
            provider: Some("together".to_string()),
            base_url: "https://router.huggingface.co/v1".to_string(),
            concurrency: 20,
            checkpoint_every: 50,
            reset_every: 50,
            num_references: 3,
            lookback: 20,
            temperature: 0.8,
            max_tokens: 512,
            failure_backoff: Duration::from_secs(2),
            request_timeout: Duration::from_secs(120),
            output_dir: PathBuf::from("data/raw"),
            seed_dir: PathBuf::from("data/seed"),
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> GeneratorResult<()> {
        if self.model.trim().is_empty() {
            return Err(GeneratorError::config("model must not be empty"));
        }
        if self.concurrency == 0 {
            return Err(GeneratorError::config("concurrency must be at least 1"));
        }
        if self.checkpoint_every == 0 {
            return Err(GeneratorError::config("checkpoint interval must be at least 1"));
        }
        if self.num_references == 0 {
            return Err(GeneratorError::config("number of references must be at least 1"));
        }
        if self.lookback == 0 {
            return Err(GeneratorError::config("lookback window must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(GeneratorError::config(format!(
                "temperature {} outside 0.0..=2.0",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(GeneratorError::config("max tokens must be at least 1"));
        }
        Ok(())
    }

    /// Model string sent on the wire, including the provider suffix when set
    pub fn api_model(&self) -> String {
        match self.provider.as_deref().map(str::trim) {
            Some(provider) if !provider.is_empty() => format!("{}:{}", self.model, provider),
            _ => self.model.clone(),
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            target: self.target,
            concurrency: self.concurrency,
            checkpoint_every: self.checkpoint_every,
            failure_backoff: self.failure_backoff,
            sampling: SamplingPolicy {
                references: self.num_references,
                lookback: self.lookback,
                reset_every: self.reset_every,
            },
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// The subset of configuration the scheduling loop needs
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub target: usize,
    pub concurrency: usize,
    pub checkpoint_every: usize,
    pub failure_backoff: Duration,
    pub sampling: SamplingPolicy,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Load the inference API token from `.env` or the process environment
pub fn load_api_key() -> GeneratorResult<String> {
    // A missing .env file is fine, real environment variables still apply
    let _ = dotenvy::dotenv();

    API_KEY_VARS
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()))
        .map(|v| v.trim().to_string())
        .ok_or_else(|| {
            GeneratorError::config(format!(
                "missing inference API token, set one of: {}",
                API_KEY_VARS.join(", ")
            ))
        })
}
