//! Persona generator library
//!
//! Grows a corpus of synthetic personas by repeatedly asking a remote model
//! for one new record at a time, feeding a sample of earlier records back as
//! context. Accepted records are checkpointed to JSON Lines as they arrive.

pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

pub use crate::core::{pool, prompt, scheduler};
pub use services::{checkpoint, seed};

// Re-export main types
pub use config::{GeneratorConfig, SchedulerConfig};
pub use crate::core::{PromptComposer, ReferencePool, SamplingPolicy, Scheduler};
pub use error::{GeneratorError, GeneratorResult};
pub use services::{HttpModelClient, JsonlCheckpointWriter, SeedData};
pub use traits::*;
pub use types::*;
