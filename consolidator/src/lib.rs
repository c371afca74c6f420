//! Persona corpus consolidation
//!
//! Merges checkpoint batches from any number of generator runs into one
//! JSON Lines corpus, tagging every persona with the model that produced it
//! and a unique id, and dropping repeats.

pub mod config;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod loader;
pub mod types;

pub use config::ConsolidatorConfig;
pub use dedup::{dedup_first, DedupKey};
pub use engine::Consolidator;
pub use error::{ConsolidatorError, ConsolidatorResult};
pub use types::*;
