//! Shared types for the persona generation pipeline
//!
//! Holds the record schema and the checkpoint naming convention that both the
//! generator and the consolidator depend on, plus process-aware logging.

pub mod batch;
pub mod errors;
pub mod logging;
pub mod types;

pub use batch::BatchName;
pub use errors::*;
pub use types::*;
