//! Generator core business logic

pub mod pool;
pub mod prompt;
pub mod scheduler;

pub use pool::{ReferencePool, SamplingPolicy};
pub use prompt::{NamePool, PersonaComponents, PromptComposer};
pub use scheduler::Scheduler;
