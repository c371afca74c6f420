//! Generator trait definitions for dependency injection

use async_trait::async_trait;

use shared::Persona;
use crate::error::GeneratorResult;
use crate::types::{ApiFailure, GenerationRequest};

/// Remote generative model producing one persona per call
#[mockall::automock]
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Request one schema-conforming persona. Transport errors, non-success
    /// statuses and non-conforming payloads all come back as `ApiFailure`.
    async fn generate(&self, request: GenerationRequest) -> Result<Persona, ApiFailure>;
}

/// Durable append-only destination for accepted personas
#[mockall::automock]
#[async_trait]
pub trait CheckpointSink: Send {
    /// Append every record, returning how many were written
    async fn flush(&mut self, records: &[Persona]) -> GeneratorResult<usize>;

    /// Human readable location, used in progress logs and the run summary
    fn destination(&self) -> String;
}
