//! OpenAI-compatible chat completion client with structured output

use async_trait::async_trait;
use std::time::Duration;

use shared::{process_debug, Persona, ProcessId};
use crate::error::{GeneratorError, GeneratorResult};
use crate::traits::ModelClient;
use crate::types::{ApiFailure, GenerationRequest};

/// Client for a `/chat/completions` endpoint that constrains replies to the
/// persona schema through `response_format`
pub struct HttpModelClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl HttpModelClient {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> GeneratorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeneratorError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, request: &GenerationRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": request.messages,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "Persona",
                    "strict": true,
                    "schema": request.schema,
                }
            },
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        })
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn generate(&self, request: GenerationRequest) -> Result<Persona, ApiFailure> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(&request))
            .send()
            .await
            .map_err(|e| ApiFailure::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return match response.status().as_u16() {
                401 => Err(ApiFailure::AuthenticationFailed),
                429 => Err(ApiFailure::RateLimitExceeded),
                503 => Err(ApiFailure::ServiceUnavailable),
                _ => Err(ApiFailure::ServerError(response.status().to_string())),
            };
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiFailure::InvalidPayload(format!("Failed to parse response: {}", e)))?;

        let content = response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or_else(|| ApiFailure::InvalidPayload("No content in response".to_string()))?;

        process_debug!(
            ProcessId::current(),
            "Attempt {} returned {} bytes of content",
            request.attempt,
            content.len()
        );

        Persona::from_payload(content).map_err(|e| ApiFailure::InvalidPayload(e.to_string()))
    }
}
