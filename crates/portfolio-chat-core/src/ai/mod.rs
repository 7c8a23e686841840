pub mod claude;
pub mod client;
pub mod gemini;
pub mod openai;

pub use claude::ClaudeClient;
pub use client::{ModelClient, PendingReply, RequestSlot};
pub use gemini::GeminiClient;
pub use openai::OpenAIClient;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AssistantError;
use crate::provider::Provider;

/// A hosted generative-language model reachable over HTTP.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    fn provider(&self) -> Provider;

    fn has_credential(&self) -> bool;

    /// Send one prompt and return the model's text.
    async fn generate(&self, prompt: &str) -> Result<String, AssistantError>;
}

/// Build the backend for `provider`. A missing key is not an error here; it
/// surfaces as `MissingCredential` on the first send.
pub fn build_backend(
    provider: Provider,
    api_key: Option<String>,
    model: &str,
) -> Arc<dyn ModelBackend> {
    match provider {
        Provider::Gemini => Arc::new(GeminiClient::new(api_key, model)),
        Provider::OpenAI => Arc::new(OpenAIClient::new(api_key, model)),
        Provider::Claude => Arc::new(ClaudeClient::new(api_key, model)),
    }
}

pub(crate) fn usable_key(api_key: Option<String>) -> Option<String> {
    api_key.filter(|k| !k.trim().is_empty())
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Turn a non-success response into an `UpstreamError`, keeping the service's
/// own message when the body carries one.
pub(crate) async fn upstream_failure(provider: Provider, response: Response) -> AssistantError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    AssistantError::upstream(describe_failure(provider, status, &body))
}

fn describe_failure(provider: Provider, status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!("{} API error {}: {}", provider.as_str(), status, envelope.error.message),
        Err(_) => format!("{} API error {}: {}", provider.as_str(), status, body.trim()),
    }
}

/// Non-empty text or an `UpstreamError`.
pub(crate) fn require_text(provider: Provider, text: String) -> Result<String, AssistantError> {
    if text.trim().is_empty() {
        Err(AssistantError::upstream(format!(
            "{} returned no usable text",
            provider.as_str()
        )))
    } else {
        Ok(text)
    }
}
