use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{require_text, upstream_failure, usable_key, ModelBackend};
use crate::error::AssistantError;
use crate::provider::Provider;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: Option<String>, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: usable_key(api_key),
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub async fn query(&self, prompt: &str) -> Result<String, AssistantError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| AssistantError::MissingCredential(Provider::OpenAI.as_str().to_string()))?;

        let request = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_failure(Provider::OpenAI, response).await);
        }

        let openai_response: OpenAIResponse = response.json().await?;
        let text = openai_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        require_text(Provider::OpenAI, text)
    }
}

#[async_trait]
impl ModelBackend for OpenAIClient {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
        self.query(prompt).await
    }
}
