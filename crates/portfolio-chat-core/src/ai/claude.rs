use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{require_text, upstream_failure, usable_key, ModelBackend};
use crate::error::AssistantError;
use crate::provider::Provider;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const MAX_TOKENS: u32 = 1024;

#[derive(Serialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ClaudeMessage>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl ClaudeClient {
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
            .ok_or_else(|| AssistantError::MissingCredential(Provider::Claude.as_str().to_string()))?;

        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(upstream_failure(Provider::Claude, response).await);
        }

        let claude_response: ClaudeResponse = response.json().await?;
        let text = claude_response
            .content
            .into_iter()
            .map(|c| c.text)
            .collect::<Vec<_>>()
            .join("");

        require_text(Provider::Claude, text)
    }
}

#[async_trait]
impl ModelBackend for ClaudeClient {
    fn provider(&self) -> Provider {
        Provider::Claude
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
        self.query(prompt).await
    }
}
