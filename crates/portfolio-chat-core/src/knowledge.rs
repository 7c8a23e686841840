//! Loading of the static knowledge document that grounds every answer.

use anyhow::{anyhow, Result};
use reqwest::Client;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;

/// Shared handle to the grounding text. Empty until the loader finishes,
/// written at most once, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeContext {
    text: Arc<OnceLock<String>>,
}

impl KnowledgeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that is ready from the start, for hosts that already hold the text.
    pub fn from_text(text: impl Into<String>) -> Self {
        let context = Self::new();
        context.set(text.into());
        context
    }

    /// Returns false if the context was already set.
    fn set(&self, text: String) -> bool {
        self.text.set(text).is_ok()
    }

    pub fn get(&self) -> &str {
        self.text.get().map(String::as_str).unwrap_or("")
    }

    /// Whitespace-only text counts as not loaded.
    pub fn is_ready(&self) -> bool {
        !self.get().trim().is_empty()
    }
}

/// Where the knowledge document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeSource {
    Url(String),
    File(PathBuf),
}

impl KnowledgeSource {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            KnowledgeSource::Url(s.to_string())
        } else {
            KnowledgeSource::File(PathBuf::from(s))
        }
    }
}

pub struct KnowledgeLoader {
    client: Client,
    source: KnowledgeSource,
    context: KnowledgeContext,
}

impl KnowledgeLoader {
    pub fn new(source: KnowledgeSource, context: KnowledgeContext) -> Self {
        Self {
            client: Client::new(),
            source,
            context,
        }
    }

    pub fn context(&self) -> KnowledgeContext {
        self.context.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.context.is_ready()
    }

    /// Start the one-shot fetch. Consumes the loader so it can't run twice.
    pub fn load(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        match self.fetch().await {
            Ok(text) => {
                let len = text.len();
                if self.context.set(text) {
                    log::info!("knowledge document loaded ({} bytes)", len);
                } else {
                    log::warn!("knowledge context was already set, ignoring reload");
                }
            }
            Err(e) => {
                log::error!("failed to load knowledge document: {:#}", e);
            }
        }
    }

    async fn fetch(&self) -> Result<String> {
        let text = match &self.source {
            KnowledgeSource::Url(url) => {
                let response = self.client.get(url).send().await?;

                if !response.status().is_success() {
                    return Err(anyhow!(
                        "knowledge request to {} failed with status: {}",
                        url,
                        response.status()
                    ));
                }

                response.text().await?
            }
            KnowledgeSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| anyhow!("Failed to read knowledge file {:?}: {}", path, e))?,
        };

        if text.trim().is_empty() {
            return Err(anyhow!("knowledge document is empty"));
        }

        Ok(text)
    }
}
