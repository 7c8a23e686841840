use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::knowledge::KnowledgeSource;
use crate::prompt::DEFAULT_OWNER_NAME;
use crate::provider::Provider;

pub const DEFAULT_KNOWLEDGE_SOURCE: &str = "resume.txt";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub claude_api_key: Option<String>,
    pub knowledge_source: Option<String>,
    pub owner_name: Option<String>,
    pub greeting: Option<String>,
    /// Seconds to wait for the model. `0` waits indefinitely.
    pub request_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            provider: Some(Provider::Gemini.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {:?}: {}", path, e))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("portfolio-chat"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn provider(&self) -> Provider {
        self.provider
            .as_deref()
            .and_then(Provider::from_str)
            .unwrap_or_default()
    }

    pub fn model(&self) -> String {
        self.model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.provider().default_model().to_string())
    }

    /// Environment first, then the config file. Blank values count as absent.
    pub fn api_key_for(&self, provider: Provider) -> Option<String> {
        resolve_key(std::env::var(provider.api_key_env()).ok(), self.stored_key(provider))
    }

    fn stored_key(&self, provider: Provider) -> Option<String> {
        match provider {
            Provider::Gemini => self.gemini_api_key.clone(),
            Provider::OpenAI => self.openai_api_key.clone(),
            Provider::Claude => self.claude_api_key.clone(),
        }
    }

    pub fn knowledge_source(&self) -> KnowledgeSource {
        KnowledgeSource::parse(
            self.knowledge_source
                .as_deref()
                .unwrap_or(DEFAULT_KNOWLEDGE_SOURCE),
        )
    }

    pub fn owner_name(&self) -> String {
        self.owner_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OWNER_NAME.to_string())
    }

    pub fn greeting(&self) -> String {
        match &self.greeting {
            Some(greeting) if !greeting.trim().is_empty() => greeting.clone(),
            _ => match &self.owner_name {
                Some(name) if !name.trim().is_empty() => format!(
                    "Hi! I'm {}'s AI assistant. Ask me anything about their work, skills, or experience!",
                    name.trim()
                ),
                _ => "Hi! I'm the portfolio's AI assistant. Ask me anything about the work, skills, or experience shown here!".to_string(),
            },
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn resolve_key(env_value: Option<String>, stored: Option<String>) -> Option<String> {
    env_value
        .filter(|k| !k.trim().is_empty())
        .or_else(|| stored.filter(|k| !k.trim().is_empty()))
}
