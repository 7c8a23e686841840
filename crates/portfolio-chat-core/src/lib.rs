pub mod ai;
pub mod config;
pub mod conversation;
pub mod error;
pub mod knowledge;
pub mod prompt;
pub mod provider;
pub mod state;
pub mod widget;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use ai::{build_backend, ClaudeClient, GeminiClient, ModelBackend, ModelClient, OpenAIClient};
pub use config::Config;
pub use conversation::ConversationStore;
pub use error::AssistantError;
pub use knowledge::{KnowledgeContext, KnowledgeLoader, KnowledgeSource};
pub use prompt::PromptBuilder;
pub use provider::Provider;
pub use state::{ChatMessage, ChatRole, MessageId, RequestState, WidgetState};
pub use widget::{SubmitOutcome, WidgetController};
