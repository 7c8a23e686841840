use crate::error::AssistantError;

pub const DEFAULT_OWNER_NAME: &str = "the site owner";

/// Builds the single grounded prompt sent per turn.
///
/// Only the knowledge context and the current question are included; earlier
/// turns of the conversation never reach the model.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    owner_name: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_OWNER_NAME)
    }
}

impl PromptBuilder {
    pub fn new(owner_name: impl Into<String>) -> Self {
        Self {
            owner_name: owner_name.into(),
        }
    }

    /// Returns `Ok(None)` when there is no question to ask.
    pub fn build(&self, context: &str, question: &str) -> Result<Option<String>, AssistantError> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(None);
        }

        if context.trim().is_empty() {
            return Err(AssistantError::ContextUnavailable);
        }

        let mut prompt = String::new();

        prompt.push_str(&format!(
            "You are a helpful assistant for {}'s portfolio website.\n",
            self.owner_name
        ));
        prompt.push_str(&format!(
            "Answer the user's question using ONLY the context provided below about {}.\n",
            self.owner_name
        ));
        prompt.push_str(
            "If the information is not in the context, politely say you don't have that information.\n",
        );
        prompt.push_str("Keep your answers concise, professional, and friendly.\n\n");

        prompt.push_str("CONTEXT:\n");
        prompt.push_str(context.trim());
        prompt.push_str("\n\n");

        prompt.push_str("USER QUESTION:\n");
        prompt.push_str(question);
        prompt.push('\n');

        Ok(Some(prompt))
    }
}
