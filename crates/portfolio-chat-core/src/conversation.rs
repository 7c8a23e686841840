use chrono::Local;

use crate::state::{ChatMessage, ChatRole, MessageId};

/// Append-only transcript of the conversation.
///
/// Ids come from a sequence counter rather than the clock, so two messages
/// appended within the same instant still get distinct, ordered ids.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl ConversationStore {
    /// Create a transcript seeded with the assistant's greeting.
    pub fn new(greeting: &str) -> Self {
        let mut store = Self {
            messages: Vec::new(),
            next_id: 1,
        };
        store.append(ChatRole::Assistant, greeting);
        store
    }

    pub fn append(&mut self, role: ChatRole, content: impl Into<String>) -> &[ChatMessage] {
        let id = MessageId(self.next_id);
        self.next_id += 1;

        self.messages.push(ChatMessage {
            id,
            role,
            content: content.into(),
            timestamp: Local::now(),
        });

        log::debug!("appended {:?} message {}", role, id);
        &self.messages
    }

    pub fn all(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}
