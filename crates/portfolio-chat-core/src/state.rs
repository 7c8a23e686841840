//! UI-agnostic assistant state types
//!
//! This module contains data structures that are shared between the widget
//! controller and whatever host renders it, and don't depend on any specific
//! UI framework.

use chrono::{DateTime, Local};
use std::fmt;

/// Sequence number of a message within one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chat message in the assistant conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// Visibility of the widget. Minimized is only reachable from Open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Closed,
    Open,
    Minimized,
}

/// Lifecycle of the single outstanding model call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending)
    }
}
