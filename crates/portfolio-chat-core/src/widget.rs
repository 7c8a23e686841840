//! Widget visibility state machine and the per-turn send pipeline.

use crate::ai::{ModelClient, PendingReply};
use crate::conversation::ConversationStore;
use crate::error::AssistantError;
use crate::knowledge::KnowledgeContext;
use crate::prompt::PromptBuilder;
use crate::state::{ChatMessage, ChatRole, RequestState, WidgetState};

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing happened: blank input, widget not open, or a request in flight.
    Rejected,
    /// The question was appended and the model call is pending.
    Sent,
    /// The question was appended but failed before reaching the network.
    Failed(AssistantError),
}

pub struct WidgetController {
    state: WidgetState,
    request: RequestState,
    conversation: ConversationStore,
    knowledge: KnowledgeContext,
    prompts: PromptBuilder,
    client: ModelClient,
    pending: Option<PendingReply>,
    scroll_requested: bool,
}

impl WidgetController {
    pub fn new(
        greeting: &str,
        knowledge: KnowledgeContext,
        prompts: PromptBuilder,
        client: ModelClient,
    ) -> Self {
        Self {
            state: WidgetState::Closed,
            request: RequestState::Idle,
            conversation: ConversationStore::new(greeting),
            knowledge,
            prompts,
            client,
            pending: None,
            scroll_requested: false,
        }
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn request_state(&self) -> RequestState {
        self.request
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.conversation.all()
    }

    pub fn is_pending(&self) -> bool {
        self.request.is_pending()
    }

    /// True when typing and submitting are allowed.
    pub fn accepts_input(&self) -> bool {
        self.state == WidgetState::Open && !self.request.is_pending()
    }

    pub fn open(&mut self) -> bool {
        match self.state {
            WidgetState::Open => false,
            WidgetState::Closed | WidgetState::Minimized => {
                self.transition(WidgetState::Open);
                true
            }
        }
    }

    pub fn close(&mut self) -> bool {
        match self.state {
            WidgetState::Closed => false,
            WidgetState::Open | WidgetState::Minimized => {
                self.transition(WidgetState::Closed);
                true
            }
        }
    }

    /// Open ↔ Minimized. Does nothing while Closed.
    pub fn toggle_minimize(&mut self) -> bool {
        match self.state {
            WidgetState::Closed => false,
            WidgetState::Open => {
                self.transition(WidgetState::Minimized);
                true
            }
            WidgetState::Minimized => {
                self.transition(WidgetState::Open);
                true
            }
        }
    }

    fn transition(&mut self, next: WidgetState) {
        log::debug!("widget {:?} -> {:?}", self.state, next);
        self.state = next;
        if next == WidgetState::Open {
            self.scroll_requested = true;
        }
    }

    /// Returns whether the host should scroll the transcript to its latest
    /// message, clearing the request.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }

    pub fn submit(&mut self, input: &str) -> SubmitOutcome {
        if input.trim().is_empty() || !self.accepts_input() {
            return SubmitOutcome::Rejected;
        }

        let Some(slot) = self.client.try_acquire() else {
            log::warn!("submit ignored: a request is already in flight");
            return SubmitOutcome::Rejected;
        };

        self.append(ChatRole::User, input);
        self.request = RequestState::Pending;

        let prompt = self.client.check_credential().and_then(|_| {
            self.prompts
                .build(self.knowledge.get(), input)?
                .ok_or(AssistantError::ContextUnavailable)
        });

        match prompt {
            Ok(prompt) => {
                log::debug!("built prompt ({} chars)", prompt.len());
                self.pending = Some(slot.send(prompt));
                SubmitOutcome::Sent
            }
            Err(err) => {
                drop(slot);
                self.fail(err.clone());
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Resolve the reply if it has already arrived, without waiting.
    pub async fn poll_reply(&mut self) -> Option<RequestState> {
        if self.pending.as_ref().is_some_and(PendingReply::is_finished) {
            self.wait_for_reply().await
        } else {
            None
        }
    }

    /// Wait for the outstanding reply and record it in the transcript.
    /// Returns `Succeeded` or `Failed`, or `None` if nothing was pending.
    pub async fn wait_for_reply(&mut self) -> Option<RequestState> {
        let pending = self.pending.take()?;

        match pending.wait().await {
            Ok(text) => {
                self.append(ChatRole::Assistant, text);
                // Succeeded is reported to the caller; the widget settles back to Idle
                self.request = RequestState::Idle;
                Some(RequestState::Succeeded)
            }
            Err(err) => {
                self.fail(err);
                Some(RequestState::Failed)
            }
        }
    }

    fn fail(&mut self, err: AssistantError) {
        log::warn!("assistant turn failed: {}", err);
        self.append(ChatRole::Assistant, err.explanation());
        self.request = RequestState::Failed;
    }

    fn append(&mut self, role: ChatRole, content: impl Into<String>) {
        self.conversation.append(role, content);
        self.scroll_requested = true;
    }
}
