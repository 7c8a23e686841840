use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use portfolio_chat_core::error::TRANSPORT_FAILURE_EXPLANATION;
use portfolio_chat_core::{
    AssistantError, ChatRole, KnowledgeContext, ModelBackend, ModelClient, PromptBuilder, Provider,
    RequestState, SubmitOutcome, WidgetController, WidgetState,
};

/// Backend that replays canned outcomes and records every prompt it sees.
struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, AssistantError>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    gate: Option<Notify>,
    credential: bool,
}

impl ScriptedBackend {
    fn new(replies: Vec<Result<String, AssistantError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            gate: None,
            credential: true,
        }
    }

    fn gated(mut self) -> Self {
        self.gate = Some(Notify::new());
        self
    }

    fn without_credential(mut self) -> Self {
        self.credential = false;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn has_credential(&self) -> bool {
        self.credential
    }

    async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("default reply".to_string()))
    }
}

const RESUME: &str = "Languages: Rust, TypeScript, Python.\nEducation: BSc Computer Science.";

fn controller(backend: Arc<ScriptedBackend>, context: KnowledgeContext) -> WidgetController {
    WidgetController::new(
        "Hi! Ask me anything.",
        context,
        PromptBuilder::new("Ada"),
        ModelClient::new(backend),
    )
}

#[tokio::test]
async fn fresh_widget_answers_first_question() {
    let backend = Arc::new(ScriptedBackend::new(vec![Ok(
        "Rust, TypeScript and Python.".to_string()
    )]));
    let mut widget = controller(backend.clone(), KnowledgeContext::from_text(RESUME));

    assert_eq!(widget.messages().len(), 1);

    widget.open();
    assert_eq!(widget.submit("What languages do you know?"), SubmitOutcome::Sent);
    assert_eq!(widget.wait_for_reply().await, Some(RequestState::Succeeded));

    let messages = widget.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].role, ChatRole::Assistant);
    assert_eq!(messages[2].content, "Rust, TypeScript and Python.");
}

#[tokio::test]
async fn prompt_carries_only_context_and_current_question() {
    let backend = Arc::new(ScriptedBackend::new(vec![]));
    let mut widget = controller(backend.clone(), KnowledgeContext::from_text(RESUME));
    widget.open();

    widget.submit("Where did you study?");
    widget.wait_for_reply().await;
    widget.submit("What languages do you know?");
    widget.wait_for_reply().await;

    let prompts = backend.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains(RESUME));
    assert!(prompts[1].contains("What languages do you know?"));
    assert!(!prompts[1].contains("Where did you study?"));
    assert!(!prompts[1].contains("default reply"));
}

#[tokio::test]
async fn successful_sends_grow_transcript_by_two() {
    let backend = Arc::new(ScriptedBackend::new(vec![]));
    let mut widget = controller(backend.clone(), KnowledgeContext::from_text(RESUME));
    widget.open();

    for question in ["one", "two?", "  three  ", "four\nlines"] {
        let before = widget.messages().len();
        assert_eq!(widget.submit(question), SubmitOutcome::Sent);
        widget.wait_for_reply().await;
        assert_eq!(widget.messages().len(), before + 2);

        let tail = &widget.messages()[before..];
        assert_eq!(tail[0].role, ChatRole::User);
        assert_eq!(tail[1].role, ChatRole::Assistant);
    }
}

#[tokio::test]
async fn second_submit_while_pending_is_ignored() {
    let backend = Arc::new(ScriptedBackend::new(vec![Ok("first".to_string())]).gated());
    let mut widget = controller(backend.clone(), KnowledgeContext::from_text(RESUME));
    widget.open();

    assert_eq!(widget.submit("first question"), SubmitOutcome::Sent);
    let snapshot = widget.messages().to_vec();

    assert_eq!(widget.submit("second question"), SubmitOutcome::Rejected);
    assert_eq!(widget.messages(), snapshot.as_slice());
    assert_eq!(widget.request_state(), RequestState::Pending);

    backend.release();
    assert_eq!(widget.wait_for_reply().await, Some(RequestState::Succeeded));
    assert_eq!(widget.messages().len(), 3);
    assert_eq!(backend.calls(), 1);

    // Resubmittable once resolved
    assert_eq!(widget.submit("second question"), SubmitOutcome::Sent);
    backend.release();
    widget.wait_for_reply().await;
    assert_eq!(widget.messages().len(), 5);
}

#[tokio::test]
async fn empty_context_appends_one_explanation_without_calling_model() {
    let backend = Arc::new(ScriptedBackend::new(vec![]));
    let mut widget = controller(backend.clone(), KnowledgeContext::new());
    widget.open();

    let outcome = widget.submit("What languages do you know?");
    assert_eq!(outcome, SubmitOutcome::Failed(AssistantError::ContextUnavailable));

    let messages = widget.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].role, ChatRole::Assistant);
    assert_eq!(
        messages[2].content,
        AssistantError::ContextUnavailable.explanation()
    );
    assert_eq!(widget.request_state(), RequestState::Failed);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn missing_credential_is_reported_before_network() {
    let backend = Arc::new(ScriptedBackend::new(vec![]).without_credential());
    let mut widget = controller(backend.clone(), KnowledgeContext::from_text(RESUME));
    widget.open();

    let outcome = widget.submit("hello?");
    assert_eq!(
        outcome,
        SubmitOutcome::Failed(AssistantError::MissingCredential("gemini".to_string()))
    );
    assert_eq!(widget.messages().len(), 3);
    assert_eq!(backend.calls(), 0);
    assert!(widget.accepts_input());
}

#[tokio::test]
async fn transport_failure_uses_fixed_explanation() {
    let backend = Arc::new(ScriptedBackend::new(vec![Err(AssistantError::transport(
        "connection reset by peer",
    ))]));
    let mut widget = controller(backend.clone(), KnowledgeContext::from_text(RESUME));
    widget.open();

    widget.submit("Are you there?");
    assert_eq!(widget.wait_for_reply().await, Some(RequestState::Failed));

    assert_eq!(widget.request_state(), RequestState::Failed);
    assert_eq!(
        widget.messages().last().map(|m| m.content.as_str()),
        Some(TRANSPORT_FAILURE_EXPLANATION)
    );
    assert!(widget.accepts_input());
}

#[tokio::test]
async fn recovers_after_upstream_error() {
    let backend = Arc::new(ScriptedBackend::new(vec![
        Err(AssistantError::upstream("status 500")),
        Ok("Back online.".to_string()),
    ]));
    let mut widget = controller(backend.clone(), KnowledgeContext::from_text(RESUME));
    widget.open();

    widget.submit("first");
    assert_eq!(widget.wait_for_reply().await, Some(RequestState::Failed));

    assert_eq!(widget.submit("again"), SubmitOutcome::Sent);
    assert_eq!(widget.wait_for_reply().await, Some(RequestState::Succeeded));
    assert_eq!(widget.messages().last().unwrap().content, "Back online.");
    assert_eq!(widget.messages().len(), 5);
}

#[tokio::test]
async fn minimize_round_trip_preserves_transcript() {
    let backend = Arc::new(ScriptedBackend::new(vec![]));
    let mut widget = controller(backend.clone(), KnowledgeContext::from_text(RESUME));
    widget.open();
    widget.submit("hello");
    widget.wait_for_reply().await;

    let before = widget.messages().to_vec();
    widget.toggle_minimize();
    assert_eq!(widget.state(), WidgetState::Minimized);
    widget.toggle_minimize();
    assert_eq!(widget.state(), WidgetState::Open);

    assert_eq!(widget.messages(), before.as_slice());
}

#[tokio::test]
async fn message_ids_strictly_increase() {
    let backend = Arc::new(ScriptedBackend::new(vec![
        Ok("a".to_string()),
        Err(AssistantError::upstream("bad")),
        Ok("c".to_string()),
    ]));
    let mut widget = controller(backend.clone(), KnowledgeContext::from_text(RESUME));
    widget.open();

    for q in ["1", "2", "3"] {
        widget.submit(q);
        widget.wait_for_reply().await;
    }

    let ids: Vec<_> = widget.messages().iter().map(|m| m.id).collect();
    assert_eq!(ids.len(), 7);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn reply_lands_even_if_widget_closed_meanwhile() {
    let backend = Arc::new(ScriptedBackend::new(vec![Ok("late answer".to_string())]).gated());
    let mut widget = controller(backend.clone(), KnowledgeContext::from_text(RESUME));
    widget.open();
    widget.submit("slow question");
    widget.close();

    backend.release();
    widget.wait_for_reply().await;

    assert_eq!(widget.state(), WidgetState::Closed);
    assert_eq!(widget.messages().last().unwrap().content, "late answer");
}
