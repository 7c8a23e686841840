//! Failure taxonomy for a single assistant turn.
//!
//! Every variant is converted into an assistant-authored transcript entry by
//! the widget controller, so the host page never sees these as faults. The
//! `Display` form carries diagnostic detail for logs; `explanation()` is the
//! fixed, user-facing text.

use thiserror::Error;

pub const MISSING_CREDENTIAL_EXPLANATION: &str =
    "The assistant isn't configured yet: no API key was found for the language model service.";

pub const CONTEXT_UNAVAILABLE_EXPLANATION: &str =
    "My knowledge document hasn't loaded yet. Please try again in a moment.";

pub const TRANSPORT_FAILURE_EXPLANATION: &str =
    "I couldn't reach the language model service. Please check your connection and try again.";

pub const UPSTREAM_ERROR_EXPLANATION: &str =
    "Sorry, the language model service returned an error. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistantError {
    /// No API key for the named provider.
    #[error("no API key configured for {0}")]
    MissingCredential(String),

    #[error("knowledge context is not loaded")]
    ContextUnavailable,

    /// Network or connection level failure, including timeouts.
    #[error("transport failure: {0}")]
    TransportFailure(String),

    /// The service answered but reported failure or returned no usable text.
    #[error("upstream error: {0}")]
    UpstreamError(String),
}

impl AssistantError {
    pub fn explanation(&self) -> &'static str {
        match self {
            AssistantError::MissingCredential(_) => MISSING_CREDENTIAL_EXPLANATION,
            AssistantError::ContextUnavailable => CONTEXT_UNAVAILABLE_EXPLANATION,
            AssistantError::TransportFailure(_) => TRANSPORT_FAILURE_EXPLANATION,
            AssistantError::UpstreamError(_) => UPSTREAM_ERROR_EXPLANATION,
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        AssistantError::TransportFailure(detail.into())
    }

    pub fn upstream(detail: impl Into<String>) -> Self {
        AssistantError::UpstreamError(detail.into())
    }
}

impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        // A response arrived but could not be used
        if err.is_decode() || err.is_status() {
            return AssistantError::upstream(err.to_string());
        }
        AssistantError::transport(err.to_string())
    }
}
