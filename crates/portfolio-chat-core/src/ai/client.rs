//! Single-flight wrapper around a model backend.
//!
//! At most one request may be outstanding per client (and its clones). A
//! caller first reserves the slot with [`ModelClient::try_acquire`]; while the
//! slot is held every further acquire returns `None`, so a second send is a
//! no-op rather than a queued or parallel request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::ModelBackend;
use crate::error::AssistantError;

/// Clears the in-flight flag when dropped.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct ModelClient {
    backend: Arc<dyn ModelBackend>,
    in_flight: Arc<AtomicBool>,
    timeout: Option<Duration>,
}

impl ModelClient {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            backend,
            in_flight: Arc::new(AtomicBool::new(false)),
            timeout: None,
        }
    }

    /// `None` waits for the upstream indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn check_credential(&self) -> Result<(), AssistantError> {
        if self.backend.has_credential() {
            Ok(())
        } else {
            Err(AssistantError::MissingCredential(
                self.backend.provider().as_str().to_string(),
            ))
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Reserve the single request slot, or `None` if a request is in flight.
    pub fn try_acquire(&self) -> Option<RequestSlot> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;

        Some(RequestSlot {
            guard: InFlight(self.in_flight.clone()),
            backend: self.backend.clone(),
            timeout: self.timeout,
        })
    }
}

/// A reserved request slot. Dropping it unused releases the reservation.
pub struct RequestSlot {
    guard: InFlight,
    backend: Arc<dyn ModelBackend>,
    timeout: Option<Duration>,
}

impl RequestSlot {
    /// Spawn the model call. The slot stays held until the call resolves.
    pub fn send(self, prompt: String) -> PendingReply {
        let RequestSlot {
            guard,
            backend,
            timeout,
        } = self;

        let handle = tokio::spawn(async move {
            let _guard = guard;

            if !backend.has_credential() {
                return Err(AssistantError::MissingCredential(
                    backend.provider().as_str().to_string(),
                ));
            }

            log::info!(
                "sending prompt to {} ({} chars)",
                backend.provider().as_str(),
                prompt.len()
            );

            match timeout {
                Some(limit) => match tokio::time::timeout(limit, backend.generate(&prompt)).await {
                    Ok(result) => result,
                    Err(_) => Err(AssistantError::transport(format!(
                        "no response after {}s",
                        limit.as_secs()
                    ))),
                },
                None => backend.generate(&prompt).await,
            }
        });

        PendingReply { handle }
    }
}

/// The outstanding model call.
pub struct PendingReply {
    handle: JoinHandle<Result<String, AssistantError>>,
}

impl PendingReply {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn wait(self) -> Result<String, AssistantError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(AssistantError::upstream(format!("model task failed: {}", e))),
        }
    }
}
