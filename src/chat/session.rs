//! Conversation session: transcript, lockout and generator round trips

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use super::cleanup::clean;
use super::transcript::{Message, Sender, Transcript};
use crate::context::{ContextAggregator, ContextHandle, context_slot};
use crate::generate::TextGenerator;

/// First message of every session
pub const GREETING: &str = "Hello! I'm your AI business assistant powered by Gemini. \
I can help you with website copy, marketing ideas, business strategies, and more. \
What would you like to work on today?";

/// Shown instead of a reply when generation fails
pub const FALLBACK_REPLY: &str = "I apologize, but I'm having trouble connecting right now. \
Please check your internet connection and try again.";

/// Whether the session can take input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResponse,
}

/// Why a submission was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Input was empty or whitespace only
    Empty,
    /// A reply is still pending
    Busy,
}

/// Result of [`ChatSession::send`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was appended and no request was made
    Rejected(RejectReason),
    /// The cleaned model reply that was appended
    Replied(Message),
    /// The fallback message appended after a failed request
    Fallback(Message),
}

impl SendOutcome {
    /// Message appended for the assistant, if any
    #[must_use]
    pub const fn reply(&self) -> Option<&Message> {
        match self {
            Self::Rejected(_) => None,
            Self::Replied(m) | Self::Fallback(m) => Some(m),
        }
    }
}

#[derive(Debug)]
struct Inner {
    transcript: Transcript,
    state: SessionState,
}

/// One conversation with the assistant
///
/// At most one generation request is outstanding at a time; input submitted
/// meanwhile is rejected, not queued. The transcript only grows.
pub struct ChatSession {
    id: Uuid,
    inner: Mutex<Inner>,
    generator: Arc<dyn TextGenerator>,
    context: ContextHandle,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("id", &self.id)
            .field("generator", &self.generator.name())
            .finish_non_exhaustive()
    }
}

/// Returns the session to `Idle` if a request is abandoned mid-flight
struct InFlight<'a> {
    session: &'a ChatSession,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!(session_id = %self.session.id, "reply abandoned, discarding");
            self.session.lock().state = SessionState::Idle;
        }
    }
}

impl ChatSession {
    /// Create a session using an already prepared context handle
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>, context: ContextHandle) -> Self {
        Self {
            id: Uuid::new_v4(),
            inner: Mutex::new(Inner {
                transcript: Transcript::with_greeting(GREETING),
                state: SessionState::Idle,
            }),
            generator,
            context,
        }
    }

    /// Start a session and load the user's context in the background
    ///
    /// Input is accepted immediately; the context is attached to requests
    /// once the load finishes. Without a user id no context is loaded.
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn start(
        generator: Arc<dyn TextGenerator>,
        aggregator: ContextAggregator,
        user_id: Option<String>,
    ) -> Self {
        let (slot, handle) = context_slot();
        let session = Self::new(generator, handle);

        if let Some(user_id) = user_id {
            let session_id = session.id;
            tokio::spawn(async move {
                tracing::info!(%session_id, user_id = %user_id, "loading user context");
                let context = aggregator.load(&user_id).await;
                slot.fill(context);
                tracing::info!(%session_id, "user context loaded");
            });
        }

        session
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Handle to the context attached to requests
    #[must_use]
    pub const fn context(&self) -> &ContextHandle {
        &self.context
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Snapshot of the transcript
    #[must_use]
    pub fn transcript(&self) -> Vec<Message> {
        self.lock().transcript.messages().to_vec()
    }

    /// Submit user input and wait for the assistant's reply
    ///
    /// The user message is appended before the request is sent. A failed
    /// request appends [`FALLBACK_REPLY`]; the error itself is only logged.
    pub async fn send(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Rejected(RejectReason::Empty);
        }

        let prior = {
            let mut inner = self.lock();
            if inner.state == SessionState::AwaitingResponse {
                tracing::debug!(session_id = %self.id, "reply pending, input rejected");
                return SendOutcome::Rejected(RejectReason::Busy);
            }
            let prior = inner.transcript.conversation().to_vec();
            inner.transcript.push(Sender::User, text);
            inner.state = SessionState::AwaitingResponse;
            prior
        };

        let mut in_flight = InFlight {
            session: self,
            armed: true,
        };
        let result = self.generator.generate(&prior, text, &self.context).await;
        in_flight.armed = false;

        let mut inner = self.lock();
        inner.state = SessionState::Idle;
        match result {
            Ok(raw) => {
                let message = inner.transcript.push(Sender::Assistant, clean(&raw));
                tracing::debug!(session_id = %self.id, message_id = message.id, "reply received");
                SendOutcome::Replied(message)
            }
            Err(e) => {
                tracing::error!(
                    session_id = %self.id,
                    generator = self.generator.name(),
                    error = %e,
                    "error getting AI response"
                );
                SendOutcome::Fallback(inner.transcript.push(Sender::Assistant, FALLBACK_REPLY))
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
