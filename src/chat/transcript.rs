//! Append-only message log for one conversation

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who sent a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Position-independent identifier, strictly increasing per transcript
    pub id: u64,
    pub sender: Sender,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// Ordered log of exchanged messages
///
/// Messages are only ever appended. Identifiers start at 1 and increase by
/// one per message.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    /// Number of leading messages that are local to the surface (the
    /// greeting) and never forwarded to the generator
    preamble: usize,
}

impl Transcript {
    /// Create an empty transcript
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
            preamble: 0,
        }
    }

    /// Create a transcript opened by an assistant greeting
    #[must_use]
    pub fn with_greeting(greeting: &str) -> Self {
        let mut transcript = Self::new();
        transcript.push(Sender::Assistant, greeting);
        transcript.preamble = 1;
        transcript
    }

    /// Append a message and return a copy of it
    pub fn push(&mut self, sender: Sender, text: impl Into<String>) -> Message {
        let id = self.messages.last().map_or(1, |m| m.id + 1);
        let message = Message {
            id,
            sender,
            text: text.into(),
            sent_at: Utc::now(),
        };
        self.messages.push(message.clone());
        message
    }

    /// All messages in sending order
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages exchanged after the greeting, in sending order
    #[must_use]
    pub fn conversation(&self) -> &[Message] {
        &self.messages[self.preamble.min(self.messages.len())..]
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut transcript = Transcript::new();
        let a = transcript.push(Sender::User, "hi");
        let b = transcript.push(Sender::Assistant, "hello");
        let c = transcript.push(Sender::User, "bye");

        assert_eq!((a.id, b.id, c.id), (1, 2, 3));
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.last().map(|m| m.sender), Some(Sender::User));
    }

    #[test]
    fn test_greeting_excluded_from_conversation() {
        let mut transcript = Transcript::with_greeting("Welcome");
        assert_eq!(transcript.len(), 1);
        assert!(transcript.conversation().is_empty());

        transcript.push(Sender::User, "What should I post today?");
        let conversation = transcript.conversation();
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation[0].id, 2);
        assert_eq!(conversation[0].text, "What should I post today?");
    }

    #[test]
    fn test_sender_serializes_lowercase() {
        let json = serde_json::to_string(&Sender::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
