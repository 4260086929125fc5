//! Text generation backends

pub mod gemini;

use async_trait::async_trait;

use crate::Result;
use crate::chat::Message;
use crate::context::ContextHandle;

pub use gemini::GeminiClient;

/// Instruction describing the assistant's role
pub const ASSISTANT_INSTRUCTION: &str = "You are an AI business assistant for small-business owners. \
Help with website copy, marketing ideas, business strategy, email campaigns and social media. \
Give practical, specific answers in plain text; keep formatting light.";

/// A hosted text-generation service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Produce a reply to `message` following the `prior` turns
    ///
    /// `context` is read when the request is built; a load that completes
    /// after that only reaches later calls.
    async fn generate(
        &self,
        prior: &[Message],
        message: &str,
        context: &ContextHandle,
    ) -> Result<String>;
}

/// Full system instruction, with the user's context appended when available
#[must_use]
pub fn system_instruction(context: &ContextHandle) -> String {
    let rendered = context.latest().map(|c| c.render()).unwrap_or_default();
    if rendered.is_empty() {
        ASSISTANT_INSTRUCTION.to_string()
    } else {
        format!(
            "{ASSISTANT_INSTRUCTION}\n\nWhat you know about this user and their business:\n\n{rendered}"
        )
    }
}
