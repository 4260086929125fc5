//! Chat with the business assistant

pub mod cleanup;
pub mod session;
pub mod transcript;

pub use cleanup::clean;
pub use session::{
    ChatSession, FALLBACK_REPLY, GREETING, RejectReason, SendOutcome, SessionState,
};
pub use transcript::{Message, Sender, Transcript};
