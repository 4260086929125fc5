//! Dashboard Assistant - AI business assistant for small-business dashboards
//!
//! This library provides the core functionality behind the dashboard chat:
//! - Context aggregation from the hosted data service
//! - Conversation sessions with a single in-flight request
//! - Cleanup of model replies for plain-text display
//! - Identity and navbar state from the local session marker
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      App shell                       │
//! │   Config  │  Identity  │  Navbar  │  ChatSession     │
//! └──────────┬──────────────────────────────┬───────────┘
//!            │                              │
//! ┌──────────▼──────────┐        ┌──────────▼──────────┐
//! │  ContextAggregator  │        │    TextGenerator     │
//! │  Records/DataStore  │        │    (Gemini API)      │
//! └──────────┬──────────┘        └─────────────────────┘
//!            │
//! ┌──────────▼──────────────────────────────────────────┐
//! │           Data service (PostgREST tables)            │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod chat;
pub mod config;
pub mod context;
pub mod error;
pub mod generate;
pub mod identity;
pub mod store;

pub use app::App;
pub use chat::{ChatSession, Message, SendOutcome, Sender, SessionState, clean};
pub use config::Config;
pub use context::{ContextAggregator, ContextHandle, ContextSource, UserContext};
pub use error::{Error, Result};
pub use generate::{TextGenerator, gemini::GeminiClient};
pub use identity::{Identity, Navbar, NavbarVariant, SessionMarker, StoredUser};
pub use store::{DataStore, Period, Records, RestDataStore};
