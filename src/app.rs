//! Application shell
//!
//! [`App`] owns the configuration, the resolved identity and the service
//! clients. Everything else is handed out from here instead of living in
//! globals.

use std::sync::Arc;

use crate::chat::ChatSession;
use crate::config::Config;
use crate::context::{ContextAggregator, UserContext};
use crate::generate::TextGenerator;
use crate::generate::gemini::GeminiClient;
use crate::identity::{Identity, Navbar, NavbarVariant, SessionMarker};
use crate::store::{DataStore, Records, RestDataStore};
use crate::{Error, Result};

/// The running assistant
pub struct App {
    config: Config,
    marker: SessionMarker,
    identity: Identity,
    store: Arc<dyn DataStore>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("identity", &self.identity)
            .field("generator", &self.generator.as_ref().map(|g| g.name()))
            .finish_non_exhaustive()
    }
}

impl App {
    /// Build the app from configuration
    ///
    /// Chat is unavailable when no generation API key is configured.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let store: Arc<dyn DataStore> = Arc::new(
            RestDataStore::new(&config.store.url, config.store.anon_key.clone())
                .with_timeout(config.store.timeout),
        );

        let generator = config.llm.api_key.clone().map(|key| {
            let gemini = GeminiClient::new(&config.llm.base_url, config.llm.model.clone(), key)
                .with_temperature(config.llm.temperature)
                .with_max_output_tokens(config.llm.max_output_tokens)
                .with_timeout(config.llm.timeout);
            tracing::debug!(model = gemini.model(), "generation enabled");
            Arc::new(gemini) as Arc<dyn TextGenerator>
        });
        if generator.is_none() {
            tracing::warn!("GEMINI_API_KEY not set, chat is disabled");
        }

        Self::with_services(config, store, generator)
    }

    /// Build the app around existing service clients
    #[must_use]
    pub fn with_services(
        config: Config,
        store: Arc<dyn DataStore>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        let marker = SessionMarker::new(&config.marker_path);
        let identity = marker.load();

        match &identity {
            Identity::Authenticated(user) => {
                tracing::info!(user_id = %user.id, "signed in");
            }
            Identity::Anonymous => tracing::info!("no signed-in user"),
        }

        Self {
            config,
            marker,
            identity,
            store,
            generator,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub const fn navbar(&self, variant: NavbarVariant) -> Navbar<'_> {
        Navbar::new(variant, &self.identity)
    }

    #[must_use]
    pub fn records(&self) -> Records {
        Records::new(Arc::clone(&self.store))
    }

    #[must_use]
    pub fn aggregator(&self) -> ContextAggregator {
        ContextAggregator::new(self.records())
    }

    /// Aggregated context for the signed-in user, if any
    pub async fn load_context(&self) -> Option<UserContext> {
        let user_id = self.identity.user_id()?;
        Some(self.aggregator().load(user_id).await)
    }

    /// Open a chat session for the current identity
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns error if no text generator is configured
    pub fn start_chat(&self) -> Result<ChatSession> {
        let generator = self
            .generator
            .clone()
            .ok_or_else(|| Error::Config("GEMINI_API_KEY is not set".to_string()))?;

        Ok(ChatSession::start(
            generator,
            self.aggregator(),
            self.identity.user_id().map(ToString::to_string),
        ))
    }

    /// Sign out locally
    ///
    /// # Errors
    ///
    /// Returns error if the session marker cannot be cleared
    pub fn logout(&mut self) -> Result<()> {
        let user_id = self.identity.user_id().map(ToString::to_string);
        self.marker.clear()?;
        self.identity = Identity::Anonymous;
        tracing::info!(user_id = ?user_id, "signed out");
        Ok(())
    }
}
