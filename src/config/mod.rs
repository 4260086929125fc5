//! Configuration management for the dashboard assistant

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::generate::gemini::{
    DEFAULT_BASE_URL, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE,
    DEFAULT_TIMEOUT as DEFAULT_LLM_TIMEOUT,
};
use crate::store::rest::DEFAULT_TIMEOUT as DEFAULT_STORE_TIMEOUT;

/// Store URL used when none is configured
pub const PLACEHOLDER_STORE_URL: &str = "https://your-project.supabase.co";

/// Store key used when none is configured
pub const PLACEHOLDER_STORE_KEY: &str = "your-anon-key";

/// Default generation model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Dashboard assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Data service connection
    pub store: StoreConfig,

    /// Text generation service
    pub llm: LlmConfig,

    /// Path of the session marker written by the auth flow
    pub marker_path: PathBuf,

    /// Path to data directory
    pub data_dir: PathBuf,
}

/// Data service connection
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub anon_key: SecretString,

    /// A request running longer counts as unreachable
    pub timeout: Duration,
}

/// Text generation configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model identifier
    pub model: String,

    /// API key (from `GEMINI_API_KEY` env); chat is unavailable without it
    pub api_key: Option<SecretString>,

    pub base_url: String,

    pub temperature: f32,

    /// Reply length cap
    pub max_output_tokens: u32,

    /// A request running longer fails and the chat falls back
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from the environment and config file
    ///
    /// Priority is env > toml > default.
    #[must_use]
    pub fn load() -> Self {
        let fc = file::load_config_file();
        let config = Self::resolve(fc, |key| std::env::var(key).ok());

        if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
            tracing::warn!(
                path = %config.data_dir.display(),
                error = %e,
                "failed to create data directory"
            );
        }

        if config.store_is_placeholder() {
            tracing::warn!(
                url = %config.store.url,
                "data service is not configured, set ASSISTANT_STORE_URL and ASSISTANT_STORE_KEY"
            );
        }

        config
    }

    /// Resolve configuration from a parsed file and an env lookup
    #[must_use]
    pub fn resolve(fc: file::ConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = default_data_dir();

        let store = StoreConfig {
            url: env("ASSISTANT_STORE_URL")
                .or(fc.store.url)
                .unwrap_or_else(|| PLACEHOLDER_STORE_URL.to_string()),
            anon_key: SecretString::from(
                env("ASSISTANT_STORE_KEY")
                    .or(fc.store.anon_key)
                    .unwrap_or_else(|| PLACEHOLDER_STORE_KEY.to_string()),
            ),
            timeout: env("ASSISTANT_STORE_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .or(fc.store.timeout_secs)
                .map_or(DEFAULT_STORE_TIMEOUT, Duration::from_secs),
        };

        let llm = LlmConfig {
            model: env("ASSISTANT_LLM_MODEL")
                .or(fc.llm.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: env("GEMINI_API_KEY")
                .or(fc.llm.api_key)
                .filter(|k| !k.trim().is_empty())
                .map(SecretString::from),
            base_url: env("ASSISTANT_LLM_BASE_URL")
                .or(fc.llm.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            temperature: fc.llm.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_output_tokens: fc.llm.max_output_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
            timeout: env("ASSISTANT_LLM_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .or(fc.llm.timeout_secs)
                .map_or(DEFAULT_LLM_TIMEOUT, Duration::from_secs),
        };

        let marker_path = env("ASSISTANT_SESSION_PATH")
            .or(fc.session.marker_path)
            .map_or_else(|| data_dir.join("session.json"), PathBuf::from);

        Self {
            store,
            llm,
            marker_path,
            data_dir,
        }
    }

    /// Whether the data service still points at the placeholder project
    #[must_use]
    pub fn store_is_placeholder(&self) -> bool {
        self.store.url == PLACEHOLDER_STORE_URL
            || self.store.anon_key.expose_secret() == PLACEHOLDER_STORE_KEY
    }
}

/// Data directory: `~/.local/share/dashboard-assistant` on Linux
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".local/share/dashboard-assistant"),
        |d| d.data_dir().join("dashboard-assistant"),
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::resolve(file::ConfigFile::default(), env_from(&[]));
        assert_eq!(config.store.url, PLACEHOLDER_STORE_URL);
        assert_eq!(config.llm.model, DEFAULT_MODEL);
        assert_eq!(config.llm.base_url, DEFAULT_BASE_URL);
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.llm.max_output_tokens, DEFAULT_MAX_OUTPUT_TOKENS);
        assert_eq!(config.llm.timeout, DEFAULT_LLM_TIMEOUT);
        assert_eq!(config.store.timeout, DEFAULT_STORE_TIMEOUT);
        assert!(config.store_is_placeholder());
        assert!(config.marker_path.ends_with("session.json"));
        assert!(config.marker_path.starts_with(&config.data_dir));
    }

    #[test]
    fn test_env_overrides_file() {
        let fc: file::ConfigFile = toml::from_str(
            r#"
[store]
url = "https://file.supabase.co"
anon_key = "file-key"

[llm]
model = "gemini-1.5-pro"
api_key = "file-gemini"
"#,
        )
        .unwrap();

        let config = Config::resolve(
            fc,
            env_from(&[
                ("ASSISTANT_STORE_URL", "https://env.supabase.co"),
                ("GEMINI_API_KEY", "env-gemini"),
                ("ASSISTANT_SESSION_PATH", "/tmp/marker.json"),
            ]),
        );

        assert_eq!(config.store.url, "https://env.supabase.co");
        assert_eq!(config.store.anon_key.expose_secret(), "file-key");
        assert_eq!(config.llm.model, "gemini-1.5-pro");
        assert_eq!(
            config.llm.api_key.as_ref().map(|k| k.expose_secret()),
            Some("env-gemini")
        );
        assert_eq!(config.marker_path, PathBuf::from("/tmp/marker.json"));
        assert!(!config.store_is_placeholder());
    }

    #[test]
    fn test_tuning_keys() {
        let fc: file::ConfigFile = toml::from_str(
            r#"
[store]
timeout_secs = 3

[llm]
temperature = 0.2
max_output_tokens = 512
timeout_secs = 20
"#,
        )
        .unwrap();

        let config = Config::resolve(fc, env_from(&[("ASSISTANT_LLM_TIMEOUT_SECS", "45")]));
        assert_eq!(config.store.timeout, Duration::from_secs(3));
        assert_eq!(config.llm.timeout, Duration::from_secs(45));
        assert_eq!(config.llm.max_output_tokens, 512);
        assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let config = Config::resolve(
            file::ConfigFile::default(),
            env_from(&[("GEMINI_API_KEY", "  ")]),
        );
        assert!(config.llm.api_key.is_none());
    }
}
