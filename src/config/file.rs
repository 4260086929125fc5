//! TOML configuration file loading
//!
//! Supports `~/.config/dashboard-assistant/config.toml` as a persistent config
//! source. All fields are optional; the file is a partial overlay on top of
//! defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Env var naming an alternate config file
pub const CONFIG_PATH_ENV: &str = "ASSISTANT_CONFIG";

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Data service connection
    #[serde(default)]
    pub store: StoreFileConfig,

    /// Text generation service
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Local session marker
    #[serde(default)]
    pub session: SessionFileConfig,
}

/// Data service configuration
#[derive(Debug, Default, Deserialize)]
pub struct StoreFileConfig {
    /// Project URL (e.g. "https://abc.supabase.co")
    pub url: Option<String>,

    /// Public anon key
    pub anon_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// LLM-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct LlmFileConfig {
    /// Model identifier (e.g. "gemini-1.5-flash")
    pub model: Option<String>,

    pub api_key: Option<String>,

    /// Override for the generation API root
    pub base_url: Option<String>,

    pub temperature: Option<f32>,

    /// Reply length cap
    pub max_output_tokens: Option<u32>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionFileConfig {
    pub marker_path: Option<String>,
}

/// Load the TOML config file from `ASSISTANT_CONFIG` or the standard path
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
#[must_use]
pub fn load_config_file() -> ConfigFile {
    let path = std::env::var(CONFIG_PATH_ENV)
        .ok()
        .map(PathBuf::from)
        .or_else(config_file_path);

    path.map_or_else(ConfigFile::default, |p| load_from(&p))
}

/// Load a config file from an explicit path
#[must_use]
pub fn load_from(path: &Path) -> ConfigFile {
    if !path.exists() {
        return ConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/dashboard-assistant/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| {
        d.config_dir()
            .join("dashboard-assistant")
            .join("config.toml")
    })
}
