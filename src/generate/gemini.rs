//! Gemini `generateContent` client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{TextGenerator, system_instruction};
use crate::chat::{Message, Sender};
use crate::context::ContextHandle;
use crate::{Error, Result};

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default cap on a whole generation request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default reply length cap
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;

/// Client for the Gemini REST API
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
    temperature: f32,
    max_output_tokens: u32,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default()
    }
}

impl<'a> Content<'a> {
    fn turn(role: &'static str, text: &'a str) -> Self {
        Self {
            role: Some(role),
            parts: vec![Part { text }],
        }
    }
}

const fn role_for(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "user",
        Sender::Assistant => "model",
    }
}

impl GeminiClient {
    /// Create a new client
    ///
    /// # Arguments
    ///
    /// * `base_url` - API host (e.g., [`DEFAULT_BASE_URL`])
    /// * `model` - Model identifier (e.g., "gemini-1.5-flash")
    /// * `api_key` - API key
    #[must_use]
    pub fn new(base_url: &str, model: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            client: http_client(DEFAULT_TIMEOUT),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    /// Give up on a request after `timeout`
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    /// Override sampling temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the reply length cap
    #[must_use]
    pub const fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(
        &self,
        prior: &[Message],
        message: &str,
        context: &ContextHandle,
    ) -> Result<String> {
        let instruction = system_instruction(context);

        let mut contents: Vec<Content<'_>> = prior
            .iter()
            .map(|m| Content::turn(role_for(m.sender), &m.text))
            .collect();
        contents.push(Content::turn("user", message));

        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: &instruction }],
            },
            contents,
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        tracing::debug!(
            model = %self.model,
            turns = body.contents.len(),
            "sending generation request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!("Gemini API error: {status} - {body}")));
        }

        let reply: GenerateResponse = response.json().await?;
        let text = reply.into_text();

        if text.trim().is_empty() {
            return Err(Error::Generation("empty response from model".to_string()));
        }

        Ok(text)
    }
}
