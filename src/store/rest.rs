//! REST client for the hosted data service
//!
//! Speaks the PostgREST dialect exposed under `/rest/v1`: filters are query
//! parameters (`user_id=eq.abc`), ordering is `order=created_at.desc`, and
//! single-row reads ask for `application/vnd.pgrst.object+json`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};

use super::{Collection, DataStore, RecentQuery};
use crate::{Error, Result};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Default cap on a whole request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Data service client authenticated with the project's public key
pub struct RestDataStore {
    /// HTTP client
    client: Client,
    /// Project URL, without trailing slash
    base_url: String,
    /// Public (anon) key, sent as both `apikey` and bearer token
    api_key: SecretString,
}

impl std::fmt::Debug for RestDataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestDataStore")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RestDataStore {
    /// Create a new client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Project URL (e.g., <https://project.supabase.co>)
    /// * `api_key` - Public API key of the project
    #[must_use]
    pub fn new(base_url: &str, api_key: SecretString) -> Self {
        Self {
            client: http_client(DEFAULT_TIMEOUT),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Treat the service as unreachable after `timeout`
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection.table())
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        let key = self.api_key.expose_secret();
        req.header("apikey", key).bearer_auth(key)
    }

    async fn send(req: RequestBuilder) -> Result<Response> {
        req.send().await.map_err(transport_error)
    }
}

fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Map a transport failure, separating "never reached the service" from the rest
fn transport_error(e: reqwest::Error) -> Error {
    if e.is_connect() || e.is_timeout() {
        Error::Unreachable(e.to_string())
    } else {
        Error::Http(e)
    }
}

/// Turn a non-success response into a store error carrying status and body
async fn rejected(collection: Collection, response: Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Error::Store(format!("{collection}: {status} - {body}"))
}

fn eq_filter(value: &str) -> String {
    format!("eq.{}", urlencoding::encode(value))
}

#[async_trait]
impl DataStore for RestDataStore {
    async fn fetch_one(
        &self,
        collection: Collection,
        column: &str,
        value: &str,
    ) -> Result<serde_json::Value> {
        let url = format!(
            "{}?select=*&{column}={}",
            self.table_url(collection),
            eq_filter(value)
        );

        let req = self.authorized(self.client.get(&url)).header("Accept", SINGLE_OBJECT);
        let response = Self::send(req).await?;

        // PostgREST answers 406 when the single-object request matched zero
        // (or several) rows
        if response.status() == StatusCode::NOT_ACCEPTABLE {
            return Err(Error::NotFound(format!(
                "{collection} where {column} = {value}"
            )));
        }

        if !response.status().is_success() {
            return Err(rejected(collection, response).await);
        }

        Ok(response.json().await?)
    }

    async fn fetch_recent(
        &self,
        collection: Collection,
        user_id: &str,
        query: &RecentQuery,
    ) -> Result<Vec<serde_json::Value>> {
        let mut url = format!(
            "{}?select=*&user_id={}&order=created_at.desc",
            self.table_url(collection),
            eq_filter(user_id)
        );
        if let Some(since) = query.since {
            url.push_str(&format!(
                "&created_at=gte.{}",
                urlencoding::encode(&since.to_rfc3339())
            ));
        }
        if let Some(limit) = query.limit {
            url.push_str(&format!("&limit={limit}"));
        }

        let response = Self::send(self.authorized(self.client.get(&url))).await?;

        if !response.status().is_success() {
            return Err(rejected(collection, response).await);
        }

        Ok(response.json().await?)
    }

    async fn insert(&self, collection: Collection, row: serde_json::Value) -> Result<()> {
        let req = self
            .authorized(self.client.post(self.table_url(collection)))
            .header("Prefer", "return=minimal")
            .json(&row);
        let response = Self::send(req).await?;

        if !response.status().is_success() {
            return Err(rejected(collection, response).await);
        }

        tracing::debug!(%collection, "inserted row");
        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        column: &str,
        value: &str,
        patch: serde_json::Value,
    ) -> Result<()> {
        let url = format!("{}?{column}={}", self.table_url(collection), eq_filter(value));
        let req = self
            .authorized(self.client.patch(&url))
            .header("Prefer", "return=minimal")
            .json(&patch);
        let response = Self::send(req).await?;

        if !response.status().is_success() {
            return Err(rejected(collection, response).await);
        }

        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let url = format!("{}/auth/v1/health", self.base_url);
        let response = Self::send(self.authorized(self.client.get(&url))).await?;

        if !response.status().is_success() {
            return Err(Error::Store(format!(
                "health check returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
