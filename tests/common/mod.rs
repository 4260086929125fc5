//! Shared test utilities

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use dashboard_assistant::chat::Message;
use dashboard_assistant::config::{Config, file::ConfigFile};
use dashboard_assistant::context::ContextHandle;
use dashboard_assistant::generate::{TextGenerator, system_instruction};
use dashboard_assistant::store::{Collection, DataStore, RecentQuery};
use dashboard_assistant::{Error, Result};
use serde_json::{Value, json};
use tokio::sync::Notify;

/// How a mocked collection fails
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    /// The service could not be reached
    Unreachable,
    /// The service answered with an error
    Rejected,
}

impl Failure {
    fn error(self, collection: Collection) -> Error {
        match self {
            Self::Unreachable => Error::Unreachable("connection refused".to_string()),
            Self::Rejected => Error::Store(format!("{collection}: 500 - boom")),
        }
    }
}

/// In-memory data store
#[derive(Default)]
pub struct MockStore {
    rows: Mutex<HashMap<Collection, Vec<Value>>>,
    failures: Mutex<HashMap<Collection, Failure>>,
    offline: Mutex<bool>,
    calls: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row to a collection
    pub fn with_row(self, collection: Collection, row: Value) -> Self {
        self.rows
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .push(row);
        self
    }

    /// Make every call against `collection` fail
    pub fn failing(self, collection: Collection, failure: Failure) -> Self {
        self.failures.lock().unwrap().insert(collection, failure);
        self
    }

    /// Make every call fail as unreachable
    pub fn offline(self) -> Self {
        *self.offline.lock().unwrap() = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn rows(&self, collection: Collection) -> Vec<Value> {
        self.rows
            .lock()
            .unwrap()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    fn check(&self, collection: Collection) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.offline.lock().unwrap() {
            return Err(Failure::Unreachable.error(collection));
        }
        match self.failures.lock().unwrap().get(&collection) {
            Some(failure) => Err(failure.error(collection)),
            None => Ok(()),
        }
    }
}

fn matches(row: &Value, column: &str, value: &str) -> bool {
    row.get(column).and_then(Value::as_str) == Some(value)
}

#[async_trait]
impl DataStore for MockStore {
    async fn fetch_one(&self, collection: Collection, column: &str, value: &str) -> Result<Value> {
        self.check(collection)?;
        let found: Vec<Value> = self
            .rows(collection)
            .into_iter()
            .filter(|row| matches(row, column, value))
            .collect();
        match <[Value; 1]>::try_from(found) {
            Ok([row]) => Ok(row),
            Err(_) => Err(Error::NotFound(format!("{collection} where {column} = {value}"))),
        }
    }

    async fn fetch_recent(
        &self,
        collection: Collection,
        user_id: &str,
        query: &RecentQuery,
    ) -> Result<Vec<Value>> {
        self.check(collection)?;
        let mut found: Vec<Value> = self
            .rows(collection)
            .into_iter()
            .filter(|row| matches(row, "user_id", user_id))
            .filter(|row| {
                query.since.is_none_or(|since| {
                    row.get("created_at")
                        .and_then(Value::as_str)
                        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
                        .is_some_and(|at| at.with_timezone(&chrono::Utc) >= since)
                })
            })
            .collect();
        found.sort_by(|a, b| {
            let at = |row: &Value| row.get("created_at").and_then(Value::as_str).map(str::to_string);
            at(b).cmp(&at(a))
        });
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn insert(&self, collection: Collection, row: Value) -> Result<()> {
        self.check(collection)?;
        self.rows.lock().unwrap().entry(collection).or_default().push(row);
        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        column: &str,
        value: &str,
        patch: Value,
    ) -> Result<()> {
        self.check(collection)?;
        let mut rows = self.rows.lock().unwrap();
        for row in rows.entry(collection).or_default().iter_mut() {
            if matches(row, column, value)
                && let (Some(target), Some(changes)) = (row.as_object_mut(), patch.as_object())
            {
                for (key, change) in changes {
                    target.insert(key.clone(), change.clone());
                }
            }
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        if *self.offline.lock().unwrap() {
            return Err(Error::Unreachable("connection refused".to_string()));
        }
        Ok(())
    }
}

/// One request seen by a [`RecordingGenerator`]
#[derive(Debug, Clone)]
pub struct Recorded {
    pub prior: Vec<Message>,
    pub message: String,
    pub instruction: String,
}

/// Generator that answers with a fixed reply and records every request
pub struct RecordingGenerator {
    reply: std::result::Result<String, String>,
    requests: Mutex<Vec<Recorded>>,
}

impl RecordingGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            reply: Err(error.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    fn name(&self) -> &str {
        "recording"
    }

    async fn generate(
        &self,
        prior: &[Message],
        message: &str,
        context: &ContextHandle,
    ) -> Result<String> {
        self.requests.lock().unwrap().push(Recorded {
            prior: prior.to_vec(),
            message: message.to_string(),
            instruction: system_instruction(context),
        });
        self.reply.clone().map_err(Error::Generation)
    }
}

/// Generator that holds every request until released
#[derive(Default)]
pub struct GatedGenerator {
    pub gate: Notify,
    pub started: Notify,
    calls: AtomicUsize,
}

impl GatedGenerator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for GatedGenerator {
    fn name(&self) -> &str {
        "gated"
    }

    async fn generate(
        &self,
        _prior: &[Message],
        message: &str,
        _context: &ContextHandle,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.gate.notified().await;
        Ok(format!("**Re:** {message}"))
    }
}

/// Configuration pointing every local path into `dir`
pub fn test_config(dir: &Path) -> Config {
    let marker = dir.join("session.json").display().to_string();
    let mut config = Config::resolve(ConfigFile::default(), |key| {
        (key == "ASSISTANT_SESSION_PATH").then(|| marker.clone())
    });
    config.data_dir = dir.to_path_buf();
    config
}

/// Write a session marker for `user_id`
pub fn sign_in(path: &Path, user_id: &str, name: Option<&str>) {
    let user = json!({ "id": user_id, "email": format!("{user_id}@example.com"), "name": name });
    let marker = json!({ "user": user.to_string() });
    std::fs::write(path, marker.to_string()).unwrap();
}

pub fn business_row(user_id: &str, name: &str) -> Value {
    json!({
        "id": format!("b-{user_id}"),
        "user_id": user_id,
        "business_name": name,
        "industry": "Food & Beverage",
        "location": "Portland, OR",
    })
}

pub fn profile_row(user_id: &str, full_name: &str) -> Value {
    json!({
        "id": user_id,
        "email": format!("{user_id}@example.com"),
        "full_name": full_name,
    })
}

pub fn website_row(user_id: &str, name: &str, created_at: &str) -> Value {
    json!({
        "id": format!("w-{name}"),
        "user_id": user_id,
        "name": name,
        "status": "published",
        "created_at": created_at,
    })
}

pub fn insight_row(user_id: &str, title: &str, created_at: &str) -> Value {
    json!({
        "id": format!("i-{title}"),
        "user_id": user_id,
        "insight_type": "marketing",
        "title": title,
        "content": "Post twice a week",
        "created_at": created_at,
    })
}

pub fn campaign_row(user_id: &str, name: &str, created_at: &str) -> Value {
    json!({
        "id": format!("c-{name}"),
        "user_id": user_id,
        "name": name,
        "status": "sent",
        "open_rate": 42.5,
        "click_rate": 3.4,
        "created_at": created_at,
    })
}
