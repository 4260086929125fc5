//! File-backed session marker
//!
//! A JSON object of string keys to string values, mirroring browser local
//! storage. The signed-in user is stored serialized under [`MARKER_KEY`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{Identity, StoredUser};
use crate::Result;

/// Key holding the serialized user
pub const MARKER_KEY: &str = "user";

/// Persisted marker of the signed-in user
#[derive(Debug, Clone)]
pub struct SessionMarker {
    path: PathBuf,
}

impl SessionMarker {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve the identity recorded in the marker
    ///
    /// A missing file, missing key, or unreadable payload all mean nobody is
    /// signed in.
    #[must_use]
    pub fn load(&self) -> Identity {
        let entries = match self.read_entries() {
            Ok(Some(entries)) => entries,
            Ok(None) => return Identity::Anonymous,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "unreadable session marker, treating as signed out"
                );
                return Identity::Anonymous;
            }
        };

        let Some(raw) = entries.get(MARKER_KEY) else {
            return Identity::Anonymous;
        };

        match serde_json::from_str::<StoredUser>(raw) {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "session marker found");
                Identity::Authenticated(user)
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "malformed user in session marker, treating as signed out"
                );
                Identity::Anonymous
            }
        }
    }

    /// Record `user` as signed in
    ///
    /// # Errors
    ///
    /// Returns error if the marker file cannot be written
    pub fn store(&self, user: &StoredUser) -> Result<()> {
        let mut entries = self.read_entries().ok().flatten().unwrap_or_default();
        entries.insert(MARKER_KEY.to_string(), serde_json::to_string(user)?);
        self.write_entries(&entries)
    }

    /// Forget the signed-in user; other keys are kept
    ///
    /// # Errors
    ///
    /// Returns error if the marker file cannot be rewritten
    pub fn clear(&self) -> Result<()> {
        let Some(mut entries) = self.read_entries().ok().flatten() else {
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }
            return Ok(());
        };
        if entries.remove(MARKER_KEY).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }

    fn read_entries(&self) -> Result<Option<BTreeMap<String, String>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}
