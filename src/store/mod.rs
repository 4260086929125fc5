//! Access to the hosted data service
//!
//! [`DataStore`] is the row-level seam: equality reads, newest-first reads
//! scoped to a user, inserts and updates against named collections. The REST
//! implementation lives in [`rest`]; [`Records`] layers typed helpers on top.

pub mod queries;
pub mod records;
pub mod rest;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Result;

pub use queries::{AnalyticsSummary, Period, Records};
pub use records::{
    AiInsight, AnalyticsEvent, BusinessProfile, EmailCampaign, NewInsight, NewWebsite, Profile,
    ProfileUpdate, UserActivity, Website,
};
pub use rest::RestDataStore;

/// Named collections of the data service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Profiles,
    BusinessProfiles,
    Websites,
    AiInsights,
    EmailCampaigns,
    Analytics,
    UserActivity,
}

impl Collection {
    /// Table name on the data service
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Profiles => "profiles",
            Self::BusinessProfiles => "business_profiles",
            Self::Websites => "websites",
            Self::AiInsights => "ai_insights",
            Self::EmailCampaigns => "email_campaigns",
            Self::Analytics => "analytics",
            Self::UserActivity => "user_activity",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Filter for a newest-first read of one user's rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentQuery {
    /// Maximum number of rows
    pub limit: Option<usize>,
    /// Only rows created at or after this instant
    pub since: Option<DateTime<Utc>>,
}

impl RecentQuery {
    /// All rows, newest first
    #[must_use]
    pub const fn all() -> Self {
        Self {
            limit: None,
            since: None,
        }
    }

    /// At most `limit` rows, newest first
    #[must_use]
    pub const fn latest(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            since: None,
        }
    }

    /// Rows created at or after `since`, newest first
    #[must_use]
    pub const fn since(since: DateTime<Utc>) -> Self {
        Self {
            limit: None,
            since: Some(since),
        }
    }
}

/// Row-oriented access to the data service
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Fetch exactly one row where `column` equals `value`
    ///
    /// Returns [`crate::Error::NotFound`] when no row matches.
    async fn fetch_one(
        &self,
        collection: Collection,
        column: &str,
        value: &str,
    ) -> Result<serde_json::Value>;

    /// Fetch a user's rows ordered by `created_at` descending
    async fn fetch_recent(
        &self,
        collection: Collection,
        user_id: &str,
        query: &RecentQuery,
    ) -> Result<Vec<serde_json::Value>>;

    /// Insert one row
    async fn insert(&self, collection: Collection, row: serde_json::Value) -> Result<()>;

    /// Apply `patch` to rows where `column` equals `value`
    async fn update(
        &self,
        collection: Collection,
        column: &str,
        value: &str,
        patch: serde_json::Value,
    ) -> Result<()>;

    /// Check that the service is reachable
    async fn ping(&self) -> Result<()>;
}
