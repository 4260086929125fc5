//! Typed helpers over [`DataStore`]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::records::{
    AiInsight, AnalyticsEvent, BusinessProfile, EmailCampaign, NewInsight, NewWebsite, Profile,
    ProfileUpdate, UserActivity, Website,
};
use super::{Collection, DataStore, RecentQuery};
use crate::Result;

/// Reporting window for analytics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    Week,
    #[default]
    Month,
    Quarter,
}

impl Period {
    /// Parse `7d` / `30d`; anything else is a quarter
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "7d" => Self::Week,
            "30d" => Self::Month,
            _ => Self::Quarter,
        }
    }

    #[must_use]
    pub const fn days(self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
        }
    }

    /// Start of the window ending at `now`
    #[must_use]
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days())
    }
}

/// Analytics overview for one user
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyticsSummary {
    pub websites: Vec<Website>,
    pub analytics: Vec<AnalyticsEvent>,
    pub email_campaigns: Vec<EmailCampaign>,
}

/// Typed access to the dashboard tables
#[derive(Clone)]
pub struct Records {
    store: Arc<dyn DataStore>,
}

impl Records {
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Personal profile of a user
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user has no profile, or a store error
    pub async fn profile(&self, user_id: &str) -> Result<Profile> {
        let row = self.store.fetch_one(Collection::Profiles, "id", user_id).await?;
        Ok(serde_json::from_value(row)?)
    }

    /// Update a user's profile
    ///
    /// # Errors
    ///
    /// Returns error if the update is rejected
    pub async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<()> {
        self.store
            .update(Collection::Profiles, "id", user_id, serde_json::to_value(update)?)
            .await
    }

    /// Business profile owned by a user
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user has no business profile, or a store error
    pub async fn business_profile(&self, user_id: &str) -> Result<BusinessProfile> {
        let row = self
            .store
            .fetch_one(Collection::BusinessProfiles, "user_id", user_id)
            .await?;
        Ok(serde_json::from_value(row)?)
    }

    /// Save a new website
    ///
    /// # Errors
    ///
    /// Returns error if the insert is rejected
    pub async fn save_website(&self, website: &NewWebsite) -> Result<()> {
        self.insert(Collection::Websites, website).await
    }

    /// All of a user's websites, newest first
    ///
    /// # Errors
    ///
    /// Returns error if the read fails or a row is malformed
    pub async fn user_websites(&self, user_id: &str) -> Result<Vec<Website>> {
        self.recent(Collection::Websites, user_id, &RecentQuery::all())
            .await
    }

    /// A user's newest websites
    ///
    /// # Errors
    ///
    /// Returns error if the read fails or a row is malformed
    pub async fn recent_websites(&self, user_id: &str, limit: usize) -> Result<Vec<Website>> {
        self.recent(Collection::Websites, user_id, &RecentQuery::latest(limit))
            .await
    }

    /// Save a generated insight
    ///
    /// # Errors
    ///
    /// Returns error if the insert is rejected
    pub async fn save_insight(&self, insight: &NewInsight) -> Result<()> {
        self.insert(Collection::AiInsights, insight).await
    }

    /// All of a user's insights, newest first
    ///
    /// # Errors
    ///
    /// Returns error if the read fails or a row is malformed
    pub async fn user_insights(&self, user_id: &str) -> Result<Vec<AiInsight>> {
        self.recent(Collection::AiInsights, user_id, &RecentQuery::all())
            .await
    }

    /// A user's newest insights
    ///
    /// # Errors
    ///
    /// Returns error if the read fails or a row is malformed
    pub async fn recent_insights(&self, user_id: &str, limit: usize) -> Result<Vec<AiInsight>> {
        self.recent(Collection::AiInsights, user_id, &RecentQuery::latest(limit))
            .await
    }

    /// A user's newest email campaigns
    ///
    /// # Errors
    ///
    /// Returns error if the read fails or a row is malformed
    pub async fn recent_email_campaigns(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<EmailCampaign>> {
        self.recent(Collection::EmailCampaigns, user_id, &RecentQuery::latest(limit))
            .await
    }

    /// Record a user action
    ///
    /// # Errors
    ///
    /// Returns error if the insert is rejected
    pub async fn log_activity(&self, activity: &UserActivity) -> Result<()> {
        self.insert(Collection::UserActivity, activity).await
    }

    /// Record an analytics event
    ///
    /// # Errors
    ///
    /// Returns error if the insert is rejected
    pub async fn log_analytics_event(&self, event: &AnalyticsEvent) -> Result<()> {
        self.insert(Collection::Analytics, event).await
    }

    /// Websites, analytics events and email campaigns for a reporting window
    ///
    /// Websites are not limited by the window. A failed campaign read is
    /// logged and yields no campaigns.
    ///
    /// # Errors
    ///
    /// Returns error if the website or analytics read fails
    pub async fn analytics_summary(&self, user_id: &str, period: Period) -> Result<AnalyticsSummary> {
        let websites = self.user_websites(user_id).await.inspect_err(|e| {
            tracing::error!(user_id, error = %e, "failed to fetch websites");
        })?;

        let window = RecentQuery::since(period.start(Utc::now()));

        let analytics = self
            .recent(Collection::Analytics, user_id, &window)
            .await
            .inspect_err(|e| {
                tracing::error!(user_id, error = %e, "failed to fetch analytics");
            })?;

        let email_campaigns = match self.recent(Collection::EmailCampaigns, user_id, &window).await {
            Ok(campaigns) => campaigns,
            Err(e) => {
                tracing::error!(user_id, error = %e, "failed to fetch email campaigns");
                Vec::new()
            }
        };

        Ok(AnalyticsSummary {
            websites,
            analytics,
            email_campaigns,
        })
    }

    /// Check that the data service answers
    ///
    /// # Errors
    ///
    /// Returns error if the service is unreachable or unhealthy
    pub async fn check_connection(&self) -> Result<()> {
        match self.store.ping().await {
            Ok(()) => {
                tracing::info!("data service connection successful");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "data service connection failed");
                Err(e)
            }
        }
    }

    async fn recent<T: DeserializeOwned>(
        &self,
        collection: Collection,
        user_id: &str,
        query: &RecentQuery,
    ) -> Result<Vec<T>> {
        let rows = self.store.fetch_recent(collection, user_id, query).await?;
        let mut records = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<T>, _>>()?;
        if let Some(limit) = query.limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    async fn insert<T: Serialize + Sync>(&self, collection: Collection, row: &T) -> Result<()> {
        self.store
            .insert(collection, serde_json::to_value(row)?)
            .await
    }
}
