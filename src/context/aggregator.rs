//! Fan-out loader for a user's business context

use std::collections::BTreeMap;

use serde::Serialize;

use crate::Error;
use crate::store::{AiInsight, BusinessProfile, EmailCampaign, Profile, Records, Website};

/// Newest websites attached to the context
pub const WEBSITE_LIMIT: usize = 5;
/// Newest insights attached to the context
pub const INSIGHT_LIMIT: usize = 3;
/// Newest email campaigns attached to the context
pub const EMAIL_LIMIT: usize = 3;

/// Lookup a context field came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextSource {
    Business,
    User,
    Websites,
    Insights,
    Email,
    /// The whole load, when no lookup could reach the service
    General,
}

impl ContextSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::User => "user",
            Self::Websites => "websites",
            Self::Insights => "insights",
            Self::Email => "email",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for ContextSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business and user records attached to generation requests
///
/// Built by [`ContextAggregator::load`]. Every lookup that was attempted has
/// an entry in `errors`: `None` when it succeeded, the error text otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserContext {
    pub business_profile: Option<BusinessProfile>,
    pub user_profile: Option<Profile>,
    /// Newest first, at most [`WEBSITE_LIMIT`]
    pub recent_websites: Vec<Website>,
    /// Newest first, at most [`INSIGHT_LIMIT`]
    pub recent_insights: Vec<AiInsight>,
    /// Newest first, at most [`EMAIL_LIMIT`]
    pub recent_email_campaigns: Vec<EmailCampaign>,
    pub errors: BTreeMap<ContextSource, Option<String>>,
}

impl UserContext {
    /// Empty context recording a failure of the whole load
    #[must_use]
    pub fn unavailable(error: &Error) -> Self {
        Self {
            errors: BTreeMap::from([(ContextSource::General, Some(error.to_string()))]),
            ..Self::default()
        }
    }

    /// Error recorded for a source, if that lookup failed
    #[must_use]
    pub fn error(&self, source: ContextSource) -> Option<&str> {
        self.errors.get(&source).and_then(Option::as_deref)
    }

    /// Whether no record was found at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.business_profile.is_none()
            && self.user_profile.is_none()
            && self.recent_websites.is_empty()
            && self.recent_insights.is_empty()
            && self.recent_email_campaigns.is_empty()
    }
}

/// Gathers a user's context from the data service
#[derive(Clone)]
pub struct ContextAggregator {
    records: Records,
}

impl ContextAggregator {
    #[must_use]
    pub const fn new(records: Records) -> Self {
        Self { records }
    }

    /// Load the context for a user
    ///
    /// The five lookups run concurrently, one attempt each. A failed lookup
    /// leaves its field empty and records its error; the others are kept.
    /// When every lookup failed because the service could not be reached, the
    /// result is an empty context with only a general error.
    pub async fn load(&self, user_id: &str) -> UserContext {
        let records = &self.records;
        let (business, user, websites, insights, email) = tokio::join!(
            records.business_profile(user_id),
            records.profile(user_id),
            records.recent_websites(user_id, WEBSITE_LIMIT),
            records.recent_insights(user_id, INSIGHT_LIMIT),
            records.recent_email_campaigns(user_id, EMAIL_LIMIT),
        );

        let failures = [
            business.as_ref().err(),
            user.as_ref().err(),
            websites.as_ref().err(),
            insights.as_ref().err(),
            email.as_ref().err(),
        ];
        if failures.iter().all(|f| f.is_some_and(Error::is_unreachable))
            && let Some(error) = failures[0]
        {
            tracing::warn!(user_id, error = %error, "context unavailable, continuing without it");
            return UserContext::unavailable(error);
        }

        let mut errors = BTreeMap::new();
        let context = UserContext {
            business_profile: settle(&mut errors, ContextSource::Business, business),
            user_profile: settle(&mut errors, ContextSource::User, user),
            recent_websites: settle(&mut errors, ContextSource::Websites, websites)
                .unwrap_or_default(),
            recent_insights: settle(&mut errors, ContextSource::Insights, insights)
                .unwrap_or_default(),
            recent_email_campaigns: settle(&mut errors, ContextSource::Email, email)
                .unwrap_or_default(),
            errors,
        };

        tracing::debug!(
            user_id,
            websites = context.recent_websites.len(),
            insights = context.recent_insights.len(),
            campaigns = context.recent_email_campaigns.len(),
            failed = context.errors.values().filter(|e| e.is_some()).count(),
            "loaded user context"
        );

        context
    }
}

/// Record the outcome of one lookup and keep its value on success
fn settle<T>(
    errors: &mut BTreeMap<ContextSource, Option<String>>,
    source: ContextSource,
    result: crate::Result<T>,
) -> Option<T> {
    match result {
        Ok(value) => {
            errors.insert(source, None);
            Some(value)
        }
        Err(e) => {
            tracing::debug!(%source, error = %e, "context lookup failed");
            errors.insert(source, Some(e.to_string()));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_records_only_general() {
        let context = UserContext::unavailable(&Error::Unreachable("dns error".to_string()));
        assert!(context.is_empty());
        assert_eq!(context.errors.len(), 1);
        assert_eq!(
            context.error(ContextSource::General),
            Some("store unreachable: dns error")
        );
    }

    #[test]
    fn test_errors_serialize_with_source_keys() {
        let mut context = UserContext::default();
        context.errors.insert(ContextSource::Websites, Some("boom".to_string()));
        context.errors.insert(ContextSource::User, None);

        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(json["errors"]["websites"], "boom");
        assert!(json["errors"]["user"].is_null());
    }
}
