//! Plain-text rendering of a [`UserContext`] for the model

use std::fmt::Write;

use super::UserContext;

impl UserContext {
    /// Render the context as a plain-text block for the system instruction
    ///
    /// Sections with no data are omitted; an empty context renders to an
    /// empty string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut sections = Vec::new();

        if let Some(business) = &self.business_profile {
            let mut section = format!("Business: {}", business.business_name);
            push_field(&mut section, "Industry", business.industry.as_deref());
            push_field(&mut section, "Description", business.description.as_deref());
            push_field(&mut section, "Target audience", business.target_audience.as_deref());
            push_field(&mut section, "Location", business.location.as_deref());
            push_field(&mut section, "Website", business.website_url.as_deref());
            sections.push(section);
        }

        if let Some(profile) = &self.user_profile {
            let mut section = String::from("User");
            push_field(&mut section, "Name", profile.display_name().as_deref());
            push_field(&mut section, "Email", profile.email.as_deref());
            if section.contains('\n') {
                sections.push(section);
            }
        }

        if !self.recent_websites.is_empty() {
            let mut section = String::from("Recent websites:");
            for site in &self.recent_websites {
                let _ = write!(section, "\n- {}", site.name);
                if let Some(status) = &site.status {
                    let _ = write!(section, " ({status})");
                }
                if let Some(url) = &site.url {
                    let _ = write!(section, " {url}");
                }
            }
            sections.push(section);
        }

        if !self.recent_insights.is_empty() {
            let mut section = String::from("Recent insights:");
            for insight in &self.recent_insights {
                let headline = insight.title.as_deref().unwrap_or(&insight.content);
                let _ = write!(section, "\n- [{}] {headline}", insight.insight_type);
            }
            sections.push(section);
        }

        if !self.recent_email_campaigns.is_empty() {
            let mut section = String::from("Recent email campaigns:");
            for campaign in &self.recent_email_campaigns {
                let _ = write!(section, "\n- {}", campaign.name);
                if let Some(status) = &campaign.status {
                    let _ = write!(section, " ({status})");
                }
                if let Some(open) = campaign.open_rate {
                    let _ = write!(section, ", open rate {open:.1}%");
                }
                if let Some(click) = campaign.click_rate {
                    let _ = write!(section, ", click rate {click:.1}%");
                }
            }
            sections.push(section);
        }

        sections.join("\n\n")
    }
}

fn push_field(section: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        let _ = write!(section, "\n{label}: {value}");
    }
}
