//! Who is signed in, as recorded by the auth flow
//!
//! The auth flow persists the signed-in user under a single key of the
//! session marker; this module only reads it (and clears it on logout).

mod marker;
mod navbar;

use serde::{Deserialize, Serialize};

pub use marker::{MARKER_KEY, SessionMarker};
pub use navbar::{NavAction, NavLink, Navbar, NavbarVariant};

/// User record written by the auth flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(
        default,
        rename = "created_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
}

/// Identity resolved at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    #[default]
    Anonymous,
    Authenticated(StoredUser),
}

impl Identity {
    #[must_use]
    pub const fn user(&self) -> Option<&StoredUser> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user().map(|u| u.id.as_str())
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_user_keys() {
        let user: StoredUser = serde_json::from_str(
            r#"{"id":"u1","email":"maria@example.com","firstName":"Maria","lastName":"Lopez","created_at":"2026-01-02"}"#,
        )
        .unwrap();
        assert_eq!(user.first_name.as_deref(), Some("Maria"));
        assert_eq!(user.created_at.as_deref(), Some("2026-01-02"));
        assert!(user.name.is_none());
    }

    #[test]
    fn test_identity_accessors() {
        assert_eq!(Identity::Anonymous.user_id(), None);
        let identity = Identity::Authenticated(StoredUser {
            id: "u1".to_string(),
            email: "a@b.co".to_string(),
            name: None,
            first_name: None,
            last_name: None,
            created_at: None,
        });
        assert!(identity.is_authenticated());
        assert_eq!(identity.user_id(), Some("u1"));
    }
}
