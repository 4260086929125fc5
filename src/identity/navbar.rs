//! Navigation bar model

use super::{Identity, StoredUser};

/// Which page family the navbar is shown on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavbarVariant {
    #[default]
    Landing,
    Dashboard,
}

impl NavbarVariant {
    /// Parse `landing` / `dashboard`
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "landing" => Some(Self::Landing),
            "dashboard" => Some(Self::Dashboard),
            _ => None,
        }
    }
}

/// What activating a navbar entry does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    /// Navigate to a route or anchor
    Route(&'static str),
    /// Sign out and return home
    Logout,
}

/// A navbar entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub action: NavAction,
}

const LANDING_LINKS: &[NavLink] = &[
    NavLink {
        label: "Features",
        action: NavAction::Route("#features"),
    },
    NavLink {
        label: "Pricing",
        action: NavAction::Route("#templates"),
    },
    NavLink {
        label: "Login",
        action: NavAction::Route("/login"),
    },
    NavLink {
        label: "Start Free",
        action: NavAction::Route("/signup"),
    },
];

const DASHBOARD_LINKS: &[NavLink] = &[
    NavLink {
        label: "Profile",
        action: NavAction::Route("/dashboard/profile"),
    },
    NavLink {
        label: "Settings",
        action: NavAction::Route("/dashboard/settings"),
    },
    NavLink {
        label: "Log out",
        action: NavAction::Logout,
    },
];

/// Navbar for one identity
#[derive(Debug, Clone, Copy)]
pub struct Navbar<'a> {
    variant: NavbarVariant,
    identity: &'a Identity,
}

impl<'a> Navbar<'a> {
    #[must_use]
    pub const fn new(variant: NavbarVariant, identity: &'a Identity) -> Self {
        Self { variant, identity }
    }

    #[must_use]
    pub const fn variant(&self) -> NavbarVariant {
        self.variant
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_authenticated()
    }

    /// Entries for the current variant
    #[must_use]
    pub const fn links(&self) -> &'static [NavLink] {
        match self.variant {
            NavbarVariant::Landing => LANDING_LINKS,
            NavbarVariant::Dashboard => DASHBOARD_LINKS,
        }
    }

    /// Name shown in the user menu
    #[must_use]
    pub fn display_name(&self) -> String {
        let Some(user) = self.identity.user() else {
            return "John Doe".to_string();
        };
        non_empty(user.name.as_deref())
            .or_else(|| user.email.split('@').next().filter(|local| !local.is_empty()))
            .unwrap_or("User")
            .to_string()
    }

    /// Avatar fallback letters
    #[must_use]
    pub fn initials(&self) -> String {
        let Some(user) = self.identity.user() else {
            return "JD".to_string();
        };
        if let Some(name) = non_empty(user.name.as_deref()) {
            return name
                .split_whitespace()
                .filter_map(|word| word.chars().next())
                .flat_map(char::to_uppercase)
                .collect();
        }
        user.email
            .chars()
            .next()
            .map_or_else(|| "U".to_string(), |c| c.to_uppercase().collect())
    }

    /// Email shown in the user menu
    #[must_use]
    pub fn email(&self) -> String {
        self.identity
            .user()
            .map_or("john@example.com", |user: &StoredUser| {
                non_empty(Some(user.email.as_str())).unwrap_or("user@example.com")
            })
            .to_string()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
