//! Identity, navbar and app shell integration tests

use std::sync::Arc;

use dashboard_assistant::identity::{Identity, NavAction, NavbarVariant, SessionMarker};
use dashboard_assistant::store::Collection;
use dashboard_assistant::{App, Error, TextGenerator};

mod common;
use common::{MockStore, RecordingGenerator, business_row, sign_in, test_config};

fn app_with(dir: &std::path::Path, generator: Option<Arc<dyn TextGenerator>>) -> App {
    let store = MockStore::new().with_row(
        Collection::BusinessProfiles,
        business_row("u1", "Sunrise Bakery"),
    );
    App::with_services(test_config(dir), Arc::new(store), generator)
}

#[test]
fn test_signed_in_navbar() {
    let dir = tempfile::tempdir().unwrap();
    sign_in(&dir.path().join("session.json"), "u1", Some("Maria Lopez"));

    let app = app_with(dir.path(), None);
    assert_eq!(app.identity().user_id(), Some("u1"));

    let navbar = app.navbar(NavbarVariant::Dashboard);
    assert!(navbar.is_authenticated());
    assert_eq!(navbar.display_name(), "Maria Lopez");
    assert_eq!(navbar.initials(), "ML");
    assert_eq!(navbar.email(), "u1@example.com");

    let labels: Vec<_> = navbar.links().iter().map(|l| l.label).collect();
    assert_eq!(labels, ["Profile", "Settings", "Log out"]);
}

#[test]
fn test_nameless_user_falls_back_to_email() {
    let dir = tempfile::tempdir().unwrap();
    sign_in(&dir.path().join("session.json"), "sam", None);

    let app = app_with(dir.path(), None);
    let navbar = app.navbar(NavbarVariant::Dashboard);
    assert_eq!(navbar.display_name(), "sam");
    assert_eq!(navbar.initials(), "S");
}

#[test]
fn test_no_marker_is_anonymous() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(dir.path(), None);

    assert_eq!(app.identity(), &Identity::Anonymous);
    let navbar = app.navbar(NavbarVariant::Landing);
    assert!(!navbar.is_authenticated());
    assert_eq!(navbar.display_name(), "John Doe");
    assert_eq!(navbar.initials(), "JD");
    assert_eq!(navbar.email(), "john@example.com");
    assert_eq!(
        navbar.links().iter().find(|l| l.label == "Pricing").map(|l| l.action),
        Some(NavAction::Route("#templates"))
    );
}

#[test]
fn test_corrupt_marker_is_anonymous() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("session.json"), r#"{"user":"not a user"}"#).unwrap();

    let app = app_with(dir.path(), None);
    assert!(!app.identity().is_authenticated());
}

#[test]
fn test_logout_clears_marker() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    sign_in(&path, "u1", Some("Maria Lopez"));

    let mut app = app_with(dir.path(), None);
    app.logout().unwrap();

    assert_eq!(app.identity(), &Identity::Anonymous);
    assert_eq!(SessionMarker::new(&path).load(), Identity::Anonymous);
    assert_eq!(app.navbar(NavbarVariant::Dashboard).display_name(), "John Doe");
}

#[tokio::test]
async fn test_chat_requires_generator() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(dir.path(), None);

    assert!(matches!(app.start_chat(), Err(Error::Config(_))));
}

#[tokio::test]
async fn test_chat_uses_signed_in_context() {
    let dir = tempfile::tempdir().unwrap();
    sign_in(&dir.path().join("session.json"), "u1", Some("Maria Lopez"));

    let generator = Arc::new(RecordingGenerator::replying("Happy to help"));
    let app = app_with(dir.path(), Some(generator.clone() as Arc<dyn TextGenerator>));

    let session = app.start_chat().unwrap();
    session.context().loaded().await.unwrap();
    session.send("What should I post this week?").await;

    let requests = generator.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].instruction.contains("Business: Sunrise Bakery"));
}

#[tokio::test]
async fn test_load_context_needs_identity() {
    let dir = tempfile::tempdir().unwrap();
    let anonymous = app_with(dir.path(), None);
    assert!(anonymous.load_context().await.is_none());

    sign_in(&dir.path().join("session.json"), "u1", None);
    let signed_in = app_with(dir.path(), None);
    let context = signed_in.load_context().await.unwrap();
    assert!(context.business_profile.is_some());
}
