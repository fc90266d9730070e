#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{local, seed_dataset, Harness};
use pantryman_core::config::{AppConfig, PREF_DATA_DIR};
use pantryman_core::errors::ExErrorKind;
use pantryman_core::logging_facility::test_capture::init_test_capture;
use pantryman_core::model::QuantityUnit;
use pantryman_core_types::schema::{EVENT_END, EVENT_START, FIELD_ATTEMPT_ID};
use pantryman_engine::app::PantryApp;
use pantryman_engine::session::BindingState;
use pantryman_store::prefs::{FilePreferences, Preferences};
use tempfile::TempDir;

#[test]
fn test_rebind_same_root_twice_leaves_one_open_handle() {
    // Given a session bound to a dataset
    let mut h = Harness::new();
    let source = h.activate_source(2);
    h.bind_active();
    assert_eq!(h.counters.live(), 1);

    // When rebinding to the same root again
    h.session.rebind(&local(&source), &source).unwrap();

    // Then the old engine was destroyed before the new one was created
    assert_eq!(h.counters.opened(), 2);
    assert_eq!(h.counters.live(), 1);
    assert!(h.session.state().is_bound());
}

#[test]
fn test_failed_open_leaves_explicit_failed_state() {
    let mut h = Harness::new();
    h.activate_source(1);
    h.bind_active();
    let missing = h.path("does-not-exist");

    let err = h.session.rebind(&local(&missing), &missing).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::EngineInit);
    assert!(matches!(h.session.state(), BindingState::Failed { .. }));
    assert_eq!(h.counters.live(), 0);
    assert!(h.session.bound_path().is_none());
    assert!(h.session.list_ingredients().is_empty());

    // Requests fail cleanly with NotBound
    assert!(!h.session.delete_ingredient("Ingredient 0"));
    assert_eq!(
        h.session.last_error().map(|e| e.kind()),
        Some(ExErrorKind::NotBound)
    );
}

#[test]
fn test_drop_releases_engine() {
    let mut h = Harness::new();
    h.activate_source(1);
    h.bind_active();
    let counters = h.counters.clone();

    drop(h);

    assert_eq!(counters.live(), 0);
}

#[test]
fn test_create_then_list_round_trip_through_facade() {
    let mut h = Harness::new();
    h.activate_source(1);
    h.bind_active();

    assert!(h
        .session
        .create_ingredient("Smoked Paprika", "Spices", Some("paprika"), &["hot".to_string()]));

    let created = h
        .session
        .list_ingredients()
        .iter()
        .find(|i| i.name == "Smoked Paprika")
        .cloned()
        .unwrap();
    assert_eq!(created.slug, "smoked_paprika");
    assert_eq!(created.kb.as_deref(), Some("paprika"));
    assert!(h.session.list_categories().contains(&"Spices".to_string()));

    // Duplicate and blank names are refused
    assert!(!h.session.create_ingredient("Smoked Paprika", "Spices", None, &[]));
    assert_eq!(
        h.session.last_error().map(|e| e.kind()),
        Some(ExErrorKind::AlreadyExists)
    );
    assert!(!h.session.create_ingredient("", "Spices", None, &[]));
}

#[test]
fn test_pantry_quantity_visible_only_while_in_pantry() {
    let mut h = Harness::new();
    h.activate_source(2);
    h.bind_active();

    assert!(h
        .session
        .set_pantry_status("Ingredient 1", true, Some(250.0), Some("g")));
    let item = h.session.list_ingredients()[1].clone();
    assert!(item.is_in_pantry);
    assert_eq!(item.quantity, Some(250.0));
    assert_eq!(item.quantity_unit, Some(QuantityUnit::Gram));

    assert!(h
        .session
        .set_pantry_status("Ingredient 1", false, Some(250.0), Some("g")));
    let item = h.session.list_ingredients()[1].clone();
    assert!(!item.is_in_pantry);
    assert_eq!(item.quantity, None);
    assert_eq!(item.quantity_unit, None);
}

#[test]
fn test_update_and_delete_refresh_snapshots() {
    let mut h = Harness::new();
    h.activate_source(2);
    h.bind_active();

    assert!(h
        .session
        .update_ingredient("Ingredient 0", "Flour", "Baking", None, &[]));
    let grouped = h.session.list_ingredients_by_category();
    assert_eq!(grouped["Baking"][0].name, "Flour");
    // The pantry entry follows the rename
    assert!(grouped["Baking"][0].is_in_pantry);

    assert!(h.session.delete_ingredient("Flour"));
    assert_eq!(h.session.list_ingredients().len(), 1);
    assert!(!h.session.list_categories().contains(&"Baking".to_string()));
}

#[test]
fn test_resume_without_pending_change_does_nothing() {
    let mut h = Harness::new();
    h.activate_source(1);
    h.bind_active();

    assert!(h.session.on_resume(&h.receiver).is_none());
    assert_eq!(h.counters.opened(), 1);
}

#[test]
fn test_app_first_run_binds_seeded_default() {
    // Given a fresh app home
    let home = TempDir::new().unwrap();
    let mut app = PantryApp::new(AppConfig::new(home.path()));

    // When started
    let resolved = app.start();

    // Then the default root is created, seeded and bound
    assert!(!resolved.is_degraded());
    assert_eq!(resolved.path, home.path().join("cookbook_data"));
    assert!(app.session().state().is_bound());
    assert!(app.session().list_ingredients().is_empty());
}

#[test]
fn test_app_start_falls_back_when_grant_is_lost() {
    // Given a persisted granted tree that is no longer granted
    let home = TempDir::new().unwrap();
    let config = AppConfig::new(home.path());
    FilePreferences::new(config.preferences_path())
        .set(PREF_DATA_DIR, "tree://sdcard/pantry")
        .unwrap();
    let mut app = PantryApp::new(config);

    // When started
    let resolved = app.start();

    // Then the default root is bound and the loss is surfaced as a warning
    assert_eq!(
        resolved.degradation.as_ref().map(|e| e.kind()),
        Some(ExErrorKind::PermissionLost)
    );
    assert!(app.session().state().is_bound());
    assert_eq!(
        app.session().bound_path(),
        Some(home.path().join("cookbook_data").as_path())
    );
}

#[test]
fn test_app_switch_then_resume_rebinds() {
    let home = TempDir::new().unwrap();
    let mut app = PantryApp::new(AppConfig::new(home.path()));
    app.start();
    let other = home.path().join("shared");
    seed_dataset(&other, 3);

    let proposal = app.controller().select(local(&other)).unwrap();
    app.controller().confirm(proposal).unwrap();

    assert!(app.resume().unwrap().is_ok());
    assert_eq!(app.session().list_ingredients().len(), 3);
    assert!(app.resume().is_none());
}

#[test]
fn test_switch_events_carry_attempt_id() {
    let capture = init_test_capture();
    let h = Harness::new();
    h.activate_source(1);
    let candidate = h.empty_dir("candidate");

    let proposal = h.controller.select(local(&candidate)).unwrap();
    let attempt = proposal.attempt_id().to_string();

    let events = capture.events();
    let tagged = |event: &str| {
        events.iter().any(|e| {
            e.is("switch_select", event) && e.field(FIELD_ATTEMPT_ID) == Some(attempt.as_str())
        })
    };
    assert!(tagged(EVENT_START));
    assert!(tagged(EVENT_END));
}
