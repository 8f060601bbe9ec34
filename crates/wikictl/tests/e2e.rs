// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the store, resolver, and migration flows.
//!
//! Each test creates an isolated TestHarness with a temp store and an
//! in-memory legacy source. Tests are independent and order-insensitive.

use secrecy::ExposeSecret;
use wikictl_core::{InstanceSource, WikiInstance, WikictlError};
use wikictl_test_utils::{MockLegacySource, TestHarness};
use wikictl_vault::{MigrationDirection, PasswordSource, PreviewAction};

fn rm_wiki() -> WikiInstance {
    WikiInstance::new("rmwiki", "RM Wiki", "https://wiki.example.com", "secret123")
}

// ---- Legacy fallback and store precedence ----

#[test]
fn test_legacy_only_setup_keeps_working() {
    let harness = TestHarness::builder()
        .with_legacy(MockLegacySource::rmwiki("https://legacy.example", "legacy-key"))
        .build()
        .unwrap();

    let resolved = harness.resolver().get_dynamic_config(None).unwrap();
    assert_eq!(resolved.instance_id, "rmwiki");
    assert_eq!(resolved.source, InstanceSource::Legacy);
    assert_eq!(resolved.key.expose_secret(), "legacy-key");
}

#[test]
fn test_store_suppresses_legacy_listing() {
    let harness = TestHarness::builder()
        .with_legacy(
            MockLegacySource::rmwiki("https://legacy.example", "legacy-key").with_instance(
                "extra",
                "Extra",
                "EXTRA",
                "https://extra.example",
                "x",
            ),
        )
        .with_instance(WikiInstance::new("docs", "Docs", "https://docs.example", "d"))
        .build()
        .unwrap();

    let ids = harness.resolver().get_available_instances().unwrap();
    assert_eq!(ids, vec!["docs"]);
}

// ---- Full migration lifecycle ----

#[test]
fn test_migrate_export_reset_lifecycle() {
    let mut harness = TestHarness::builder()
        .with_legacy(MockLegacySource::rmwiki("https://wiki.example.com", "secret123"))
        .build()
        .unwrap();

    let preview = harness
        .coordinator()
        .preview_migration(MigrationDirection::ToEncrypted, false)
        .unwrap();
    assert_eq!(preview[0].action, PreviewAction::Migrate);

    let report = harness.coordinator().migrate_to_encrypted(false).unwrap();
    assert_eq!(report.migrated, vec!["rmwiki"]);

    let again = harness.coordinator().migrate_to_encrypted(false).unwrap();
    assert!(again.migrated.is_empty());
    assert_eq!(again.skipped, vec!["rmwiki"]);

    let resolved = harness.resolver().get_dynamic_config(Some("rmwiki")).unwrap();
    assert_eq!(resolved.source, InstanceSource::Store);

    let env = harness.coordinator().generate_env_from_encrypted().unwrap();
    assert!(env.contains("WIKIJS_API_KEY=secret123"));
    assert!(env.contains("WIKIJS_API_URL=https://wiki.example.com"));

    harness.coordinator().reset_encrypted_config().unwrap();
    assert!(!harness.store.has_config_file());
    assert!(matches!(
        harness.store.get_instance("rmwiki"),
        Err(WikictlError::NotInitialized)
    ));
}

#[test]
fn test_export_import_into_fresh_store() {
    let mut source = TestHarness::builder()
        .with_instance(rm_wiki())
        .with_instance(WikiInstance::new(
            "docs",
            "docs",
            "https://docs.example.com",
            "key with spaces",
        ))
        .build()
        .unwrap();
    let text = source.coordinator().generate_env_from_encrypted().unwrap();
    let env_path = source.temp_path("exported.env");
    std::fs::write(&env_path, text).unwrap();

    let mut target = TestHarness::builder().build().unwrap();
    let legacy_config = target.config.legacy.clone();
    let report = target
        .coordinator()
        .import_env_file(&legacy_config, &env_path, false)
        .unwrap();
    assert_eq!(report.migrated, vec!["rmwiki", "docs"]);

    let docs = target.store.get_instance("docs").unwrap().unwrap();
    assert_eq!(docs.key.expose_secret(), "key with spaces");
    assert_eq!(target.store.get_instance("rmwiki").unwrap().unwrap().name, "RM Wiki");
}

// ---- Persistence and password handling ----

#[test]
fn test_second_handle_sees_changes() {
    let mut harness = TestHarness::builder().build().unwrap();
    harness.store.add_instance(&rm_wiki()).unwrap();
    harness.store.set_default_theme("dark").unwrap();

    let other = harness.reopen().unwrap();
    assert_eq!(other.get_instance("rmwiki").unwrap().unwrap(), rm_wiki());
    assert_eq!(other.get_default_theme().unwrap().as_deref(), Some("dark"));
}

#[test]
fn test_wrong_password_with_legacy_fallback() {
    let harness = TestHarness::builder()
        .with_instance(rm_wiki())
        .build()
        .unwrap();
    let locked = harness
        .reopen_with(PasswordSource::Explicit("not-the-password".to_string().into()))
        .unwrap();

    // Listing needs no key.
    assert_eq!(locked.get_instance_ids().unwrap(), vec!["rmwiki"]);
    assert!(matches!(
        locked.get_instance("rmwiki"),
        Err(WikictlError::DecryptionFailed { .. })
    ));

    let checks = locked.verify_all().unwrap();
    assert!(checks[0].result.is_err());
}

#[test]
fn test_unknown_instance_lists_choices() {
    let harness = TestHarness::builder()
        .with_instance(rm_wiki())
        .build()
        .unwrap();
    let err = harness
        .resolver()
        .get_dynamic_config(Some("missing"))
        .unwrap_err();
    assert!(err.to_string().contains("rmwiki"));
}

#[test]
fn test_no_instances_anywhere() {
    let harness = TestHarness::builder().build().unwrap();
    let err = harness.resolver().get_dynamic_config(None).unwrap_err();
    assert!(matches!(err, WikictlError::NoInstancesConfigured));
}

#[test]
fn test_harness_isolation() {
    let mut a = TestHarness::builder().build().unwrap();
    let b = TestHarness::builder().build().unwrap();
    a.store.add_instance(&rm_wiki()).unwrap();

    assert_ne!(a.store_path(), b.store_path());
    assert_eq!(b.store.instance_count().unwrap(), 0);
}
