// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the wikictl configuration system.

use std::path::Path;

use wikictl_config::diagnostic::ConfigError;
use wikictl_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_wikictl_config() {
    let toml = r#"
[store]
path = "/tmp/wikictl/instances.json"

[kdf]
memory_cost = 65536
iterations = 3
parallelism = 2

[legacy]
default_instance_var = "MY_DEFAULT_WIKI"

[[legacy.instances]]
id = "docs"
name = "Docs Wiki"
env_prefix = "DOCSWIKI"

[log]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(
        config.store.path.as_deref(),
        Some(Path::new("/tmp/wikictl/instances.json"))
    );
    assert_eq!(config.kdf.memory_cost, 65536);
    assert_eq!(config.kdf.iterations, 3);
    assert_eq!(config.kdf.parallelism, 2);
    assert_eq!(config.legacy.default_instance_var, "MY_DEFAULT_WIKI");
    assert_eq!(config.legacy.instances.len(), 1);
    assert_eq!(config.legacy.instances[0].env_prefix, "DOCSWIKI");
    assert_eq!(config.log.level, "debug");
}

/// An empty document yields the compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert!(config.store.path.is_none());
    assert_eq!(config.kdf.memory_cost, 19456);
    assert_eq!(config.legacy.default_instance_var, "WIKIJS_DEFAULT_INSTANCE");
    assert_eq!(config.log.level, "warn");
    assert!(config.store.resolved_path().ends_with("instances.json"));
}

/// Unknown key in [kdf] produces an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_field_in_kdf_suggests_correction() {
    let toml = r#"
[kdf]
memroy_cost = 65536
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "memroy_cost");
            assert_eq!(suggestion.as_deref(), Some("memory_cost"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Unknown top-level section is rejected.
#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telemetry]\nenabled = true\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::UnknownKey { .. }));
}

/// Wrong value type produces an InvalidType diagnostic.
#[test]
fn wrong_type_produces_invalid_type() {
    let errors = load_and_validate_str("[kdf]\niterations = \"three\"\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::InvalidType { .. }));
}

/// Legacy mapping without env_prefix is a missing key.
#[test]
fn legacy_mapping_requires_env_prefix() {
    let toml = r#"
[[legacy.instances]]
id = "docs"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(matches!(errors[0], ConfigError::MissingKey { .. }));
}

/// Semantic validation runs after a successful parse.
#[test]
fn semantic_validation_runs_after_parse() {
    let errors = load_and_validate_str("[kdf]\nmemory_cost = 16\n").unwrap_err();
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

/// Explicit config files are loaded and validated.
#[test]
fn explicit_path_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wikictl.toml");
    std::fs::write(&path, "[log]\nlevel = \"info\"\n").unwrap();

    let config = load_and_validate_path(&path).unwrap();
    assert_eq!(config.log.level, "info");
}

/// Unknown keys in an explicit file carry a source span.
#[test]
fn explicit_path_unknown_key_has_span() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wikictl.toml");
    std::fs::write(&path, "[log]\nlevle = \"info\"\n").unwrap();

    let errors = load_and_validate_path(&path).unwrap_err();
    match &errors[0] {
        ConfigError::UnknownKey { span, src, .. } => {
            assert!(span.is_some());
            assert!(src.is_some());
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}
