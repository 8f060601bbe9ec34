// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as Argon2id parameter floors and unique legacy mappings.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::WikictlConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &WikictlConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if let Some(path) = &config.store.path
        && path.as_os_str().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "store.path must not be empty when set".to_string(),
        });
    }

    if config.kdf.memory_cost < 8192 {
        errors.push(ConfigError::Validation {
            message: format!(
                "kdf.memory_cost must be at least 8192 (8 MiB), got {}",
                config.kdf.memory_cost
            ),
        });
    }

    if config.kdf.iterations < 1 {
        errors.push(ConfigError::Validation {
            message: format!("kdf.iterations must be at least 1, got {}", config.kdf.iterations),
        });
    }

    if config.kdf.parallelism < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "kdf.parallelism must be at least 1, got {}",
                config.kdf.parallelism
            ),
        });
    }

    if !LOG_LEVELS.contains(&config.log.level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.legacy.default_instance_var.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "legacy.default_instance_var must not be empty".to_string(),
        });
    }

    let mut seen_ids = HashSet::new();
    for (i, mapping) in config.legacy.instances.iter().enumerate() {
        if mapping.id.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("legacy.instances[{i}].id must not be empty"),
            });
        } else if !seen_ids.insert(mapping.id.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "duplicate legacy instance id `{}` in [[legacy.instances]]",
                    mapping.id
                ),
            });
        }

        let prefix_ok = !mapping.env_prefix.is_empty()
            && mapping
                .env_prefix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
        if !prefix_ok {
            errors.push(ConfigError::Validation {
                message: format!(
                    "legacy.instances[{i}].env_prefix `{}` must be non-empty and contain only A-Z, 0-9 and _",
                    mapping.env_prefix
                ),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LegacyMapping;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&WikictlConfig::default()).is_ok());
    }

    #[test]
    fn low_memory_cost_fails_validation() {
        let mut config = WikictlConfig::default();
        config.kdf.memory_cost = 1024;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "kdf.memory_cost"));
    }

    #[test]
    fn zero_iterations_and_parallelism_are_both_reported() {
        let mut config = WikictlConfig::default();
        config.kdf.iterations = 0;
        config.kdf.parallelism = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = WikictlConfig::default();
        config.log.level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "log.level"));
    }

    #[test]
    fn duplicate_legacy_ids_fail_validation() {
        let mut config = WikictlConfig::default();
        let mapping = LegacyMapping {
            id: "docs".to_string(),
            name: None,
            env_prefix: "DOCSWIKI".to_string(),
        };
        config.legacy.instances = vec![mapping.clone(), mapping];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "duplicate legacy instance id"));
    }

    #[test]
    fn lowercase_prefix_fails_validation() {
        let mut config = WikictlConfig::default();
        config.legacy.instances = vec![LegacyMapping {
            id: "docs".to_string(),
            name: Some("Docs".to_string()),
            env_prefix: "docswiki".to_string(),
        }];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "env_prefix"));
    }

    #[test]
    fn legacy_instances_array_deserializes() {
        let toml_str = r#"
[[legacy.instances]]
id = "docs"
env_prefix = "DOCSWIKI"

[[legacy.instances]]
id = "team"
name = "Team Wiki"
env_prefix = "TEAM"
"#;
        let config: WikictlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.legacy.instances.len(), 2);
        assert_eq!(config.legacy.instances[0].name, None);
        assert_eq!(config.legacy.instances[1].name.as_deref(), Some("Team Wiki"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn legacy_mapping_denies_unknown_fields() {
        let toml_str = r#"
[[legacy.instances]]
id = "docs"
env_prefix = "DOCSWIKI"
api_key = "should not be here"
"#;
        assert!(toml::from_str::<WikictlConfig>(toml_str).is_err());
    }
}
