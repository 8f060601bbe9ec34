// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for wikictl.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, `WIKICTL_*` environment variable overrides, and
//! miette diagnostics with typo suggestions.

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{STORE_PASSWORD_ENV_VAR, load_config, load_config_from_path, load_config_from_str};
pub use model::{KdfConfig, LegacyConfig, LegacyMapping, WikictlConfig};

/// Load configuration from the XDG hierarchy and validate it.
///
/// On a Figment error, the TOML sources are re-read so that unknown-key
/// diagnostics can point at the offending line.
pub fn load_and_validate() -> Result<WikictlConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = collect_toml_sources(&loader::config_search_paths());
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<WikictlConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = collect_toml_sources(&[path.to_path_buf()]);
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a specific TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<WikictlConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Read every existing config file for error span resolution.
///
/// Each file is listed under both its given and canonical path, since Figment
/// may record either form as the error source.
fn collect_toml_sources(paths: &[PathBuf]) -> Vec<(String, String)> {
    let mut sources = Vec::new();
    for path in paths {
        let Ok(content) = std::fs::read_to_string(path) else {
            continue;
        };
        let given = path.display().to_string();
        if let Ok(canonical) = std::fs::canonicalize(path) {
            let canonical = canonical.display().to_string();
            if canonical != given {
                sources.push((canonical, content.clone()));
            }
        }
        sources.push((given, content));
    }
    sources
}
