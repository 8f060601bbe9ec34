// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for wikictl.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level wikictl configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WikictlConfig {
    /// Encrypted credential store location.
    #[serde(default)]
    pub store: StoreConfig,

    /// Key derivation parameters for newly created stores.
    #[serde(default)]
    pub kdf: KdfConfig,

    /// Legacy environment-variable credential source.
    #[serde(default)]
    pub legacy: LegacyConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Credential store configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Path to the encrypted store document. `None` uses the per-user default.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// The effective store path: the configured override or the per-user default.
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_store_path)
    }
}

/// `<config_dir>/wikictl/instances.json`, falling back to the working directory.
pub fn default_store_path() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join("wikictl").join("instances.json"))
        .unwrap_or_else(|| PathBuf::from("wikictl-instances.json"))
}

/// Argon2id parameters used when a new store is created.
///
/// Existing stores keep the parameters recorded in their document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KdfConfig {
    /// Argon2id memory cost in KiB (default: 19456 = 19 MiB).
    #[serde(default = "default_kdf_memory_cost")]
    pub memory_cost: u32,

    /// Argon2id iteration count (default: 2).
    #[serde(default = "default_kdf_iterations")]
    pub iterations: u32,

    /// Argon2id parallelism lanes (default: 1).
    #[serde(default = "default_kdf_parallelism")]
    pub parallelism: u32,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            memory_cost: default_kdf_memory_cost(),
            iterations: default_kdf_iterations(),
            parallelism: default_kdf_parallelism(),
        }
    }
}

fn default_kdf_memory_cost() -> u32 {
    19456 // OWASP minimum for Argon2id
}

fn default_kdf_iterations() -> u32 {
    2
}

fn default_kdf_parallelism() -> u32 {
    1
}

/// Legacy environment-variable source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyConfig {
    /// Name of the variable holding the default instance id.
    #[serde(default = "default_instance_var")]
    pub default_instance_var: String,

    /// Extra id-to-prefix mappings on top of the built-in table.
    #[serde(default)]
    pub instances: Vec<LegacyMapping>,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            default_instance_var: default_instance_var(),
            instances: Vec::new(),
        }
    }
}

fn default_instance_var() -> String {
    "WIKIJS_DEFAULT_INSTANCE".to_string()
}

/// Maps an instance id to its `<PREFIX>_API_URL` / `<PREFIX>_API_KEY` variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyMapping {
    /// Instance id.
    pub id: String,

    /// Display name. Defaults to the id.
    #[serde(default)]
    pub name: Option<String>,

    /// Variable prefix, e.g. `DOCSWIKI` for `DOCSWIKI_API_URL`.
    pub env_prefix: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
