// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./wikictl.toml` > `~/.config/wikictl/wikictl.toml` > `/etc/wikictl/wikictl.toml`
//! with environment variable overrides via `WIKICTL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::WikictlConfig;

/// Environment variable carrying the store password. Read by the password
/// prompt, never by the config loader.
pub const STORE_PASSWORD_ENV_VAR: &str = "WIKICTL_STORE_PASSWORD";

const SYSTEM_CONFIG_PATH: &str = "/etc/wikictl/wikictl.toml";
const LOCAL_CONFIG_PATH: &str = "wikictl.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/wikictl/wikictl.toml` (system-wide)
/// 3. `~/.config/wikictl/wikictl.toml` (user XDG config)
/// 4. `./wikictl.toml` (local directory)
/// 5. `WIKICTL_*` environment variables
pub fn load_config() -> Result<WikictlConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<WikictlConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WikictlConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<WikictlConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WikictlConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(WikictlConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// `<config_dir>/wikictl/wikictl.toml`, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wikictl/wikictl.toml"))
}

/// All candidate config file paths in merge order.
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
    paths.extend(user_config_path());
    paths.push(PathBuf::from(LOCAL_CONFIG_PATH));
    paths
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because field names contain
/// underscores: `WIKICTL_KDF_MEMORY_COST` must map to `kdf.memory_cost`.
/// The store password variable shares the prefix and is excluded.
fn env_provider() -> Env {
    Env::prefixed("WIKICTL_")
        .ignore(&["STORE_PASSWORD"])
        .map(|key| {
            let mapped = key
                .as_str()
                .replacen("store_", "store.", 1)
                .replacen("kdf_", "kdf.", 1)
                .replacen("legacy_", "legacy.", 1)
                .replacen("log_", "log.", 1);
            mapped.into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_map_to_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("WIKICTL_KDF_MEMORY_COST", "65536");
            jail.set_env("WIKICTL_LOG_LEVEL", "debug");
            jail.set_env("WIKICTL_STORE_PATH", "/tmp/wikictl-test.json");

            let config: WikictlConfig = Figment::new()
                .merge(Serialized::defaults(WikictlConfig::default()))
                .merge(env_provider())
                .extract()?;

            assert_eq!(config.kdf.memory_cost, 65536);
            assert_eq!(config.log.level, "debug");
            assert_eq!(
                config.store.path.as_deref(),
                Some(Path::new("/tmp/wikictl-test.json"))
            );
            Ok(())
        });
    }

    #[test]
    fn store_password_is_not_treated_as_config() {
        figment::Jail::expect_with(|jail| {
            jail.set_env(STORE_PASSWORD_ENV_VAR, "hunter2");

            let config: WikictlConfig = Figment::new()
                .merge(Serialized::defaults(WikictlConfig::default()))
                .merge(env_provider())
                .extract()?;

            assert!(config.store.path.is_none());
            Ok(())
        });
    }

    #[test]
    fn load_from_path_reads_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[log]\nlevel = \"info\"\n")?;
            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.log.level, "info");
            Ok(())
        });
    }

    #[test]
    fn search_paths_end_with_local_file() {
        let paths = config_search_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from(SYSTEM_CONFIG_PATH)));
        assert_eq!(paths.last(), Some(&PathBuf::from(LOCAL_CONFIG_PATH)));
    }
}
