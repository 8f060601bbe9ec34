// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plaintext credentials from `<PREFIX>_API_URL` / `<PREFIX>_API_KEY` variables.
//!
//! This is the configuration style that predates the encrypted store. It is
//! read from the process environment, or from a dotenv file for imports.

use std::collections::BTreeMap;
use std::path::Path;

use secrecy::SecretString;
use tracing::debug;
use wikictl_config::{LegacyConfig, LegacyMapping};
use wikictl_core::{LegacyCredentialSource, LegacyInstance, WikictlError, derived_env_prefix};

const URL_SUFFIX: &str = "_API_URL";
const KEY_SUFFIX: &str = "_API_KEY";

/// The mappings every installation knows about.
pub fn builtin_mappings() -> Vec<LegacyMapping> {
    vec![LegacyMapping {
        id: "rmwiki".to_string(),
        name: Some("RM Wiki".to_string()),
        env_prefix: "WIKIJS".to_string(),
    }]
}

/// Built-in mappings extended (and overridden by id) with configured ones.
fn merged_mappings(config: &LegacyConfig) -> Vec<LegacyMapping> {
    let mut mappings = builtin_mappings();
    for extra in &config.instances {
        match mappings.iter_mut().find(|m| m.id == extra.id) {
            Some(existing) => *existing = extra.clone(),
            None => mappings.push(extra.clone()),
        }
    }
    mappings
}

/// A snapshot of legacy credential variables.
pub struct EnvLegacySource {
    mappings: Vec<LegacyMapping>,
    vars: BTreeMap<String, String>,
    default_instance_var: String,
}

impl std::fmt::Debug for EnvLegacySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvLegacySource")
            .field("mappings", &self.mappings)
            .field("vars", &self.vars.keys().collect::<Vec<_>>())
            .field("default_instance_var", &self.default_instance_var)
            .finish()
    }
}

impl EnvLegacySource {
    /// Read the current process environment.
    pub fn from_config(config: &LegacyConfig) -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
        Self::from_vars(config, vars)
    }

    /// Build from an explicit set of variables.
    pub fn from_vars(
        config: &LegacyConfig,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let default_instance_var = config.default_instance_var.clone();
        let vars = vars
            .into_iter()
            .filter(|(k, _)| {
                k.ends_with(URL_SUFFIX) || k.ends_with(KEY_SUFFIX) || *k == default_instance_var
            })
            .collect();
        Self {
            mappings: merged_mappings(config),
            vars,
            default_instance_var,
        }
    }

    /// Parse a dotenv file, such as one written by `export`.
    ///
    /// Besides the mapped prefixes, any `<PREFIX>_API_URL` key introduces an
    /// instance whose id is the prefix in lower case.
    pub fn from_env_file(config: &LegacyConfig, path: &Path) -> Result<Self, WikictlError> {
        let iter = dotenvy::from_path_iter(path).map_err(dotenv_error)?;
        let mut vars = Vec::new();
        for item in iter {
            vars.push(item.map_err(dotenv_error)?);
        }

        let mut source = Self::from_vars(config, vars);
        let discovered: Vec<String> = source
            .vars
            .keys()
            .filter_map(|k| k.strip_suffix(URL_SUFFIX))
            .filter(|prefix| !prefix.is_empty())
            .filter(|prefix| !source.mappings.iter().any(|m| m.env_prefix == *prefix))
            .map(str::to_string)
            .collect();
        for prefix in discovered {
            let id = prefix.to_ascii_lowercase();
            if source.mappings.iter().any(|m| m.id == id) {
                continue;
            }
            debug!(id = %id, prefix = %prefix, "discovered unmapped instance in env file");
            source.mappings.push(LegacyMapping {
                id,
                name: None,
                env_prefix: prefix,
            });
        }
        Ok(source)
    }

    pub fn mappings(&self) -> &[LegacyMapping] {
        &self.mappings
    }

    fn non_empty(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

impl LegacyCredentialSource for EnvLegacySource {
    fn instances(&self) -> Vec<LegacyInstance> {
        self.mappings
            .iter()
            .filter_map(|m| {
                let url = self.non_empty(&format!("{}{URL_SUFFIX}", m.env_prefix))?;
                let key = self.non_empty(&format!("{}{KEY_SUFFIX}", m.env_prefix))?;
                Some(LegacyInstance {
                    id: m.id.clone(),
                    name: m.name.clone().unwrap_or_else(|| m.id.clone()),
                    env_prefix: m.env_prefix.clone(),
                    url: url.to_string(),
                    key: SecretString::from(key.to_string()),
                })
            })
            .collect()
    }

    fn default_instance_id(&self) -> Option<String> {
        self.non_empty(&self.default_instance_var).map(|v| v.trim().to_string())
    }

    fn env_prefix_for(&self, id: &str) -> String {
        self.mappings
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.env_prefix.clone())
            .unwrap_or_else(|| derived_env_prefix(id))
    }
}

fn dotenv_error(err: dotenvy::Error) -> WikictlError {
    match err {
        dotenvy::Error::Io(io) => WikictlError::storage(io),
        other => WikictlError::MalformedInput(format!("invalid env file: {other}")),
    }
}

/// Render `value` so that a dotenv parser reads it back unchanged.
///
/// Plain tokens stay bare. Anything else is single-quoted (literal), or
/// double-quoted with escapes when it contains a single quote.
pub fn quote_env_value(value: &str) -> String {
    let bare = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_.:/@+,~%".contains(c));
    if bare {
        return value.to_string();
    }
    if !value.contains('\'') && !value.contains('\n') {
        return format!("'{value}'");
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' | '$' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
