// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory legacy credential source.

use secrecy::SecretString;
use wikictl_core::{LegacyCredentialSource, LegacyInstance};

/// A legacy source whose instances are set up by the test.
///
/// Mirrors the environment source: instances with an empty URL or key are
/// never reported.
#[derive(Debug, Default, Clone)]
pub struct MockLegacySource {
    instances: Vec<LegacyInstance>,
    default_instance: Option<String>,
}

impl MockLegacySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an instance under `env_prefix`.
    pub fn with_instance(
        mut self,
        id: &str,
        name: &str,
        env_prefix: &str,
        url: &str,
        key: &str,
    ) -> Self {
        self.instances.push(LegacyInstance {
            id: id.to_string(),
            name: name.to_string(),
            env_prefix: env_prefix.to_string(),
            url: url.to_string(),
            key: SecretString::from(key.to_string()),
        });
        self
    }

    /// The usual single-wiki setup: `rmwiki` under `WIKIJS_*`.
    pub fn rmwiki(url: &str, key: &str) -> Self {
        Self::new().with_instance("rmwiki", "RM Wiki", "WIKIJS", url, key)
    }

    pub fn with_default_instance(mut self, id: &str) -> Self {
        self.default_instance = Some(id.to_string());
        self
    }
}

impl LegacyCredentialSource for MockLegacySource {
    fn instances(&self) -> Vec<LegacyInstance> {
        use secrecy::ExposeSecret;
        self.instances
            .iter()
            .filter(|i| !i.url.is_empty() && !i.key.expose_secret().is_empty())
            .cloned()
            .collect()
    }

    fn default_instance_id(&self) -> Option<String> {
        self.default_instance.clone()
    }

    fn env_prefix_for(&self, id: &str) -> String {
        self.instances
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.env_prefix.clone())
            .unwrap_or_else(|| wikictl_core::derived_env_prefix(id))
    }
}
