// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instance types shared by the store, the resolver, and the CLI.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// A decrypted wiki instance: the plaintext view handed to callers.
///
/// Never persisted in this form. `Debug` output redacts the API key.
#[derive(Clone, Deserialize)]
pub struct WikiInstance {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub url: String,
    #[serde(deserialize_with = "deserialize_secret")]
    pub key: SecretString,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl WikiInstance {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        url: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            key: SecretString::from(key.into()),
        }
    }

    /// The non-secret projection of this instance.
    pub fn info(&self) -> InstanceInfo {
        InstanceInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            url: self.url.clone(),
        }
    }
}

impl PartialEq for WikiInstance {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.url == other.url
            && self.key.expose_secret() == other.key.expose_secret()
    }
}

impl Eq for WikiInstance {}

impl fmt::Debug for WikiInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WikiInstance")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("url", &self.url)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Non-secret instance metadata, safe to render in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceInfo {
    pub id: String,
    pub name: String,
    pub url: String,
}

/// A partial update: only the `Some` fields are applied.
#[derive(Clone, Default)]
pub struct InstanceUpdate {
    pub name: Option<String>,
    pub url: Option<String>,
    pub key: Option<SecretString>,
}

impl InstanceUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none() && self.key.is_none()
    }
}

impl fmt::Debug for InstanceUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceUpdate")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// A credential found in the legacy environment-variable source.
///
/// Only constructed when both the URL and the key are non-empty.
#[derive(Clone)]
pub struct LegacyInstance {
    pub id: String,
    pub name: String,
    /// The `<PREFIX>` part of `<PREFIX>_API_URL` / `<PREFIX>_API_KEY`.
    pub env_prefix: String,
    pub url: String,
    pub key: SecretString,
}

impl LegacyInstance {
    pub fn info(&self) -> InstanceInfo {
        InstanceInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            url: self.url.clone(),
        }
    }

    /// Convert into the form accepted by the credential store.
    pub fn to_wiki_instance(&self) -> WikiInstance {
        WikiInstance {
            id: self.id.clone(),
            name: self.name.clone(),
            url: self.url.clone(),
            key: self.key.clone(),
        }
    }
}

impl fmt::Debug for LegacyInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyInstance")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("env_prefix", &self.env_prefix)
            .field("url", &self.url)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Where an instance or credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceSource {
    /// The encrypted credential store.
    Store,
    /// `<PREFIX>_API_URL` / `<PREFIX>_API_KEY` environment variables.
    Legacy,
}

impl fmt::Display for InstanceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store => f.write_str("store"),
            Self::Legacy => f.write_str("legacy"),
        }
    }
}

/// The effective credential for one instance, as produced by the resolver.
#[derive(Clone)]
pub struct ResolvedCredential {
    pub instance_id: String,
    pub url: String,
    pub key: SecretString,
    pub source: InstanceSource,
}

impl fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredential")
            .field("instance_id", &self.instance_id)
            .field("url", &self.url)
            .field("key", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_keys() {
        let instance = WikiInstance::new("rmwiki", "RM Wiki", "https://wiki.example", "secret123");
        let debug = format!("{instance:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret123"));

        let update = InstanceUpdate {
            key: Some(SecretString::from("hunter2".to_string())),
            ..Default::default()
        };
        assert!(!format!("{update:?}").contains("hunter2"));
    }

    #[test]
    fn equality_compares_keys() {
        let a = WikiInstance::new("a", "A", "https://a.example", "k1");
        let b = WikiInstance::new("a", "A", "https://a.example", "k1");
        let c = WikiInstance::new("a", "A", "https://a.example", "k2");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn wiki_instance_deserializes_from_form_record() {
        let json = r#"{"id":"rmwiki","name":"RM Wiki","url":"https://wiki.example","key":"abc"}"#;
        let instance: WikiInstance = serde_json::from_str(json).unwrap();
        assert_eq!(instance.id, "rmwiki");
        assert_eq!(instance.key.expose_secret(), "abc");
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(InstanceUpdate::default().is_empty());
        let update = InstanceUpdate {
            name: Some("x".into()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn instance_source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&InstanceSource::Legacy).unwrap(),
            "\"legacy\""
        );
        assert_eq!(InstanceSource::Store.to_string(), "store");
    }
}
