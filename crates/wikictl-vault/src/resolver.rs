// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Picks the effective credential for an instance id.
//!
//! The store wins. While it holds any instance, legacy environment instances
//! are hidden from listings and default selection; an empty store makes the
//! legacy source a transparent fallback.

use serde::Serialize;
use tracing::{debug, warn};
use wikictl_core::{
    InstanceInfo, InstanceSource, LegacyCredentialSource, ResolvedCredential, WikictlError,
};

use crate::store::CredentialStore;

/// One selectable instance and where it comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableInstance {
    #[serde(flatten)]
    pub info: InstanceInfo,
    pub source: InstanceSource,
}

pub struct ConfigResolver<'a> {
    store: &'a CredentialStore,
    legacy: &'a dyn LegacyCredentialSource,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(store: &'a CredentialStore, legacy: &'a dyn LegacyCredentialSource) -> Self {
        Self { store, legacy }
    }

    /// Store ids when the store is non-empty, else legacy ids.
    pub fn get_available_instances(&self) -> Result<Vec<String>, WikictlError> {
        let ids = self.store.get_instance_ids()?;
        if ids.is_empty() {
            Ok(self.legacy.instance_ids())
        } else {
            Ok(ids)
        }
    }

    /// Like [`Self::get_available_instances`], with names, URLs and sources.
    pub fn available_instances(&self) -> Result<Vec<AvailableInstance>, WikictlError> {
        let stored = self.store.get_all_instances()?;
        if !stored.is_empty() {
            return Ok(stored
                .into_iter()
                .map(|info| AvailableInstance {
                    info,
                    source: InstanceSource::Store,
                })
                .collect());
        }
        Ok(self
            .legacy
            .instances()
            .iter()
            .map(|legacy| AvailableInstance {
                info: legacy.info(),
                source: InstanceSource::Legacy,
            })
            .collect())
    }

    /// The environment-declared default, else the first available id.
    pub fn default_instance_id(&self) -> Result<Option<String>, WikictlError> {
        if let Some(id) = self.legacy.default_instance_id() {
            return Ok(Some(id));
        }
        Ok(self.get_available_instances()?.into_iter().next())
    }

    /// Resolve the URL and key to use for `instance_id` (or the default).
    ///
    /// A store record that fails to decrypt falls back to a legacy credential
    /// for the same id when one exists; otherwise the decryption error is
    /// returned rather than reported as an unknown instance.
    pub fn get_dynamic_config(
        &self,
        instance_id: Option<&str>,
    ) -> Result<ResolvedCredential, WikictlError> {
        let id = match instance_id {
            Some(id) => id.to_string(),
            None => self
                .default_instance_id()?
                .ok_or(WikictlError::NoInstancesConfigured)?,
        };

        let decrypt_error = match self.store.get_instance(&id) {
            Ok(Some(instance)) => {
                debug!(id = %id, "credential resolved from store");
                return Ok(ResolvedCredential {
                    instance_id: instance.id,
                    url: instance.url,
                    key: instance.key,
                    source: InstanceSource::Store,
                });
            }
            Ok(None) => None,
            Err(e @ WikictlError::DecryptionFailed { .. }) => Some(e),
            Err(e) => return Err(e),
        };

        if let Some(legacy) = self.legacy.instance(&id) {
            if let Some(err) = &decrypt_error {
                warn!(id = %id, error = %err, "store record unreadable, using legacy environment credential");
            } else {
                debug!(id = %id, "credential resolved from legacy environment");
            }
            return Ok(ResolvedCredential {
                instance_id: legacy.id,
                url: legacy.url,
                key: legacy.key,
                source: InstanceSource::Legacy,
            });
        }

        if let Some(err) = decrypt_error {
            return Err(err);
        }

        Err(WikictlError::UnknownInstance {
            id,
            available: self.get_available_instances()?,
        })
    }
}
