// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The credential store: CRUD over encrypted instance records.
//!
//! A [`CredentialStore`] starts uninitialized. [`CredentialStore::initialize`]
//! creates or loads the document and derives the key; every other operation
//! fails with [`WikictlError::NotInitialized`] until then, and again after
//! [`CredentialStore::reset_config`].
//!
//! Mutations work on a copy of the document, persist it, and only then swap
//! it in, so a failed write leaves both disk and memory unchanged.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use wikictl_config::KdfConfig;
use wikictl_core::{InstanceInfo, InstanceUpdate, WikiInstance, WikictlError};
use zeroize::Zeroizing;

use crate::crypto::{self, SealedValue};
use crate::document::{EncryptedDocument, EncryptedInstanceRecord, Preferences};
use crate::kdf::{self, KEY_LEN, KdfParams, PasswordSource};

/// Handle to one on-disk store. Construct once and pass it to callers.
pub struct CredentialStore {
    path: PathBuf,
    state: Option<LoadedStore>,
}

struct LoadedStore {
    document: EncryptedDocument,
    /// Derived key -- only in memory, never on disk.
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("path", &self.path)
            .field("initialized", &self.state.is_some())
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Outcome of decrypting one record during [`CredentialStore::verify_all`].
#[derive(Debug)]
pub struct InstanceCheck {
    pub id: String,
    pub result: Result<(), WikictlError>,
}

impl CredentialStore {
    /// An uninitialized handle for the store file at `path`. Touches nothing on disk.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_config_file(&self) -> bool {
        self.path.is_file()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Load the store (or create it on first run) and derive the key.
    ///
    /// Safe to call repeatedly: each call re-reads the file and re-derives the
    /// key. `kdf` only applies to newly created stores; existing stores use
    /// the parameters recorded in their document.
    pub fn initialize(
        &mut self,
        password: &PasswordSource,
        kdf: &KdfConfig,
    ) -> Result<(), WikictlError> {
        if password.is_weak_default() {
            debug!("using machine-derived default store password");
        }
        let secret = password.resolve();

        let (document, key) = if self.has_config_file() {
            let document = EncryptedDocument::load(&self.path)?;
            let salt = document.salt_bytes()?;
            let key = kdf::derive_key(&secret, &salt, &document.kdf_params())?;
            (document, key)
        } else {
            let salt = kdf::generate_salt()?;
            let params = KdfParams::from(kdf);
            let key = kdf::derive_key(&secret, &salt, &params)?;
            let document = EncryptedDocument::new(&salt, params);
            document.persist(&self.path)?;
            info!(path = %self.path.display(), "credential store created");
            (document, key)
        };

        self.state = Some(LoadedStore { document, key });
        Ok(())
    }

    fn loaded(&self) -> Result<&LoadedStore, WikictlError> {
        self.state.as_ref().ok_or(WikictlError::NotInitialized)
    }

    /// Apply `change` to a copy of the document, persist it, then commit it in memory.
    fn mutate<T>(
        &mut self,
        change: impl FnOnce(&mut EncryptedDocument, &[u8; KEY_LEN]) -> Result<T, WikictlError>,
    ) -> Result<T, WikictlError> {
        let loaded = self.state.as_mut().ok_or(WikictlError::NotInitialized)?;
        let mut next = loaded.document.clone();
        let out = change(&mut next, &loaded.key)?;
        next.persist(&self.path)?;
        loaded.document = next;
        Ok(out)
    }

    /// Add a new instance, encrypting its key.
    pub fn add_instance(&mut self, instance: &WikiInstance) -> Result<(), WikictlError> {
        validate_id(&instance.id)?;
        validate_name(&instance.name)?;
        validate_url(&instance.url)?;
        validate_key(&instance.key)?;

        self.mutate(|document, key| {
            if document.find(&instance.id).is_some() {
                return Err(WikictlError::DuplicateInstance {
                    id: instance.id.clone(),
                });
            }
            let sealed = crypto::encrypt_string(key, instance.key.expose_secret())?;
            document.instances.push(EncryptedInstanceRecord {
                id: instance.id.clone(),
                name: instance.name.clone(),
                url: instance.url.clone(),
                encrypted_key: sealed.encrypted_field(),
                iv: sealed.nonce_field(),
            });
            Ok(())
        })?;

        debug!(id = %instance.id, "instance added");
        Ok(())
    }

    /// Apply the supplied fields to an existing instance.
    ///
    /// A new key is always sealed under a fresh nonce.
    pub fn update_instance(
        &mut self,
        id: &str,
        update: &InstanceUpdate,
    ) -> Result<(), WikictlError> {
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        if let Some(url) = &update.url {
            validate_url(url)?;
        }
        if let Some(key) = &update.key {
            validate_key(key)?;
        }

        self.mutate(|document, key| {
            let record = document
                .find_mut(id)
                .ok_or_else(|| WikictlError::InstanceNotFound { id: id.to_string() })?;
            if let Some(name) = &update.name {
                record.name = name.clone();
            }
            if let Some(url) = &update.url {
                record.url = url.clone();
            }
            if let Some(secret) = &update.key {
                let sealed = crypto::encrypt_string(key, secret.expose_secret())?;
                record.encrypted_key = sealed.encrypted_field();
                record.iv = sealed.nonce_field();
            }
            Ok(())
        })?;

        debug!(id = %id, "instance updated");
        Ok(())
    }

    pub fn remove_instance(&mut self, id: &str) -> Result<(), WikictlError> {
        self.mutate(|document, _| {
            let before = document.instances.len();
            document.instances.retain(|r| r.id != id);
            if document.instances.len() == before {
                return Err(WikictlError::InstanceNotFound { id: id.to_string() });
            }
            Ok(())
        })?;

        debug!(id = %id, "instance removed");
        Ok(())
    }

    /// Decrypt and return an instance, or `None` if the id is absent.
    pub fn get_instance(&self, id: &str) -> Result<Option<WikiInstance>, WikictlError> {
        let loaded = self.loaded()?;
        let Some(record) = loaded.document.find(id) else {
            return Ok(None);
        };
        let key = decrypt_record(&loaded.key, record)?;
        Ok(Some(WikiInstance {
            id: record.id.clone(),
            name: record.name.clone(),
            url: record.url.clone(),
            key: SecretString::from(key),
        }))
    }

    /// Non-secret projection of one instance. Never decrypts.
    pub fn get_instance_info(&self, id: &str) -> Result<Option<InstanceInfo>, WikictlError> {
        Ok(self.loaded()?.document.find(id).map(EncryptedInstanceRecord::info))
    }

    /// Non-secret projection of every instance, in insertion order. Never decrypts.
    pub fn get_all_instances(&self) -> Result<Vec<InstanceInfo>, WikictlError> {
        Ok(self
            .loaded()?
            .document
            .instances
            .iter()
            .map(EncryptedInstanceRecord::info)
            .collect())
    }

    pub fn get_instance_ids(&self) -> Result<Vec<String>, WikictlError> {
        Ok(self
            .loaded()?
            .document
            .instances
            .iter()
            .map(|r| r.id.clone())
            .collect())
    }

    pub fn instance_count(&self) -> Result<usize, WikictlError> {
        Ok(self.loaded()?.document.instances.len())
    }

    pub fn contains(&self, id: &str) -> Result<bool, WikictlError> {
        Ok(self.loaded()?.document.find(id).is_some())
    }

    /// Try to decrypt every record, reporting each outcome.
    pub fn verify_all(&self) -> Result<Vec<InstanceCheck>, WikictlError> {
        let loaded = self.loaded()?;
        Ok(loaded
            .document
            .instances
            .iter()
            .map(|record| InstanceCheck {
                id: record.id.clone(),
                result: decrypt_record(&loaded.key, record).map(|_| ()),
            })
            .collect())
    }

    /// Delete the store file and forget all in-memory state.
    pub fn reset_config(&mut self) -> Result<(), WikictlError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(WikictlError::storage)?;
            info!(path = %self.path.display(), "credential store deleted");
        } else {
            warn!(path = %self.path.display(), "reset requested but no store file exists");
        }
        self.state = None;
        Ok(())
    }

    pub fn get_default_theme(&self) -> Result<Option<String>, WikictlError> {
        Ok(self
            .loaded()?
            .document
            .preferences
            .as_ref()
            .and_then(|p| p.default_theme.clone()))
    }

    pub fn set_default_theme(&mut self, theme: &str) -> Result<(), WikictlError> {
        if theme.trim().is_empty() {
            return Err(WikictlError::MalformedInput(
                "theme name must not be empty".to_string(),
            ));
        }
        self.mutate(|document, _| {
            document
                .preferences
                .get_or_insert_with(Preferences::default)
                .default_theme = Some(theme.to_string());
            Ok(())
        })
    }
}

/// Decrypt one record's key, attaching the instance id to any failure.
fn decrypt_record(
    key: &[u8; KEY_LEN],
    record: &EncryptedInstanceRecord,
) -> Result<String, WikictlError> {
    let context = |detail: &str| WikictlError::DecryptionFailed {
        context: format!("instance `{}`: {detail}", record.id),
    };
    let sealed = SealedValue::from_fields(&record.encrypted_key, &record.iv).map_err(|e| {
        debug!(id = %record.id, error = %e, "stored ciphertext is malformed");
        context("stored ciphertext is malformed")
    })?;
    crypto::decrypt_string(key, &sealed)
        .map_err(|_| context("wrong password or corrupted data"))
}

fn validate_id(id: &str) -> Result<(), WikictlError> {
    if id.is_empty() {
        return Err(WikictlError::InvalidInstance("id must not be empty".into()));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(WikictlError::InvalidInstance(format!(
            "id `{id}` may only contain letters, digits, `-` and `_`"
        )));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), WikictlError> {
    if name.trim().is_empty() {
        return Err(WikictlError::InvalidInstance("name must not be empty".into()));
    }
    Ok(())
}

fn validate_url(raw: &str) -> Result<(), WikictlError> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| WikictlError::InvalidInstance(format!("url `{raw}` is not valid: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(WikictlError::InvalidInstance(format!(
            "url `{raw}` must use http or https"
        )));
    }
    Ok(())
}

fn validate_key(key: &SecretString) -> Result<(), WikictlError> {
    if key.expose_secret().trim().is_empty() {
        return Err(WikictlError::InvalidInstance("API key must not be empty".into()));
    }
    Ok(())
}
