// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persisted store document and its atomic on-disk representation.
//!
//! Layout (camelCase JSON):
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "salt": "<64 hex chars>",
//!   "kdf": { "memoryCost": 19456, "iterations": 2, "parallelism": 1 },
//!   "instances": [
//!     { "id": "rmwiki", "name": "RM Wiki", "url": "https://...",
//!       "encryptedKey": "<hex>:<hex-tag>", "iv": "<hex>" }
//!   ],
//!   "preferences": { "defaultTheme": "dark" }
//! }
//! ```
//!
//! Only `encryptedKey` is secret. The whole document is rewritten on every
//! mutation through a temp file in the same directory plus a rename.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wikictl_core::{InstanceInfo, WikictlError};

use crate::kdf::{KdfParams, SALT_LEN};

/// Schema version written into new documents.
pub const DOCUMENT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedDocument {
    pub version: String,
    /// Hex-encoded 32-byte salt, generated once per store.
    pub salt: String,
    /// Argon2id parameters the store was created with. Absent in documents
    /// written before parameters were recorded; those use the defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf: Option<KdfParams>,
    #[serde(default)]
    pub instances: Vec<EncryptedInstanceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
}

/// One instance at rest. `id` is unique within the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedInstanceRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    /// `hex(ciphertext):hex(tag)`.
    pub encrypted_key: String,
    /// Hex nonce.
    pub iv: String,
}

impl EncryptedInstanceRecord {
    pub fn info(&self) -> InstanceInfo {
        InstanceInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            url: self.url.clone(),
        }
    }
}

/// Plaintext user settings. Unrecognized keys are preserved across rewrites.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_theme: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl EncryptedDocument {
    /// A fresh, empty document.
    pub fn new(salt: &[u8; SALT_LEN], kdf: KdfParams) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            salt: hex::encode(salt),
            kdf: Some(kdf),
            instances: Vec::new(),
            preferences: None,
        }
    }

    /// Decode the salt, failing fast on anything but 32 bytes of hex.
    pub fn salt_bytes(&self) -> Result<[u8; SALT_LEN], WikictlError> {
        let bytes = hex::decode(&self.salt)
            .map_err(|e| WikictlError::Config(format!("store salt is not valid hex: {e}")))?;
        let len = bytes.len();
        bytes.try_into().map_err(|_| {
            WikictlError::Config(format!("store salt must be {SALT_LEN} bytes, got {len}"))
        })
    }

    pub fn kdf_params(&self) -> KdfParams {
        self.kdf.unwrap_or_default()
    }

    /// Reject documents from an incompatible schema major version.
    pub fn check_version(&self) -> Result<(), WikictlError> {
        let found = semver::Version::parse(&self.version).map_err(|e| {
            WikictlError::Config(format!("invalid store version `{}`: {e}", self.version))
        })?;
        let supported = semver::Version::parse(DOCUMENT_VERSION)
            .map_err(|e| WikictlError::Internal(format!("bad DOCUMENT_VERSION: {e}")))?;
        if found.major != supported.major {
            return Err(WikictlError::Config(format!(
                "store version {found} is not supported (expected {}.x)",
                supported.major
            )));
        }
        Ok(())
    }

    pub fn find(&self, id: &str) -> Option<&EncryptedInstanceRecord> {
        self.instances.iter().find(|r| r.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut EncryptedInstanceRecord> {
        self.instances.iter_mut().find(|r| r.id == id)
    }

    /// Read and parse a document from disk.
    pub fn load(path: &Path) -> Result<Self, WikictlError> {
        let content = std::fs::read_to_string(path).map_err(WikictlError::storage)?;
        let document: Self = serde_json::from_str(&content).map_err(|e| {
            WikictlError::Config(format!("corrupt store file {}: {e}", path.display()))
        })?;
        document.check_version()?;
        debug!(path = %path.display(), instances = document.instances.len(), "store document loaded");
        Ok(document)
    }

    /// Atomically replace the file at `path` with this document.
    ///
    /// The parent directory is created if missing. `NamedTempFile` creates the
    /// file with mode 0600 on Unix and the rename keeps it.
    pub fn persist(&self, path: &Path) -> Result<(), WikictlError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(WikictlError::storage)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(WikictlError::storage)?;
        serde_json::to_writer_pretty(&mut tmp, self).map_err(WikictlError::storage)?;
        tmp.write_all(b"\n").map_err(WikictlError::storage)?;
        tmp.as_file().sync_all().map_err(WikictlError::storage)?;
        tmp.persist(path).map_err(|e| WikictlError::storage(e.error))?;

        debug!(path = %path.display(), instances = self.instances.len(), "store document written");
        Ok(())
    }
}
