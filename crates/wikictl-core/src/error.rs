// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for wikictl.

use thiserror::Error;

/// The primary error type used across the credential store, resolver, and migration code.
#[derive(Debug, Error)]
pub enum WikictlError {
    /// Configuration errors (unreadable store, bad salt, unsupported document version).
    #[error("configuration error: {0}")]
    Config(String),

    /// Disk I/O or serialization failure while reading or writing the store.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A store operation was attempted before `initialize()`.
    #[error("credential store is not initialized")]
    NotInitialized,

    /// An instance with this id is already present in the store.
    #[error("instance `{id}` already exists")]
    DuplicateInstance { id: String },

    /// No instance with this id is present in the store.
    #[error("instance `{id}` not found")]
    InstanceNotFound { id: String },

    /// Authentication tag did not verify (wrong password or tampered data).
    #[error("failed to decrypt {context}")]
    DecryptionFailed { context: String },

    /// Hex decoding failure or a missing nonce/tag component.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Instance fields failed syntactic validation.
    #[error("invalid instance: {0}")]
    InvalidInstance(String),

    /// The requested id is neither in the store nor in the legacy source.
    #[error("unknown instance `{id}`; available instances: {}", format_available(available))]
    UnknownInstance { id: String, available: Vec<String> },

    /// Neither the store nor the legacy source holds any instance.
    #[error(
        "no wiki instances configured; add one with `wikictl instance add` \
         or set WIKIJS_API_URL and WIKIJS_API_KEY"
    )]
    NoInstancesConfigured,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WikictlError {
    /// Wrap any I/O or serialization error as a storage error.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "(none)".to_string()
    } else {
        available.join(", ")
    }
}
