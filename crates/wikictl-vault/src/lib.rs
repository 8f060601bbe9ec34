// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted multi-instance credential store for wikictl.
//!
//! Instance API keys are sealed individually with AES-256-GCM under a key
//! derived from the store password via Argon2id. The salt and ciphertexts
//! live in one JSON document; the derived key only ever exists in memory.
//! The legacy `<PREFIX>_API_URL` / `<PREFIX>_API_KEY` environment variables
//! remain usable through the resolver and can be migrated into the store.

pub mod crypto;
pub mod document;
pub mod kdf;
pub mod legacy;
pub mod migration;
pub mod prompt;
pub mod resolver;
pub mod store;

pub use kdf::PasswordSource;
pub use legacy::EnvLegacySource;
pub use migration::{
    MigrationCoordinator, MigrationDirection, MigrationFailure, MigrationReport, PreviewAction,
    PreviewEntry,
};
pub use prompt::{get_store_password, read_secret};
pub use resolver::{AvailableInstance, ConfigResolver};
pub use store::{CredentialStore, InstanceCheck};
