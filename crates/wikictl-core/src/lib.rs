// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types for wikictl.
//!
//! This crate provides the error taxonomy, the decrypted and non-secret
//! instance views, and the trait the credential store uses to read the
//! legacy environment-variable configuration.

pub mod error;
pub mod traits;
pub mod types;

pub use error::WikictlError;
pub use traits::{LegacyCredentialSource, derived_env_prefix};
pub use types::{
    InstanceInfo, InstanceSource, InstanceUpdate, LegacyInstance, ResolvedCredential, WikiInstance,
};
