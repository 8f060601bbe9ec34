// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the credential store layer.

pub mod legacy;

pub use legacy::{LegacyCredentialSource, derived_env_prefix};
