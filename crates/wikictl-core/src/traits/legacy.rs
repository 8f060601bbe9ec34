// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The legacy plaintext credential source.

use crate::types::LegacyInstance;

/// Read access to credentials configured through environment variables.
///
/// Implementations only report instances whose URL and key are both non-empty.
pub trait LegacyCredentialSource {
    /// All configured legacy instances, in a stable order.
    fn instances(&self) -> Vec<LegacyInstance>;

    /// The environment-declared default instance id, if any.
    fn default_instance_id(&self) -> Option<String>;

    /// Look up a single legacy instance by id.
    fn instance(&self, id: &str) -> Option<LegacyInstance> {
        self.instances().into_iter().find(|i| i.id == id)
    }

    /// Ids of all configured legacy instances.
    fn instance_ids(&self) -> Vec<String> {
        self.instances().into_iter().map(|i| i.id).collect()
    }

    /// The `<PREFIX>` used for `id` when rendering environment variables.
    ///
    /// Sources with an explicit mapping table override this.
    fn env_prefix_for(&self, id: &str) -> String {
        derived_env_prefix(id)
    }
}

/// Prefix for an id with no explicit mapping: upper-cased, `-` becomes `_`.
pub fn derived_env_prefix(id: &str) -> String {
    id.to_ascii_uppercase().replace('-', "_")
}
