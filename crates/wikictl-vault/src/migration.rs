// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Moving credentials between the legacy environment and the encrypted store.
//!
//! Batch operations recover per instance: one bad record is reported in the
//! result and the rest of the batch continues.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{info, warn};
use wikictl_config::LegacyConfig;
use wikictl_core::{InstanceUpdate, LegacyCredentialSource, LegacyInstance, WikictlError};

use crate::legacy::{EnvLegacySource, quote_env_value};
use crate::store::CredentialStore;

/// Report of what a migration did.
#[derive(Debug, Default, Serialize)]
pub struct MigrationReport {
    /// Ids added to the store, or overwritten when requested.
    pub migrated: Vec<String>,
    /// Ids already in the store and left alone.
    pub skipped: Vec<String>,
    /// Per-instance failures. These never abort the batch.
    pub errors: Vec<MigrationFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationFailure {
    pub id: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationDirection {
    /// Legacy environment into the encrypted store.
    ToEncrypted,
    /// Encrypted store out to environment-variable text.
    ToEnv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewAction {
    Migrate,
    Skip,
    Overwrite,
    Export,
}

impl fmt::Display for PreviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Migrate => "will migrate",
            Self::Skip => "will skip (already in store)",
            Self::Overwrite => "will overwrite",
            Self::Export => "will export",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewEntry {
    pub id: String,
    pub name: String,
    pub action: PreviewAction,
}

/// Orchestrates migrations over one store and one legacy source.
pub struct MigrationCoordinator<'a> {
    store: &'a mut CredentialStore,
    legacy: &'a dyn LegacyCredentialSource,
}

impl<'a> MigrationCoordinator<'a> {
    pub fn new(store: &'a mut CredentialStore, legacy: &'a dyn LegacyCredentialSource) -> Self {
        Self { store, legacy }
    }

    /// Copy every legacy instance into the store.
    pub fn migrate_to_encrypted(&mut self, overwrite: bool) -> Result<MigrationReport, WikictlError> {
        migrate_source(&mut *self.store, self.legacy, overwrite)
    }

    /// Migrate the instances defined in a dotenv file.
    pub fn import_env_file(
        &mut self,
        config: &LegacyConfig,
        path: &Path,
        overwrite: bool,
    ) -> Result<MigrationReport, WikictlError> {
        let source = EnvLegacySource::from_env_file(config, path)?;
        info!(path = %path.display(), instances = source.instances().len(), "importing env file");
        migrate_source(&mut *self.store, &source, overwrite)
    }

    /// Render every store instance as `<PREFIX>_API_URL` / `<PREFIX>_API_KEY` lines.
    ///
    /// Instances that cannot be exported become `# Error exporting <id>: ...`
    /// comments. The output contains plaintext keys.
    pub fn generate_env_from_encrypted(&self) -> Result<String, WikictlError> {
        let mut out = String::from(
            "# Wiki.js instance credentials exported by wikictl\n\
             # WARNING: contains plaintext API keys\n\n",
        );
        let mut prefixes: BTreeMap<String, String> = BTreeMap::new();

        for info in self.store.get_all_instances()? {
            let prefix = self.legacy.env_prefix_for(&info.id);
            if let Some(owner) = prefixes.get(&prefix) {
                warn!(id = %info.id, prefix = %prefix, "env prefix collision, instance not exported");
                out.push_str(&format!(
                    "# Error exporting {}: prefix {prefix} is already used by {owner}\n\n",
                    info.id
                ));
                continue;
            }

            match self.store.get_instance(&info.id) {
                Ok(Some(instance)) => {
                    out.push_str(&format!("# {} ({})\n", instance.name, instance.id));
                    out.push_str(&format!("{prefix}_API_URL={}\n", quote_env_value(&instance.url)));
                    out.push_str(&format!(
                        "{prefix}_API_KEY={}\n\n",
                        quote_env_value(instance.key.expose_secret())
                    ));
                    prefixes.insert(prefix, instance.id);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(id = %info.id, error = %e, "failed to export instance");
                    out.push_str(&format!("# Error exporting {}: {e}\n\n", info.id));
                }
            }
        }

        Ok(out)
    }

    /// Delete the encrypted store.
    pub fn reset_encrypted_config(&mut self) -> Result<(), WikictlError> {
        self.store.reset_config()
    }

    /// What a migration in `direction` would do, without writing anything.
    pub fn preview_migration(
        &self,
        direction: MigrationDirection,
        overwrite: bool,
    ) -> Result<Vec<PreviewEntry>, WikictlError> {
        match direction {
            MigrationDirection::ToEncrypted => Ok(plan(&*self.store, self.legacy, overwrite)?
                .into_iter()
                .map(|(instance, action)| PreviewEntry {
                    id: instance.id,
                    name: instance.name,
                    action,
                })
                .collect()),
            MigrationDirection::ToEnv => Ok(self
                .store
                .get_all_instances()?
                .into_iter()
                .map(|info| PreviewEntry {
                    id: info.id,
                    name: info.name,
                    action: PreviewAction::Export,
                })
                .collect()),
        }
    }
}

/// Decide the action for every instance of `source`.
fn plan(
    store: &CredentialStore,
    source: &dyn LegacyCredentialSource,
    overwrite: bool,
) -> Result<Vec<(LegacyInstance, PreviewAction)>, WikictlError> {
    source
        .instances()
        .into_iter()
        .map(|instance| {
            let action = match (store.contains(&instance.id)?, overwrite) {
                (false, _) => PreviewAction::Migrate,
                (true, false) => PreviewAction::Skip,
                (true, true) => PreviewAction::Overwrite,
            };
            Ok::<_, WikictlError>((instance, action))
        })
        .collect()
}

fn migrate_source(
    store: &mut CredentialStore,
    source: &dyn LegacyCredentialSource,
    overwrite: bool,
) -> Result<MigrationReport, WikictlError> {
    let mut report = MigrationReport::default();

    for (instance, action) in plan(store, source, overwrite)? {
        let result = match action {
            PreviewAction::Skip => {
                report.skipped.push(instance.id);
                continue;
            }
            PreviewAction::Migrate => store.add_instance(&instance.to_wiki_instance()),
            PreviewAction::Overwrite => store.update_instance(
                &instance.id,
                &InstanceUpdate {
                    name: Some(instance.name.clone()),
                    url: Some(instance.url.clone()),
                    key: Some(instance.key.clone()),
                },
            ),
            PreviewAction::Export => continue,
        };

        match result {
            Ok(()) => report.migrated.push(instance.id),
            Err(e) => {
                warn!(id = %instance.id, error = %e, "failed to migrate instance");
                report.errors.push(MigrationFailure {
                    id: instance.id,
                    message: e.to_string(),
                });
            }
        }
    }

    info!(
        migrated = report.migrated.len(),
        skipped = report.skipped.len(),
        errors = report.errors.len(),
        "migration finished"
    );
    Ok(report)
}
