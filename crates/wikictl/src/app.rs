// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide handles shared by every subcommand.

use std::path::PathBuf;

use tracing::debug;
use wikictl_config::WikictlConfig;
use wikictl_core::{LegacyCredentialSource, WikictlError};
use wikictl_vault::{
    ConfigResolver, CredentialStore, EnvLegacySource, MigrationCoordinator, get_store_password,
};

/// The store handle and legacy source, constructed once in `main`.
pub struct App {
    pub config: WikictlConfig,
    pub store: CredentialStore,
    pub legacy: EnvLegacySource,
    config_files: Vec<PathBuf>,
    ask_password: bool,
}

impl App {
    /// Open (but do not unlock) the store. `store_override` wins over `store.path`.
    pub fn new(config: WikictlConfig, store_override: Option<PathBuf>, ask_password: bool) -> Self {
        let path = store_override.unwrap_or_else(|| config.store.resolved_path());
        debug!(path = %path.display(), "using credential store");
        let legacy = EnvLegacySource::from_config(&config.legacy);
        Self {
            store: CredentialStore::open(path),
            legacy,
            config,
            config_files: Vec::new(),
            ask_password,
        }
    }

    /// Record the config files that were merged into `config`.
    pub fn with_config_files(mut self, files: Vec<PathBuf>) -> Self {
        self.config_files = files;
        self
    }

    pub fn config_files(&self) -> &[PathBuf] {
        &self.config_files
    }

    /// Whether the password comes from an interactive prompt.
    pub fn asks_password(&self) -> bool {
        self.ask_password
    }

    /// Acquire the password and initialize the store, creating it if needed.
    pub fn unlock(&mut self) -> Result<(), WikictlError> {
        if self.store.is_initialized() {
            return Ok(());
        }
        let password = get_store_password(self.ask_password)?;
        self.store.initialize(&password, &self.config.kdf)
    }

    pub fn resolver(&self) -> ConfigResolver<'_> {
        ConfigResolver::new(&self.store, &self.legacy)
    }

    pub fn coordinator(&mut self) -> MigrationCoordinator<'_> {
        MigrationCoordinator::new(&mut self.store, &self.legacy)
    }

    /// Ids to suggest after a failure.
    ///
    /// A locked store only yields legacy ids, and only when no store file exists.
    pub fn available_ids(&self) -> Vec<String> {
        if self.store.is_initialized() {
            return self.resolver().get_available_instances().unwrap_or_default();
        }
        if self.store.has_config_file() {
            return Vec::new();
        }
        self.legacy.instance_ids()
    }
}
