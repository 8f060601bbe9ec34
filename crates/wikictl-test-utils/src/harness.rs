// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end store, resolver, and migration tests.
//!
//! `TestHarness` owns a temp directory holding an initialized credential
//! store, plus a [`MockLegacySource`]. The store uses the lowest accepted
//! Argon2id cost so tests stay fast.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use wikictl_config::{KdfConfig, WikictlConfig};
use wikictl_core::{WikiInstance, WikictlError};
use wikictl_vault::{ConfigResolver, CredentialStore, MigrationCoordinator, PasswordSource};

use crate::mock_legacy::MockLegacySource;

/// Password used for harness stores unless overridden.
pub const TEST_PASSWORD: &str = "test-store-password";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    password: String,
    legacy: MockLegacySource,
    instances: Vec<WikiInstance>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            password: TEST_PASSWORD.to_string(),
            legacy: MockLegacySource::new(),
            instances: Vec::new(),
        }
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = password.to_string();
        self
    }

    /// Use `legacy` as the environment credential source.
    pub fn with_legacy(mut self, legacy: MockLegacySource) -> Self {
        self.legacy = legacy;
        self
    }

    /// Seed the store with `instance` after creation.
    pub fn with_instance(mut self, instance: WikiInstance) -> Self {
        self.instances.push(instance);
        self
    }

    /// Create the temp directory, initialize the store, and seed it.
    pub fn build(self) -> Result<TestHarness, WikictlError> {
        let temp_dir = tempfile::TempDir::new().map_err(WikictlError::storage)?;
        let mut config = WikictlConfig::default();
        config.kdf = fast_kdf();
        config.store.path = Some(temp_dir.path().join("instances.json"));

        let password = SecretString::from(self.password);
        let mut store = CredentialStore::open(config.store.resolved_path());
        store.initialize(&PasswordSource::Explicit(password.clone()), &config.kdf)?;
        for instance in &self.instances {
            store.add_instance(instance)?;
        }
        tracing::debug!(instances = self.instances.len(), "test harness ready");

        Ok(TestHarness {
            store,
            legacy: self.legacy,
            config,
            password,
            temp_dir,
        })
    }
}

/// Argon2id parameters at the validation floor.
pub fn fast_kdf() -> KdfConfig {
    KdfConfig {
        memory_cost: 8192,
        iterations: 1,
        parallelism: 1,
    }
}

/// An initialized store in a temp directory, cleaned up on drop.
pub struct TestHarness {
    pub store: CredentialStore,
    pub legacy: MockLegacySource,
    /// Configuration pointing at the temp store, with fast KDF parameters.
    pub config: WikictlConfig,
    password: SecretString,
    temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn store_path(&self) -> &Path {
        self.store.path()
    }

    /// A path inside the harness temp directory.
    pub fn temp_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    pub fn resolver(&self) -> ConfigResolver<'_> {
        ConfigResolver::new(&self.store, &self.legacy)
    }

    pub fn coordinator(&mut self) -> MigrationCoordinator<'_> {
        MigrationCoordinator::new(&mut self.store, &self.legacy)
    }

    /// Open the same store file again as a separate handle.
    pub fn reopen(&self) -> Result<CredentialStore, WikictlError> {
        self.reopen_with(PasswordSource::Explicit(self.password.clone()))
    }

    /// Open the same store file with a different password.
    pub fn reopen_with(&self, password: PasswordSource) -> Result<CredentialStore, WikictlError> {
        let mut store = CredentialStore::open(self.store.path());
        store.initialize(&password, &self.config.kdf)?;
        Ok(store)
    }
}
