// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from a store password and the per-store salt.
//!
//! The password is either supplied explicitly or derived from stable machine
//! characteristics. The machine-derived password only keeps the API keys out
//! of casual view of the store file; anyone who can run code as the user on
//! the same machine can recompute it.

use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use wikictl_config::KdfConfig;
use wikictl_core::WikictlError;
use zeroize::Zeroizing;

/// Length of the per-store salt in bytes.
pub const SALT_LEN: usize = 32;

/// Length of the derived AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Argon2id cost parameters, recorded in the store document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KdfParams {
    pub memory_cost: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl From<&KdfConfig> for KdfParams {
    fn from(config: &KdfConfig) -> Self {
        Self {
            memory_cost: config.memory_cost,
            iterations: config.iterations,
            parallelism: config.parallelism,
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::from(&KdfConfig::default())
    }
}

/// Where the store password comes from.
#[derive(Clone)]
pub enum PasswordSource {
    /// A password the user supplied (prompt or environment).
    Explicit(SecretString),
    /// The machine-derived fallback. Not a security boundary.
    WeakMachineDefault,
}

impl PasswordSource {
    /// The password bytes to feed into the KDF.
    pub fn resolve(&self) -> SecretString {
        match self {
            Self::Explicit(password) => password.clone(),
            Self::WeakMachineDefault => machine_default_password(),
        }
    }

    pub fn is_weak_default(&self) -> bool {
        matches!(self, Self::WeakMachineDefault)
    }
}

impl std::fmt::Debug for PasswordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit(_) => f.write_str("Explicit([REDACTED])"),
            Self::WeakMachineDefault => f.write_str("WeakMachineDefault"),
        }
    }
}

/// SHA-256 hex digest of `"<os>:<arch>:<kernel release>"`.
///
/// Stable across runs on the same machine until the kernel is upgraded.
/// After an upgrade, records sealed under the old value no longer decrypt.
pub fn machine_default_password() -> SecretString {
    let release = sysinfo::System::kernel_version().unwrap_or_else(|| "unknown".to_string());
    let fingerprint = format!(
        "{}:{}:{}",
        std::env::consts::OS,
        std::env::consts::ARCH,
        release
    );
    SecretString::from(hex::encode(Sha256::digest(fingerprint.as_bytes())))
}

/// Derive a 32-byte key from a password and the store salt using Argon2id.
///
/// A salt of the wrong length is a configuration error: it means the store
/// document was edited or truncated.
pub fn derive_key(
    password: &SecretString,
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, WikictlError> {
    if salt.len() != SALT_LEN {
        return Err(WikictlError::Config(format!(
            "store salt must be {SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }

    let argon_params = argon2::Params::new(
        params.memory_cost,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| WikictlError::Config(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon_params,
    );

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password.expose_secret().as_bytes(), salt, output.as_mut())
        .map_err(|e| WikictlError::Internal(format!("Argon2id key derivation failed: {e}")))?;

    Ok(output)
}

/// Generate a random 32-byte store salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN], WikictlError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| WikictlError::Internal("failed to generate random salt".to_string()))?;
    Ok(salt)
}
