// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM seal/open of individual secret strings.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the system
//! CSPRNG. Nonce reuse would be catastrophic for GCM security.
//!
//! The tag is kept separate from the ciphertext so that the persisted form is
//! `hex(ciphertext):hex(tag)` with the nonce stored next to it as hex.

use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use wikictl_core::WikictlError;

use crate::kdf::KEY_LEN;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// The output of one encryption: ciphertext, nonce, and authentication tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedValue {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
}

impl SealedValue {
    /// The `encryptedKey` field: `hex(ciphertext):hex(tag)`.
    pub fn encrypted_field(&self) -> String {
        format!("{}:{}", hex::encode(&self.ciphertext), hex::encode(self.tag))
    }

    /// The `iv` field: `hex(nonce)`.
    pub fn nonce_field(&self) -> String {
        hex::encode(self.nonce)
    }

    /// Parse the persisted `encryptedKey` and `iv` fields.
    pub fn from_fields(encrypted: &str, iv: &str) -> Result<Self, WikictlError> {
        let (ciphertext_hex, tag_hex) = encrypted.split_once(':').ok_or_else(|| {
            WikictlError::MalformedInput("encrypted value is missing the `:tag` component".into())
        })?;

        let ciphertext = hex::decode(ciphertext_hex)
            .map_err(|e| WikictlError::MalformedInput(format!("ciphertext is not valid hex: {e}")))?;
        let tag: [u8; TAG_LEN] = decode_fixed(tag_hex, "authentication tag")?;
        let nonce: [u8; NONCE_LEN] = decode_fixed(iv, "nonce")?;

        Ok(Self {
            ciphertext,
            nonce,
            tag,
        })
    }
}

fn decode_fixed<const N: usize>(hex_str: &str, what: &str) -> Result<[u8; N], WikictlError> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| WikictlError::MalformedInput(format!("{what} is not valid hex: {e}")))?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        WikictlError::MalformedInput(format!("{what} must be {N} bytes, got {len}"))
    })
}

fn aead_key(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, WikictlError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| WikictlError::Internal("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt plaintext with AES-256-GCM under a fresh random nonce.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<SealedValue, WikictlError> {
    let key = aead_key(key)?;

    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| WikictlError::Internal("failed to generate random nonce".to_string()))?;

    let mut in_out = plaintext.to_vec();
    let tag = key
        .seal_in_place_separate_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|_| WikictlError::Internal("AES-256-GCM encryption failed".to_string()))?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(tag.as_ref());

    Ok(SealedValue {
        ciphertext: in_out,
        nonce: nonce_bytes,
        tag: tag_bytes,
    })
}

/// Decrypt and authenticate a sealed value.
///
/// Fails with [`WikictlError::DecryptionFailed`] if the key is wrong or any
/// of ciphertext, nonce, or tag was modified.
pub fn open(key: &[u8; KEY_LEN], sealed: &SealedValue) -> Result<Vec<u8>, WikictlError> {
    let key = aead_key(key)?;

    let mut in_out = Vec::with_capacity(sealed.ciphertext.len() + TAG_LEN);
    in_out.extend_from_slice(&sealed.ciphertext);
    in_out.extend_from_slice(&sealed.tag);

    let plaintext = key
        .open_in_place(
            Nonce::assume_unique_for_key(sealed.nonce),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|_| WikictlError::DecryptionFailed {
            context: "value: wrong password or corrupted data".to_string(),
        })?;

    Ok(plaintext.to_vec())
}

/// Encrypt a UTF-8 secret.
pub fn encrypt_string(key: &[u8; KEY_LEN], plaintext: &str) -> Result<SealedValue, WikictlError> {
    seal(key, plaintext.as_bytes())
}

/// Decrypt a sealed UTF-8 secret.
pub fn decrypt_string(key: &[u8; KEY_LEN], sealed: &SealedValue) -> Result<String, WikictlError> {
    let plaintext = open(key, sealed)?;
    String::from_utf8(plaintext).map_err(|_| WikictlError::DecryptionFailed {
        context: "value: plaintext is not valid UTF-8".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_key() -> [u8; KEY_LEN] {
        let mut key = [0u8; KEY_LEN];
        SystemRandom::new().fill(&mut key).unwrap();
        key
    }

    #[test]
    fn seal_open_roundtrip() {
        let key = random_key();
        let sealed = encrypt_string(&key, "secret api key value").unwrap();
        assert_eq!(decrypt_string(&key, &sealed).unwrap(), "secret api key value");
    }

    #[test]
    fn same_plaintext_gets_fresh_nonce() {
        let key = random_key();
        let a = encrypt_string(&key, "same input twice").unwrap();
        let b = encrypt_string(&key, "same input twice").unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn ciphertext_length_matches_plaintext() {
        let key = random_key();
        let sealed = seal(&key, b"hello").unwrap();
        assert_eq!(sealed.ciphertext.len(), 5);
    }

    #[test]
    fn wrong_key_fails_with_decryption_error() {
        let sealed = encrypt_string(&random_key(), "secret").unwrap();
        let err = decrypt_string(&random_key(), &sealed).unwrap_err();
        assert!(matches!(err, WikictlError::DecryptionFailed { .. }));
    }

    #[test]
    fn tampered_tag_fails() {
        let key = random_key();
        let mut sealed = encrypt_string(&key, "do not tamper").unwrap();
        sealed.tag[0] ^= 0x01;
        assert!(matches!(
            open(&key, &sealed),
            Err(WikictlError::DecryptionFailed { .. })
        ));
    }

    #[test]
    fn tampered_nonce_fails() {
        let key = random_key();
        let mut sealed = encrypt_string(&key, "do not tamper").unwrap();
        sealed.nonce[11] ^= 0x80;
        assert!(open(&key, &sealed).is_err());
    }

    #[test]
    fn fields_roundtrip_through_persisted_format() {
        let key = random_key();
        let sealed = encrypt_string(&key, "secret123").unwrap();

        let encrypted = sealed.encrypted_field();
        let iv = sealed.nonce_field();
        assert_eq!(iv.len(), NONCE_LEN * 2);
        assert!(encrypted.ends_with(&hex::encode(sealed.tag)));

        let parsed = SealedValue::from_fields(&encrypted, &iv).unwrap();
        assert_eq!(parsed, sealed);
        assert_eq!(decrypt_string(&key, &parsed).unwrap(), "secret123");
    }

    #[test]
    fn missing_tag_component_is_malformed() {
        let err = SealedValue::from_fields("deadbeef", &"00".repeat(NONCE_LEN)).unwrap_err();
        assert!(matches!(err, WikictlError::MalformedInput(msg) if msg.contains("tag")));
    }

    #[test]
    fn bad_hex_is_malformed() {
        let tag = "00".repeat(TAG_LEN);
        let err = SealedValue::from_fields(&format!("zz:{tag}"), &"00".repeat(NONCE_LEN)).unwrap_err();
        assert!(matches!(err, WikictlError::MalformedInput(_)));
    }

    #[test]
    fn short_nonce_is_malformed() {
        let tag = "00".repeat(TAG_LEN);
        let err = SealedValue::from_fields(&format!("00:{tag}"), "0011").unwrap_err();
        assert!(matches!(err, WikictlError::MalformedInput(msg) if msg.contains("nonce")));
    }
}
