//! AES-256-GCM encryption of third-party API keys stored in the settings table.
//!
//! The key is a deployment-wide 32-byte secret provided hex-encoded through the
//! `ENCRYPTION_KEY` environment variable. Sealed values are stored as base64 of
//! `nonce || ciphertext` so they fit a plain text column.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::Rng;
use std::fmt;
use thiserror::Error;

/// 12-byte nonce size for AES-GCM
const NONCE_SIZE: usize = 12;

const KEY_SIZE: usize = 32;

/// Errors that can occur during encryption/decryption operations
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("Invalid encryption key: must be 32 bytes (64 hex characters)")]
    InvalidKey,

    #[error("Failed to decode hex key: {0}")]
    HexDecodeError(#[from] hex::FromHexError),

    #[error("Failed to decode base64 ciphertext: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed - data may be corrupted or key is incorrect")]
    DecryptionFailed,

    #[error("Ciphertext too short - missing nonce")]
    CiphertextTooShort,

    #[error("No encryption key configured")]
    NoKeyConfigured,
}

/// A ready-to-use AES-256-GCM cipher built from the configured key.
#[derive(Clone)]
pub struct Cipher {
    inner: Aes256Gcm,
}

impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cipher { .. }")
    }
}

impl Cipher {
    /// Builds a cipher from a 64 character hex key.
    pub fn from_hex(key_hex: &str) -> Result<Self, EncryptionError> {
        let bytes = hex::decode(key_hex.trim())?;
        if bytes.len() != KEY_SIZE {
            return Err(EncryptionError::InvalidKey);
        }
        let inner = Aes256Gcm::new_from_slice(&bytes).map_err(|_| EncryptionError::InvalidKey)?;
        Ok(Self { inner })
    }

    /// Builds a cipher from an optional key, failing with `NoKeyConfigured` when absent.
    pub fn from_config(key_hex: Option<&str>) -> Result<Self, EncryptionError> {
        match key_hex {
            Some(key_hex) if !key_hex.trim().is_empty() => Self::from_hex(key_hex),
            _ => Err(EncryptionError::NoKeyConfigured),
        }
    }

    /// Encrypts `plaintext` under a fresh random nonce.
    pub fn seal(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .inner
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| EncryptionError::EncryptionFailed)?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend(ciphertext);

        Ok(BASE64.encode(combined))
    }

    /// Reverses [`Cipher::seal`].
    pub fn open(&self, sealed: &str) -> Result<String, EncryptionError> {
        let combined = BASE64.decode(sealed)?;

        if combined.len() < NONCE_SIZE {
            return Err(EncryptionError::CiphertextTooShort);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext_bytes = self
            .inner
            .decrypt(nonce, ciphertext)
            .map_err(|_| EncryptionError::DecryptionFailed)?;

        String::from_utf8(plaintext_bytes).map_err(|_| EncryptionError::DecryptionFailed)
    }
}
