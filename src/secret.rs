//! Obfuscation of the opaque metadata blob the platform round-trips through
//! views (`private_metadata`).
//!
//! The blob is visible to anyone who can inspect the view, so it's sealed with
//! AES-256-GCM before leaving the process and opened again when a submission
//! carries it back. The key normally lives only as long as the process, which
//! means metadata from a view opened before a restart can't be decoded after
//! it. Use [MetadataCodec::from_key] to share a key across restarts or
//! replicas.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as b64, Engine};
use std::fmt;

const NONCE_LEN: usize = 12;

#[derive(Debug)]
pub enum SecretError {
    Encrypt,
    Decrypt,
    Base64(base64::DecodeError),
    TooShort(usize),
}

impl From<base64::DecodeError> for SecretError {
    fn from(e: base64::DecodeError) -> Self {
        SecretError::Base64(e)
    }
}

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretError::Encrypt => write!(f, "Failed to seal metadata"),
            SecretError::Decrypt => write!(f, "Failed to open metadata"),
            SecretError::Base64(e) => write!(f, "Metadata is not valid base64: {}", e),
            SecretError::TooShort(n) => write!(f, "Metadata is too short: {} bytes", n),
        }
    }
}

impl std::error::Error for SecretError {}

#[derive(Clone)]
pub struct MetadataCodec {
    cipher: Aes256Gcm,
}

impl MetadataCodec {
    /// A codec with a fresh random key.
    pub fn random() -> Self {
        MetadataCodec {
            cipher: Aes256Gcm::new(&Aes256Gcm::generate_key(&mut OsRng)),
        }
    }

    pub fn from_key(key: [u8; 32]) -> Self {
        MetadataCodec {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key)),
        }
    }

    /// Seal `plain` and encode it as base64 of `nonce || ciphertext`.
    pub fn encode(&self, plain: &[u8]) -> Result<String, SecretError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(&nonce, plain)
            .map_err(|_| SecretError::Encrypt)?;

        let mut combined = nonce.to_vec();
        combined.extend_from_slice(&sealed);

        Ok(b64.encode(combined))
    }

    /// Reverse [MetadataCodec::encode]. An empty string is empty metadata,
    /// since views without metadata send it back blank.
    pub fn decode(&self, encoded: &str) -> Result<Vec<u8>, SecretError> {
        if encoded.is_empty() {
            return Ok(Vec::new());
        }

        let combined = b64.decode(encoded)?;
        if combined.len() < NONCE_LEN {
            return Err(SecretError::TooShort(combined.len()));
        }

        let (nonce, sealed) = combined.split_at(NONCE_LEN);

        self.cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| SecretError::Decrypt)
    }
}

impl Default for MetadataCodec {
    fn default() -> Self {
        Self::random()
    }
}

impl fmt::Debug for MetadataCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MetadataCodec(..)")
    }
}
