//! AES-256-GCM codec for paste content at rest.
//!
//! Stored layout: `[version][nonce; 12][ciphertext || tag; 16]`.

use crate::config::EncryptionKey;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;

const FORMAT_VERSION: u8 = 1;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = 1 + NONCE_LEN;

/// Codec failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Authentication failed: the value was tampered with, truncated, or sealed
    /// under another key.
    #[error("ciphertext failed integrity check")]
    Integrity,

    /// The stored value does not have the expected envelope.
    #[error("malformed ciphertext: {0}")]
    Format(String),

    #[error("random source failure: {0}")]
    Entropy(String),
}

/// Symmetric content codec bound to the process-wide key.
#[derive(Clone)]
pub struct PasteCipher {
    cipher: Aes256Gcm,
}

impl PasteCipher {
    /// Build a codec from the configured key.
    pub fn new(key: &EncryptionKey) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.as_bytes().into()),
        }
    }

    /// Seal `plaintext` under a fresh random nonce.
    ///
    /// Two calls with the same input produce different outputs.
    ///
    /// # Errors
    /// Returns [`CodecError::Entropy`] when the OS random source fails.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng
            .try_fill_bytes(&mut nonce_bytes)
            .map_err(|err| CodecError::Entropy(err.to_string()))?;
        let nonce = Nonce::from(nonce_bytes);

        // Only fails for inputs beyond the GCM length limit (~64 GiB).
        let sealed = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| CodecError::Format("plaintext exceeds cipher limits".to_string()))?;

        let mut out = Vec::with_capacity(HEADER_LEN + sealed.len());
        out.push(FORMAT_VERSION);
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    /// Open a value produced by [`PasteCipher::encrypt`].
    ///
    /// # Errors
    /// - [`CodecError::Format`] when the envelope is short or versioned unknown.
    /// - [`CodecError::Integrity`] when authentication fails.
    pub fn decrypt(&self, stored: &[u8]) -> Result<Vec<u8>, CodecError> {
        if stored.len() < HEADER_LEN + TAG_LEN {
            return Err(CodecError::Format(format!(
                "expected at least {} bytes, found {}",
                HEADER_LEN + TAG_LEN,
                stored.len()
            )));
        }
        if stored[0] != FORMAT_VERSION {
            return Err(CodecError::Format(format!(
                "unsupported envelope version {}",
                stored[0]
            )));
        }

        let nonce_bytes: [u8; NONCE_LEN] = stored[1..HEADER_LEN]
            .try_into()
            .map_err(|_| CodecError::Format("invalid nonce length".to_string()))?;
        let nonce = Nonce::from(nonce_bytes);

        self.cipher
            .decrypt(&nonce, &stored[HEADER_LEN..])
            .map_err(|_| CodecError::Integrity)
    }
}
