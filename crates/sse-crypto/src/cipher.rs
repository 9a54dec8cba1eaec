//! Whole-document AES-256-GCM encryption/decryption
//!
//! Blob format (binary):
//! ```text
//! [12 bytes: random nonce][N bytes: ciphertext][16 bytes: GCM tag]
//! ```
//!
//! Nonces are drawn fresh from the OS RNG for every call. With 96-bit
//! nonces a collision under one key becomes plausible only after ~2^32
//! documents, well beyond what one client uploads.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};

use crate::error::CryptoError;
use crate::keys::{random_bytes, EncryptionKey};
use crate::NONCE_SIZE;

/// Encrypt a document.
///
/// - `key`: the client's document encryption key
/// - `plaintext`: document bytes, any length including zero
/// - `associated_data`: bound into the tag, normally [`crate::SCHEME_TAG`]
///
/// Returns: `[12-byte nonce][ciphertext][16-byte tag]`
pub fn encrypt(
    key: &EncryptionKey,
    plaintext: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    random_bytes(&mut nonce_bytes)?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad: associated_data,
            },
        )
        .map_err(|e| CryptoError::Encrypt(e.to_string()))?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypt a blob produced by [`encrypt`].
///
/// Fails with [`CryptoError::Format`] if the blob cannot hold a nonce and
/// with [`CryptoError::Authentication`] on any tag mismatch. No plaintext
/// is returned on failure.
pub fn decrypt(
    key: &EncryptionKey,
    blob: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if blob.len() < NONCE_SIZE {
        return Err(CryptoError::Format {
            len: blob.len(),
            min: NONCE_SIZE,
        });
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad: associated_data,
            },
        )
        .map_err(|_| CryptoError::Authentication)
}
