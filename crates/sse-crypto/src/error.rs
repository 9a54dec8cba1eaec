use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// Persisted key material is unreadable or corrupt. Not recoverable
    /// without user intervention.
    #[error("cannot load key bundle from {path}: {reason}")]
    KeyLoad { path: PathBuf, reason: String },

    /// The OS random source failed; no weaker fallback is attempted.
    #[error("secure random source unavailable: {0}")]
    Random(String),

    /// Blob is too short to contain a nonce.
    #[error("ciphertext too short: {len} bytes (minimum {min})")]
    Format { len: usize, min: usize },

    /// Tag did not verify: tampered blob, wrong key, or wrong associated data.
    #[error("document authentication failed")]
    Authentication,

    #[error("encryption failed: {0}")]
    Encrypt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CryptoError {
    pub(crate) fn key_load(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::KeyLoad {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
