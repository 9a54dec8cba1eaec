//! Client key bundle: generation, persistence, loading

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::KEY_SIZE;

macro_rules! secret_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name {
            bytes: [u8; KEY_SIZE],
        }

        impl $name {
            pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
                Self { bytes }
            }

            pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
                &self.bytes
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                self.bytes.zeroize();
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("bytes", &"[REDACTED]")
                    .finish()
            }
        }
    };
}

secret_key!(
    /// 256-bit AES-GCM key for document bodies. Zeroized on drop.
    EncryptionKey
);

secret_key!(
    /// 256-bit HMAC key for search tokens. Zeroized on drop.
    TokenKey
);

/// The two long-term client secrets.
#[derive(Debug, Clone)]
pub struct KeyBundle {
    pub key_enc: EncryptionKey,
    pub key_token: TokenKey,
}

/// On-disk form of a key bundle
#[derive(Serialize, Deserialize)]
struct KeyFile {
    key_enc_b64: String,
    key_token_b64: String,
}

impl Drop for KeyFile {
    fn drop(&mut self) {
        self.key_enc_b64.zeroize();
        self.key_token_b64.zeroize();
    }
}

impl KeyBundle {
    /// Generate two independent keys from the OS random source.
    pub fn generate() -> Result<Self, CryptoError> {
        Ok(Self {
            key_enc: EncryptionKey::from_bytes(random_key()?),
            key_token: TokenKey::from_bytes(random_key()?),
        })
    }

    /// Read a bundle previously written by [`KeyBundle::save`].
    pub fn load(path: &Path) -> Result<Self, CryptoError> {
        let mut content = std::fs::read_to_string(path)
            .map_err(|e| CryptoError::key_load(path, format!("read failed: {e}")))?;
        let parsed: Result<KeyFile, _> = serde_json::from_str(&content);
        content.zeroize();
        let file = parsed.map_err(|e| CryptoError::key_load(path, format!("not a key file: {e}")))?;

        let key_enc = decode_key(path, "key_enc_b64", &file.key_enc_b64)?;
        let key_token = decode_key(path, "key_token_b64", &file.key_token_b64)?;
        if key_enc == key_token {
            return Err(CryptoError::key_load(
                path,
                "key_enc and key_token are identical",
            ));
        }

        Ok(Self {
            key_enc: EncryptionKey::from_bytes(key_enc),
            key_token: TokenKey::from_bytes(key_token),
        })
    }

    /// Persist the bundle atomically (temp file + rename), owner-only on Unix.
    pub fn save(&self, path: &Path) -> Result<(), CryptoError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = KeyFile {
            key_enc_b64: B64.encode(self.key_enc.as_bytes()),
            key_token_b64: B64.encode(self.key_token.as_bytes()),
        };
        let mut json = serde_json::to_string_pretty(&file)
            .map_err(|e| CryptoError::Io(std::io::Error::other(e)))?;

        let tmp_path = path.with_extension("tmp");
        let written = write_private(&tmp_path, json.as_bytes());
        json.zeroize();
        written?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

/// Load the bundle at `path`, or generate and persist a fresh one if none
/// exists yet. Repeated calls return the same keys.
pub fn load_or_create(path: &Path) -> Result<KeyBundle, CryptoError> {
    if path.exists() {
        return KeyBundle::load(path);
    }

    let bundle = KeyBundle::generate()?;
    bundle.save(path)?;
    info!(path = %path.display(), "generated new client key bundle");
    Ok(bundle)
}

/// Replace the bundle at `path` with fresh keys.
///
/// Every token and ciphertext produced under the old bundle becomes
/// unusable from this client.
pub fn regenerate(path: &Path) -> Result<KeyBundle, CryptoError> {
    let bundle = KeyBundle::generate()?;
    bundle.save(path)?;
    warn!(path = %path.display(), "client key bundle regenerated; earlier uploads are no longer searchable or decryptable");
    Ok(bundle)
}

pub(crate) fn random_bytes(buf: &mut [u8]) -> Result<(), CryptoError> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CryptoError::Random(e.to_string()))
}

fn random_key() -> Result<[u8; KEY_SIZE], CryptoError> {
    let mut key = [0u8; KEY_SIZE];
    random_bytes(&mut key)?;
    Ok(key)
}

fn decode_key(path: &Path, field: &str, b64: &str) -> Result<[u8; KEY_SIZE], CryptoError> {
    let mut raw = B64
        .decode(b64.trim())
        .map_err(|e| CryptoError::key_load(path, format!("{field}: invalid base64: {e}")))?;
    if raw.len() != KEY_SIZE {
        let len = raw.len();
        raw.zeroize();
        return Err(CryptoError::key_load(
            path,
            format!("{field}: expected {KEY_SIZE} bytes, got {len}"),
        ));
    }
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&raw);
    raw.zeroize();
    Ok(key)
}

#[cfg(unix)]
fn write_private(path: &Path, data: &[u8]) -> Result<(), CryptoError> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on create; a stale temp file keeps its old bits
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(data)?;
    file.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, data: &[u8]) -> Result<(), CryptoError> {
    std::fs::write(path, data)?;
    Ok(())
}
