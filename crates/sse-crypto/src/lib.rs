//! sse-crypto: client-side cryptography for searchable symmetric encryption
//!
//! Everything here runs on the client. The server never sees a key, a
//! keyword, or a plaintext.
//!
//! Key material:
//! ```text
//! KeyBundle (persisted once, base64 JSON, mode 0600)
//!   ├── key_enc   (256-bit random) → AES-256-GCM document encryption
//!   └── key_token (256-bit random) → HMAC-SHA256 search tokens
//! ```
//!
//! The two keys are generated independently and typed separately, so one
//! cannot be handed to the other's primitive by mistake.
//!
//! Document blob format:
//! ```text
//! [12 bytes: random nonce][N bytes: ciphertext][16 bytes: GCM tag]
//! AAD = SCHEME_TAG
//! ```

pub mod cipher;
pub mod error;
pub mod keys;
pub mod token;

pub use cipher::{decrypt, encrypt};
pub use error::CryptoError;
pub use keys::{load_or_create, regenerate, EncryptionKey, KeyBundle, TokenKey};
pub use token::{derive_token, make_tokens, normalize};

/// Size of each secret key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an AES-GCM nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Associated data bound into every document ciphertext.
///
/// Part of the wire contract: changing it makes every existing ciphertext
/// fail authentication.
pub const SCHEME_TAG: &[u8] = b"sse-demo-v1";
