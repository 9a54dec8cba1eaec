//! sse-client: the trusted side of the scheme
//!
//! Upload: plaintext → AES-GCM blob, keywords → HMAC tokens, send both.
//! Search: keyword → one token, send it, decrypt each returned blob.

pub mod client;
pub mod error;
pub mod extract;
pub mod transport;

pub use client::{SearchHit, SseClient};
pub use error::ClientError;
pub use extract::{KeywordExtractor, SimpleExtractor};
pub use transport::{HttpTransport, Transport};
