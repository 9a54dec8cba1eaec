//! sse-server: the untrusted side of the scheme
//!
//! Stores ciphertext blobs by doc_id and maps opaque search tokens to
//! doc_ids. Nothing here can decrypt a document or recover a keyword.

pub mod metrics;
pub mod routes;
pub mod server;
pub mod service;

pub use routes::{router, AppState};
pub use service::{IndexService, SearchHits};
