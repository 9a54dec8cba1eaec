//! sse-store: server-resident state behind an OpenDAL operator
//!
//! Layout under the operator root:
//! ```text
//! index.json          token → [doc_id, ...]   (rewritten whole on every mutation)
//! docs/<doc_id>.bin   nonce || ciphertext_with_tag
//! ```

pub mod docs;
pub mod health;
pub mod index;
pub mod operator;

pub use docs::DocumentStore;
pub use health::{check_health, StoreState};
pub use index::InvertedIndex;
pub use operator::{build_operator, memory_operator};
