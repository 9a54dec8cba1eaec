pub mod config;
pub mod error;
pub mod types;
pub mod wire;

pub use error::{SseError, SseResult};
pub use types::{DocId, SearchToken};
