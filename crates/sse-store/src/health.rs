//! Startup probe of the server's storage

use anyhow::{anyhow, Result};
use opendal::{ErrorKind, Operator};

use crate::index::INDEX_PATH;

/// What the store held when the server started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// No index saved yet; the server starts with nothing searchable
    Fresh,
    /// An index from an earlier run will be loaded
    Existing,
}

/// Confirm the backend answers and report whether an index is already saved.
pub async fn check_health(op: &Operator) -> Result<StoreState> {
    match op.stat(INDEX_PATH).await {
        Ok(_) => Ok(StoreState::Existing),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoreState::Fresh),
        Err(e) => Err(anyhow!("storage unreachable: {e}")),
    }
}
