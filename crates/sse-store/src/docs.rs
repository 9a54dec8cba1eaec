//! doc_id → ciphertext blob

use anyhow::{Context, Result};
use opendal::{ErrorKind, Operator};
use sse_core::DocId;

/// Ciphertext blobs, one object per document.
///
/// Writes to distinct doc_ids never interact. Two writes to the same doc_id
/// race and the last one wins.
#[derive(Clone)]
pub struct DocumentStore {
    op: Operator,
}

impl DocumentStore {
    pub fn new(op: Operator) -> Self {
        Self { op }
    }

    /// Store `blob`, replacing anything previously stored under `doc_id`.
    pub async fn put(&self, doc_id: &DocId, blob: &[u8]) -> Result<()> {
        let key = doc_path(doc_id);
        self.op
            .write(&key, blob.to_vec())
            .await
            .with_context(|| format!("writing document: {key}"))?;
        Ok(())
    }

    /// Fetch the blob for `doc_id`; `None` if nothing was ever stored.
    pub async fn get(&self, doc_id: &DocId) -> Result<Option<Vec<u8>>> {
        let key = doc_path(doc_id);
        match self.op.read(&key).await {
            Ok(buf) => Ok(Some(buf.to_vec())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::anyhow!("reading document {key}: {e}")),
        }
    }
}

fn doc_path(doc_id: &DocId) -> String {
    format!("docs/{doc_id}.bin")
}
