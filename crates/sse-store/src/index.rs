//! Inverted index: search token → doc_ids, persisted as one JSON object.
//!
//! The whole map lives in memory behind a single async mutex and is
//! rewritten to `index.json` on every mutation while the lock is held. Two
//! concurrent uploads therefore serialize instead of each reading the old
//! index and overwriting the other's additions.
//!
//! Entries are append-only: doc_ids keep insertion order, duplicates are
//! ignored, and nothing is ever removed.

use anyhow::{Context, Result};
use opendal::{ErrorKind, Operator};
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::debug;

use sse_core::{DocId, SearchToken};

/// Object key of the persisted index
pub const INDEX_PATH: &str = "index.json";

type Entries = BTreeMap<SearchToken, Vec<DocId>>;

pub struct InvertedIndex {
    op: Operator,
    entries: Mutex<Entries>,
}

impl InvertedIndex {
    /// Load the index from storage, or start empty if none was saved yet.
    pub async fn open(op: Operator) -> Result<Self> {
        let entries = match op.read(INDEX_PATH).await {
            Ok(buf) => serde_json::from_slice(&buf.to_vec())
                .with_context(|| format!("parsing {INDEX_PATH}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => Entries::new(),
            Err(e) => return Err(anyhow::anyhow!("reading {INDEX_PATH}: {e}")),
        };

        Ok(Self {
            op,
            entries: Mutex::new(entries),
        })
    }

    /// Record `doc_id` under `token`. Returns false if it was already there.
    pub async fn add(&self, token: &SearchToken, doc_id: &DocId) -> Result<bool> {
        let added = self.add_all(std::slice::from_ref(token), doc_id).await?;
        Ok(added == 1)
    }

    /// Record `doc_id` under every token in one locked read-modify-write.
    ///
    /// Returns how many tokens gained a new entry. If persisting fails the
    /// in-memory map is rolled back, so memory never runs ahead of storage.
    pub async fn add_all(&self, tokens: &[SearchToken], doc_id: &DocId) -> Result<usize> {
        let mut entries = self.entries.lock().await;

        let mut changed = Vec::new();
        for token in tokens {
            let ids = entries.entry(token.clone()).or_default();
            if !ids.contains(doc_id) {
                ids.push(doc_id.clone());
                changed.push(token);
            }
        }

        if changed.is_empty() {
            return Ok(0);
        }

        if let Err(e) = persist(&self.op, &entries).await {
            for token in &changed {
                if let Some(ids) = entries.get_mut(*token) {
                    ids.pop();
                    if ids.is_empty() {
                        entries.remove(*token);
                    }
                }
            }
            return Err(e);
        }

        debug!(doc_id = %doc_id, added = changed.len(), tokens = entries.len(), "index updated");
        Ok(changed.len())
    }

    /// doc_ids recorded under exactly this token, in insertion order.
    pub async fn lookup(&self, token: &SearchToken) -> Vec<DocId> {
        self.entries
            .lock()
            .await
            .get(token)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of distinct tokens in the index
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

async fn persist(op: &Operator, entries: &Entries) -> Result<()> {
    let json = serde_json::to_vec_pretty(entries).context("serializing index")?;
    op.write(INDEX_PATH, json)
        .await
        .with_context(|| format!("writing {INDEX_PATH}"))?;
    Ok(())
}
