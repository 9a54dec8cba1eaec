//! Server half of the indexing protocol.
//!
//! The server handles only opaque tokens and ciphertext. It never sees,
//! computes, or checks a keyword.

use tracing::{info, warn};

use sse_core::wire::{SearchRequest, UploadRequest, UploadResponse};
use sse_core::{DocId, SearchToken, SseError, SseResult};
use sse_store::{DocumentStore, InvertedIndex};

/// Blobs found for one token
#[derive(Debug)]
pub struct SearchHits {
    pub token: SearchToken,
    pub blobs: Vec<Vec<u8>>,
    /// Indexed doc_ids with no stored blob; skipped, not an error
    pub missing: Vec<DocId>,
}

pub struct IndexService {
    docs: DocumentStore,
    index: InvertedIndex,
}

impl IndexService {
    pub fn new(docs: DocumentStore, index: InvertedIndex) -> Self {
        Self { docs, index }
    }

    /// Open both stores on one operator.
    pub async fn open(op: opendal::Operator) -> anyhow::Result<Self> {
        let index = InvertedIndex::open(op.clone()).await?;
        Ok(Self::new(DocumentStore::new(op), index))
    }

    /// Store the blob, then index it under every token in the request.
    ///
    /// The doc_id is trusted to be unique: an existing doc_id has its blob
    /// replaced and keeps any tokens it was indexed under before.
    pub async fn upload(&self, req: &UploadRequest) -> SseResult<UploadResponse> {
        let upload = req.validate()?;

        self.docs
            .put(&upload.doc_id, &upload.blob)
            .await
            .map_err(storage_error)?;
        let added = self
            .index
            .add_all(&upload.tokens, &upload.doc_id)
            .await
            .map_err(storage_error)?;

        info!(
            doc_id = %upload.doc_id,
            bytes = upload.blob.len(),
            tokens = upload.tokens.len(),
            new_entries = added,
            "document stored"
        );

        Ok(UploadResponse {
            ok: true,
            stored_doc_id: upload.doc_id.to_string(),
            token_count: upload.tokens.len(),
        })
    }

    /// Distinct tokens currently indexed
    pub async fn indexed_tokens(&self) -> usize {
        self.index.len().await
    }

    /// Look up a token and fetch every blob it points at.
    pub async fn search(&self, req: &SearchRequest) -> SseResult<SearchHits> {
        let token = req.validate()?;
        let doc_ids = self.index.lookup(&token).await;

        let mut hits = SearchHits {
            token,
            blobs: Vec::with_capacity(doc_ids.len()),
            missing: Vec::new(),
        };
        for doc_id in doc_ids {
            match self.docs.get(&doc_id).await.map_err(storage_error)? {
                Some(blob) => hits.blobs.push(blob),
                None => {
                    warn!(doc_id = %doc_id, token = %hits.token.short(), "indexed document has no stored blob, skipping");
                    hits.missing.push(doc_id);
                }
            }
        }

        info!(token = %hits.token.short(), hits = hits.blobs.len(), "search");
        Ok(hits)
    }
}

fn storage_error(e: anyhow::Error) -> SseError {
    SseError::Storage(format!("{e:#}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sse_store::memory_operator;

    fn token(byte: u8) -> SearchToken {
        SearchToken::from_digest(&[byte; 32])
    }

    async fn service() -> IndexService {
        IndexService::open(memory_operator().unwrap()).await.unwrap()
    }

    fn upload_req(doc_id: &str, blob: &[u8], tokens: &[SearchToken]) -> UploadRequest {
        UploadRequest::new(&DocId::parse(doc_id).unwrap(), blob, tokens)
    }

    #[tokio::test]
    async fn test_upload_then_search() {
        let svc = service().await;
        let resp = svc
            .upload(&upload_req("a.txt-5", b"blob!", &[token(1), token(2)]))
            .await
            .unwrap();

        assert!(resp.ok);
        assert_eq!(resp.stored_doc_id, "a.txt-5");
        assert_eq!(resp.token_count, 2);

        let hits = svc.search(&SearchRequest::new(&token(2))).await.unwrap();
        assert_eq!(hits.blobs, vec![b"blob!".to_vec()]);
        assert!(hits.missing.is_empty());
        assert_eq!(hits.token, token(2));
    }

    #[tokio::test]
    async fn test_token_count_ignores_duplicates() {
        let svc = service().await;
        let mut req = upload_req("d", b"x", &[token(1)]);
        req.tokens.push(token(1).to_string());

        assert_eq!(svc.upload(&req).await.unwrap().token_count, 1);
    }

    #[tokio::test]
    async fn test_upload_without_tokens_is_stored_but_unsearchable() {
        let svc = service().await;
        let resp = svc.upload(&upload_req("quiet", b"x", &[])).await.unwrap();
        assert_eq!(resp.token_count, 0);
    }

    #[tokio::test]
    async fn test_search_unknown_token_is_empty() {
        let svc = service().await;
        let hits = svc.search(&SearchRequest::new(&token(9))).await.unwrap();
        assert!(hits.blobs.is_empty());
    }

    #[tokio::test]
    async fn test_missing_blob_is_skipped() {
        let op = memory_operator().unwrap();
        let svc = IndexService::open(op.clone()).await.unwrap();
        svc.upload(&upload_req("keep", b"k", &[token(1)])).await.unwrap();
        svc.upload(&upload_req("gone", b"g", &[token(1)])).await.unwrap();
        op.delete("docs/gone.bin").await.unwrap();

        let hits = svc.search(&SearchRequest::new(&token(1))).await.unwrap();
        assert_eq!(hits.blobs, vec![b"k".to_vec()]);
        assert_eq!(hits.missing, vec![DocId::parse("gone").unwrap()]);
    }

    #[tokio::test]
    async fn test_reupload_overwrites_without_duplicating() {
        let svc = service().await;
        svc.upload(&upload_req("x", b"old", &[token(1), token(2)])).await.unwrap();
        svc.upload(&upload_req("x", b"new", &[token(2), token(3)])).await.unwrap();

        let hits = svc.search(&SearchRequest::new(&token(2))).await.unwrap();
        assert_eq!(hits.blobs, vec![b"new".to_vec()]);

        // Tokens from the first upload still resolve, to the new content
        let hits = svc.search(&SearchRequest::new(&token(1))).await.unwrap();
        assert_eq!(hits.blobs, vec![b"new".to_vec()]);
    }

    #[tokio::test]
    async fn test_invalid_requests_are_client_errors() {
        let svc = service().await;

        let bad_doc = UploadRequest {
            doc_id: "../escape".into(),
            ciphertext: String::new(),
            tokens: vec![],
        };
        assert!(svc.upload(&bad_doc).await.unwrap_err().is_client_error());

        let bad_b64 = UploadRequest {
            doc_id: "ok".into(),
            ciphertext: "***".into(),
            tokens: vec![],
        };
        assert!(matches!(
            svc.upload(&bad_b64).await,
            Err(SseError::Encoding(_))
        ));

        let bad_token = SearchRequest {
            token: "alpha".into(),
        };
        assert!(svc.search(&bad_token).await.unwrap_err().is_client_error());
    }
}
