//! Client side of the scheme: everything involving keys or plaintext
//! happens here, before a request leaves the process.

use tracing::{debug, info, warn};

use sse_core::wire::{SearchRequest, SearchResponse, UploadRequest, UploadResponse};
use sse_core::{DocId, SearchToken};
use sse_crypto::{decrypt, derive_token, encrypt, make_tokens, KeyBundle, SCHEME_TAG};

use crate::error::ClientError;
use crate::transport::Transport;

/// One search result, decoded and decrypted on its own.
///
/// A hit that fails (bad base64, wrong key, tampered blob) carries its error
/// here and does not affect the other hits of the same search.
#[derive(Debug)]
pub struct SearchHit {
    /// Position in the server's hit list
    pub index: usize,
    pub plaintext: Result<Vec<u8>, ClientError>,
}

pub struct SseClient<T> {
    keys: KeyBundle,
    transport: T,
}

impl<T: Transport> SseClient<T> {
    pub fn new(keys: KeyBundle, transport: T) -> Self {
        Self { keys, transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Encrypt `plaintext` and derive one token per distinct keyword.
    ///
    /// Builds the request without sending it. An empty keyword list is
    /// allowed: the document is stored but no search will ever find it.
    pub fn prepare_upload<S: AsRef<str>>(
        &self,
        doc_id: &str,
        plaintext: &[u8],
        keywords: &[S],
    ) -> Result<UploadRequest, ClientError> {
        let doc_id = DocId::parse(doc_id)?;
        let blob = encrypt(&self.keys.key_enc, plaintext, SCHEME_TAG)?;
        let tokens = make_tokens(&self.keys.key_token, keywords);
        Ok(UploadRequest::new(&doc_id, &blob, &tokens))
    }

    pub async fn upload<S: AsRef<str>>(
        &self,
        doc_id: &str,
        plaintext: &[u8],
        keywords: &[S],
    ) -> Result<UploadResponse, ClientError> {
        let req = self.prepare_upload(doc_id, plaintext, keywords)?;
        let resp = self.transport.upload(&req).await?;
        info!(
            doc_id = %resp.stored_doc_id,
            bytes = plaintext.len(),
            tokens = resp.token_count,
            "uploaded"
        );
        Ok(resp)
    }

    /// Token that `keyword` maps to under this client's keys.
    pub fn token_for(&self, keyword: &str) -> SearchToken {
        derive_token(&self.keys.key_token, keyword)
    }

    /// Search for one keyword and decrypt every hit.
    pub async fn search(&self, keyword: &str) -> Result<Vec<SearchHit>, ClientError> {
        let token = self.token_for(keyword);
        debug!(token = %token.short(), "searching");

        let resp = self.transport.search(&SearchRequest::new(&token)).await?;
        if !resp.token.eq_ignore_ascii_case(token.as_str()) {
            return Err(ClientError::UnexpectedResponse(format!(
                "asked for token {}, server answered for {}",
                token.short(),
                resp.token
            )));
        }

        Ok(self.open_hits(&resp))
    }

    /// Decode and decrypt each hit of a search response independently.
    pub fn open_hits(&self, resp: &SearchResponse) -> Vec<SearchHit> {
        resp.decode_hits()
            .into_iter()
            .enumerate()
            .map(|(index, decoded)| {
                let plaintext = decoded.map_err(ClientError::from).and_then(|blob| {
                    decrypt(&self.keys.key_enc, &blob, SCHEME_TAG).map_err(ClientError::from)
                });
                if let Err(e) = &plaintext {
                    warn!(index, "could not open search hit: {e}");
                }
                SearchHit { index, plaintext }
            })
            .collect()
    }

    pub async fn health(&self) -> Result<bool, ClientError> {
        Ok(self.transport.health().await?.ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sse_core::wire::HealthResponse;
    use sse_crypto::CryptoError;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// In-process stand-in for the server: validates requests the way the
    /// server does and keeps blobs and postings in maps.
    #[derive(Default)]
    struct FakeServer {
        docs: Mutex<BTreeMap<DocId, Vec<u8>>>,
        index: Mutex<BTreeMap<SearchToken, Vec<DocId>>>,
        /// Flip a byte of every blob served back
        tamper: Mutex<Option<DocId>>,
        uploads: Mutex<Vec<UploadRequest>>,
    }

    #[async_trait]
    impl Transport for FakeServer {
        async fn upload(&self, req: &UploadRequest) -> Result<UploadResponse, ClientError> {
            self.uploads.lock().unwrap().push(req.clone());
            let valid = req.validate()?;
            self.docs
                .lock()
                .unwrap()
                .insert(valid.doc_id.clone(), valid.blob);
            let mut index = self.index.lock().unwrap();
            for token in &valid.tokens {
                let ids = index.entry(token.clone()).or_default();
                if !ids.contains(&valid.doc_id) {
                    ids.push(valid.doc_id.clone());
                }
            }
            Ok(UploadResponse {
                ok: true,
                stored_doc_id: valid.doc_id.to_string(),
                token_count: valid.tokens.len(),
            })
        }

        async fn search(&self, req: &SearchRequest) -> Result<SearchResponse, ClientError> {
            let token = req.validate()?;
            let ids = self.index.lock().unwrap().get(&token).cloned().unwrap_or_default();
            let docs = self.docs.lock().unwrap();
            let tamper = self.tamper.lock().unwrap().clone();
            let blobs: Vec<Vec<u8>> = ids
                .iter()
                .filter_map(|id| {
                    let mut blob = docs.get(id)?.clone();
                    if tamper.as_ref() == Some(id) {
                        let last = blob.len() - 1;
                        blob[last] ^= 0x01;
                    }
                    Some(blob)
                })
                .collect();
            Ok(SearchResponse::new(&token, &blobs))
        }

        async fn health(&self) -> Result<HealthResponse, ClientError> {
            Ok(HealthResponse { ok: true })
        }
    }

    fn client() -> SseClient<FakeServer> {
        SseClient::new(KeyBundle::generate().unwrap(), FakeServer::default())
    }

    fn texts(hits: Vec<SearchHit>) -> Vec<Vec<u8>> {
        hits.into_iter().map(|h| h.plaintext.unwrap()).collect()
    }

    #[tokio::test]
    async fn test_upload_then_search_roundtrip() {
        let c = client();
        let resp = c.upload("a.txt-5", b"hello", &["alpha", "beta"]).await.unwrap();
        assert_eq!(resp.token_count, 2);

        assert_eq!(texts(c.search("beta").await.unwrap()), vec![b"hello".to_vec()]);
        assert!(c.search("gamma").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_normalizes_keyword() {
        let c = client();
        c.upload("d", b"x", &["alpha"]).await.unwrap();

        for variant in ["alpha", "Alpha", " alpha ", "ALPHA\t"] {
            assert_eq!(c.search(variant).await.unwrap().len(), 1, "{variant:?}");
        }
    }

    #[tokio::test]
    async fn test_upload_request_reveals_no_plaintext() {
        let c = client();
        c.upload("d", b"secret body", &["confidential"]).await.unwrap();

        let sent = serde_json::to_string(&c.transport().uploads.lock().unwrap()[0]).unwrap();
        assert!(!sent.contains("confidential"));
        assert!(!sent.contains("secret body"));
    }

    #[tokio::test]
    async fn test_duplicate_keywords_send_one_token() {
        let c = client();
        let req = c.prepare_upload("d", b"x", &["beta", "Beta", " beta"]).unwrap();
        assert_eq!(req.tokens.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_doc_id_rejected_before_sending() {
        let c = client();
        let err = c.upload("../../etc/passwd", b"x", &["a"]).await.unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
        assert!(c.transport().uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tampered_hit_fails_alone() {
        let c = client();
        c.upload("good", b"good doc", &["shared"]).await.unwrap();
        c.upload("bad", b"bad doc", &["shared"]).await.unwrap();
        *c.transport().tamper.lock().unwrap() = Some(DocId::parse("bad").unwrap());

        let hits = c.search("shared").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].plaintext.as_ref().unwrap(), b"good doc");
        assert!(matches!(
            hits[1].plaintext,
            Err(ClientError::Crypto(CryptoError::Authentication))
        ));
    }

    #[tokio::test]
    async fn test_other_keys_find_nothing() {
        let alice = client();
        alice.upload("d", b"x", &["alpha"]).await.unwrap();

        // Same server, different key bundle
        let FakeServer { docs, index, .. } = alice.transport;
        let server = FakeServer {
            docs,
            index,
            ..Default::default()
        };
        let bob = SseClient::new(KeyBundle::generate().unwrap(), server);
        assert!(bob.search("alpha").await.unwrap().is_empty());
    }

    #[test]
    fn test_open_hits_reports_bad_base64_per_hit() {
        let c = client();
        let blob = encrypt(&c.keys.key_enc, b"ok", SCHEME_TAG).unwrap();
        let mut resp = SearchResponse::new(&c.token_for("k"), &[blob]);
        resp.hits.insert(0, "***".into());

        let hits = c.open_hits(&resp);
        assert!(matches!(hits[0].plaintext, Err(ClientError::Protocol(_))));
        assert_eq!(hits[1].plaintext.as_ref().unwrap(), b"ok");
        assert_eq!(hits[1].index, 1);
    }

    #[tokio::test]
    async fn test_health() {
        assert!(client().health().await.unwrap());
    }
}
