//! JSON wire messages exchanged between client and server.
//!
//! Binary fields travel as standard base64. Fields stay as plain strings on
//! the wire types so the server can report malformed input with its own
//! error body; `validate()` turns a request into typed values.

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{SseError, SseResult};
use crate::types::{DocId, SearchToken};

/// Client → server: store one encrypted document and index it under `tokens`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    pub doc_id: String,
    /// `nonce || ciphertext_with_tag`, base64
    #[serde(alias = "ciphertext_b64")]
    pub ciphertext: String,
    #[serde(default)]
    pub tokens: Vec<String>,
}

/// An upload request whose fields have all been decoded and checked.
#[derive(Debug, Clone)]
pub struct ValidUpload {
    pub doc_id: DocId,
    pub blob: Vec<u8>,
    /// Deduplicated, sorted
    pub tokens: Vec<SearchToken>,
}

impl UploadRequest {
    pub fn new<'a>(
        doc_id: &DocId,
        blob: &[u8],
        tokens: impl IntoIterator<Item = &'a SearchToken>,
    ) -> Self {
        Self {
            doc_id: doc_id.to_string(),
            ciphertext: B64.encode(blob),
            tokens: tokens.into_iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn validate(&self) -> SseResult<ValidUpload> {
        let doc_id = DocId::parse(&self.doc_id)?;
        let blob = decode_blob(&self.ciphertext)
            .map_err(|e| SseError::Encoding(format!("ciphertext: {e}")))?;
        let tokens = self
            .tokens
            .iter()
            .map(|t| SearchToken::parse(t))
            .collect::<SseResult<BTreeSet<_>>>()?;
        Ok(ValidUpload {
            doc_id,
            blob,
            tokens: tokens.into_iter().collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub stored_doc_id: String,
    pub token_count: usize,
}

/// Client → server: look up one token. Sent as `GET /search?token=...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub token: String,
}

impl SearchRequest {
    pub fn new(token: &SearchToken) -> Self {
        Self {
            token: token.to_string(),
        }
    }

    pub fn validate(&self) -> SseResult<SearchToken> {
        SearchToken::parse(&self.token)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub token: String,
    /// One full `nonce || ciphertext_with_tag` blob per hit, base64
    pub hits: Vec<String>,
}

impl SearchResponse {
    pub fn new(token: &SearchToken, blobs: &[Vec<u8>]) -> Self {
        Self {
            token: token.to_string(),
            hits: blobs.iter().map(|b| B64.encode(b)).collect(),
        }
    }

    /// Decode every hit independently so one bad entry doesn't hide the rest.
    pub fn decode_hits(&self) -> Vec<SseResult<Vec<u8>>> {
        self.hits
            .iter()
            .enumerate()
            .map(|(i, hit)| {
                decode_blob(hit).map_err(|e| SseError::Encoding(format!("hit {i}: {e}")))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Body of every non-2xx server reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn decode_blob(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    B64.decode(s.as_bytes())
}
