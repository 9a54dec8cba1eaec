use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SseError, SseResult};

/// Length of a search token in hex characters (HMAC-SHA256 output, 32 bytes)
pub const TOKEN_HEX_LEN: usize = 64;

/// Longest doc_id accepted, in bytes.
///
/// A doc_id becomes the file name `<doc_id>.bin`, and the fs backend stages
/// each write under a longer temporary name; both must fit in the usual
/// 255-byte file name limit.
pub const MAX_DOC_ID_LEN: usize = 200;

/// An opaque, fixed-width search token.
///
/// Always 64 lowercase hex characters. The server only ever compares tokens
/// for exact equality; it has no way to map one back to a keyword.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SearchToken(String);

impl SearchToken {
    /// Build a token from a raw 32-byte MAC output.
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        Self(hex::encode(digest))
    }

    /// Validate a token received over the wire.
    pub fn parse(s: &str) -> SseResult<Self> {
        if s.len() != TOKEN_HEX_LEN {
            return Err(SseError::InvalidRequest(format!(
                "token must be {TOKEN_HEX_LEN} hex characters, got {}",
                s.len()
            )));
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(SseError::InvalidRequest(
                "token contains non-hex characters".into(),
            ));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for log lines; the full token never needs to be logged.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for SearchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SearchToken {
    type Error = SseError;

    fn try_from(value: String) -> SseResult<Self> {
        Self::parse(&value)
    }
}

impl From<SearchToken> for String {
    fn from(token: SearchToken) -> Self {
        token.0
    }
}

/// Caller-chosen document identifier.
///
/// Uniqueness is the caller's responsibility: uploading under an existing
/// doc_id replaces the stored ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocId(String);

impl DocId {
    pub fn parse(s: &str) -> SseResult<Self> {
        if s.is_empty() {
            return Err(SseError::InvalidRequest("doc_id must not be empty".into()));
        }
        if s.len() > MAX_DOC_ID_LEN {
            return Err(SseError::InvalidRequest(format!(
                "doc_id is {} bytes (maximum {MAX_DOC_ID_LEN})",
                s.len()
            )));
        }
        if s == "." || s == ".." {
            return Err(SseError::InvalidRequest(format!("doc_id {s:?} is reserved")));
        }
        if s.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
            return Err(SseError::InvalidRequest(format!(
                "doc_id {s:?} contains a path separator or control character"
            )));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DocId {
    type Error = SseError;

    fn try_from(value: String) -> SseResult<Self> {
        Self::parse(&value)
    }
}

impl From<DocId> for String {
    fn from(id: DocId) -> Self {
        id.0
    }
}
