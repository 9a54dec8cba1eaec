//! Keyword normalization and HMAC-SHA256 search tokens
//!
//! Tokens are deterministic: the same key and keyword always give the same
//! token, which is what lets the server match an upload to a later search
//! without learning the keyword. Normalization runs on both paths, so
//! "Alpha", "alpha" and " alpha " all land on one token.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeSet;

use sse_core::SearchToken;

use crate::keys::TokenKey;

type HmacSha256 = Hmac<Sha256>;

/// Lowercase, collapse every whitespace run to one space, trim.
///
/// Whitespace is Unicode White_Space plus the information separators
/// U+001C..=U+001F, so tokens agree with existing clients sharing a key file.
/// Total and idempotent; the empty string normalizes to itself.
pub fn normalize(keyword: &str) -> String {
    keyword
        .to_lowercase()
        .split(is_space)
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Derive the search token for one keyword.
///
/// `token = hex(HMAC-SHA256(key_token, utf8(normalize(keyword))))`
pub fn derive_token(key: &TokenKey, keyword: &str) -> SearchToken {
    let normalized = normalize(keyword);
    let Ok(mut mac) = HmacSha256::new_from_slice(key.as_bytes()) else {
        unreachable!("HMAC-SHA256 accepts any key size");
    };
    mac.update(normalized.as_bytes());
    let digest: [u8; 32] = mac.finalize().into_bytes().into();
    SearchToken::from_digest(&digest)
}

/// Tokens for a keyword list: blanks dropped, duplicates merged, sorted.
pub fn make_tokens<I, S>(key: &TokenKey, keywords: I) -> BTreeSet<SearchToken>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|w| normalize(w.as_ref()))
        .filter(|w| !w.is_empty())
        .map(|w| derive_token(key, &w))
        .collect()
}
