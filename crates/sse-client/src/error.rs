use thiserror::Error;

use sse_core::SseError;
use sse_crypto::CryptoError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Protocol(#[from] SseError),

    /// The server answered with a non-2xx status
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}
