use thiserror::Error;

pub type SseResult<T> = Result<T, SseError>;

#[derive(Debug, Error)]
pub enum SseError {
    /// A transport-encoded field (base64 ciphertext) did not decode
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A request field failed validation (doc_id, token shape)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SseError {
    /// True for errors caused by the caller's request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SseError::Encoding(_) | SseError::InvalidRequest(_))
    }
}
