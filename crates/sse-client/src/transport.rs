//! How client requests reach the server.
//!
//! [`SseClient`](crate::SseClient) only speaks the wire messages; the
//! transport moves them. [`HttpTransport`] is the JSON-over-HTTP one `ssed`
//! serves. Tests plug in their own.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use sse_core::wire::{
    ErrorResponse, HealthResponse, SearchRequest, SearchResponse, UploadRequest, UploadResponse,
};

use crate::error::ClientError;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn upload(&self, req: &UploadRequest) -> Result<UploadResponse, ClientError>;

    async fn search(&self, req: &SearchRequest) -> Result<SearchResponse, ClientError>;

    async fn health(&self) -> Result<HealthResponse, ClientError>;
}

/// JSON over HTTP against an `ssed` base URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn upload(&self, req: &UploadRequest) -> Result<UploadResponse, ClientError> {
        debug!(doc_id = %req.doc_id, tokens = req.tokens.len(), "POST /upload");
        let resp = self.client.post(self.url("/upload")).json(req).send().await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn search(&self, req: &SearchRequest) -> Result<SearchResponse, ClientError> {
        debug!("GET /search");
        let resp = self
            .client
            .get(self.url("/search"))
            .query(&[("token", req.token.as_str())])
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn health(&self) -> Result<HealthResponse, ClientError> {
        let resp = self.client.get(self.url("/health")).send().await?;
        Ok(check(resp).await?.json().await?)
    }
}

/// Pass 2xx responses through; turn anything else into [`ClientError::Server`].
async fn check(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) => err.error,
        // Not our error body, e.g. a proxy page; keep it short
        Err(_) => match serde_json::from_str::<Value>(&body) {
            Ok(v) => v.to_string(),
            Err(_) => body.chars().take(200).collect(),
        },
    };
    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}
