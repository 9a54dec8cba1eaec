//! Prometheus counters and the /metrics handler

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use prometheus_client::{
    encoding::text::encode,
    metrics::{counter::Counter, gauge::Gauge},
    registry::Registry,
};

use crate::routes::AppState;

#[derive(Clone, Default)]
pub struct ServerMetrics {
    pub uploads: Counter,
    pub searches: Counter,
    pub search_hits: Counter,
    pub missing_documents: Counter,
    pub rejected_requests: Counter,
    /// Refreshed on every scrape
    pub indexed_tokens: Gauge,
}

impl ServerMetrics {
    pub fn new(registry: &mut Registry) -> Self {
        let metrics = Self::default();

        registry.register(
            "sse_uploads",
            "Documents stored successfully",
            metrics.uploads.clone(),
        );
        registry.register(
            "sse_searches",
            "Token lookups answered",
            metrics.searches.clone(),
        );
        registry.register(
            "sse_search_hits",
            "Ciphertext blobs returned across all searches",
            metrics.search_hits.clone(),
        );
        registry.register(
            "sse_missing_documents",
            "Indexed doc_ids found without a stored blob",
            metrics.missing_documents.clone(),
        );
        registry.register(
            "sse_rejected_requests",
            "Requests refused as malformed",
            metrics.rejected_requests.clone(),
        );
        registry.register(
            "sse_indexed_tokens",
            "Distinct search tokens in the inverted index",
            metrics.indexed_tokens.clone(),
        );

        metrics
    }
}

const OPENMETRICS_TEXT: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    let tokens = state.service.indexed_tokens().await;
    state.metrics.indexed_tokens.set(tokens as i64);

    let mut body = String::new();
    if let Err(e) = encode(&mut body, &state.registry) {
        tracing::error!("metrics encode failed: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    ([(header::CONTENT_TYPE, OPENMETRICS_TEXT)], body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_exported() {
        let mut registry = Registry::default();
        let metrics = ServerMetrics::new(&mut registry);
        metrics.uploads.inc();
        metrics.search_hits.inc_by(3);

        let mut body = String::new();
        encode(&mut body, &registry).unwrap();

        assert!(body.contains("sse_uploads_total 1"));
        assert!(body.contains("sse_search_hits_total 3"));
        assert!(body.contains("sse_missing_documents_total 0"));
        assert!(body.contains("sse_indexed_tokens 0"));
    }
}
