//! HTTP surface
//!
//! Endpoints:
//!   GET  /health          liveness probe, `{"ok": true}`
//!   POST /upload          UploadRequest → UploadResponse
//!   GET  /search?token=.. SearchResponse
//!   GET  /metrics         Prometheus text format

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus_client::registry::Registry;
use std::sync::Arc;

use sse_core::wire::{
    ErrorResponse, HealthResponse, SearchRequest, SearchResponse, UploadRequest, UploadResponse,
};
use sse_core::SseError;

use crate::metrics::{metrics_handler, ServerMetrics};
use crate::service::IndexService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<IndexService>,
    pub metrics: ServerMetrics,
    pub registry: Arc<Registry>,
}

impl AppState {
    pub fn new(service: IndexService) -> Self {
        let mut registry = Registry::default();
        let metrics = ServerMetrics::new(&mut registry);
        Self {
            service: Arc::new(service),
            metrics,
            registry: Arc::new(registry),
        }
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/upload", post(upload_handler))
        .route("/search", get(search_handler))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Error reply: 400 for malformed requests, 500 otherwise, unless the
/// extractor already picked a more specific client status (413).
pub struct ApiError {
    status: StatusCode,
    error: SseError,
}

impl From<SseError> for ApiError {
    fn from(error: SseError) -> Self {
        let status = if error.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self { status, error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("request failed: {}", self.error);
        }
        let body = ErrorResponse {
            error: self.error.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

async fn upload_handler(
    State(state): State<AppState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        let mut err = reject(&state, SseError::InvalidRequest(e.body_text()));
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            err.status = StatusCode::PAYLOAD_TOO_LARGE;
        }
        err
    })?;

    match state.service.upload(&req).await {
        Ok(resp) => {
            state.metrics.uploads.inc();
            Ok(Json(resp))
        }
        Err(e) => Err(reject(&state, e)),
    }
}

async fn search_handler(
    State(state): State<AppState>,
    query: Result<Query<SearchRequest>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(req) = query.map_err(|e| reject(&state, SseError::InvalidRequest(e.body_text())))?;

    let hits = state.service.search(&req).await.map_err(|e| reject(&state, e))?;

    state.metrics.searches.inc();
    state.metrics.search_hits.inc_by(hits.blobs.len() as u64);
    state
        .metrics
        .missing_documents
        .inc_by(hits.missing.len() as u64);

    Ok(Json(SearchResponse::new(&hits.token, &hits.blobs)))
}

fn reject(state: &AppState, e: SseError) -> ApiError {
    if e.is_client_error() {
        state.metrics.rejected_requests.inc();
        tracing::debug!("rejected request: {e}");
    }
    ApiError::from(e)
}
