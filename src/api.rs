// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! HTTP API: thin boundary over the chunked store.
//!
//! Endpoints:
//!   POST /upload                      multipart, part `file`  → "<path> saved"
//!   GET  /download?file=name          → raw reconstructed bytes
//!   POST /download  (form: file=name) → raw reconstructed bytes
//!   POST /download?file=name          → raw reconstructed bytes

use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, Form, Multipart, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{Result, RetrieveError, StoreError};
use crate::storage::layout::UploadRoot;
use crate::storage::retriever::ChunkedRetriever;
use crate::storage::store::ChunkedStore;

/// Name of the multipart part and of the download parameter.
const FILE_FIELD: &str = "file";

/// Shared state passed to all handlers.
pub struct AppState {
    pub store: ChunkedStore,
    pub retriever: ChunkedRetriever,
    pub config: Config,
}

impl AppState {
    /// Open (creating if needed) the upload root and wire both halves to it.
    pub fn new(config: Config) -> Result<Self> {
        let root = UploadRoot::open(&config.storage.root)?;
        Ok(Self {
            store: ChunkedStore::new(root.clone(), &config.storage),
            retriever: ChunkedRetriever::new(root, &config.storage),
            config,
        })
    }
}

// ──────────────── request / error types ───────────────────────────────────

#[derive(Deserialize)]
pub struct DownloadParams {
    file: String,
}

/// Plain-text error response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into() }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let status = match &e {
            StoreError::InvalidName { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, message: format!("couldn't save file: {e}") }
    }
}

impl From<RetrieveError> for ApiError {
    fn from(e: RetrieveError) -> Self {
        let status = match &e {
            RetrieveError::InvalidName { .. } => StatusCode::BAD_REQUEST,
            RetrieveError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, message: format!("couldn't collect files: {e}") }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self { status: e.status(), message: format!("couldn't read form file: {}", e.body_text()) }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "Request failed");
        } else {
            warn!(status = %self.status, error = %self.message, "Request rejected");
        }
        (
            self.status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.message,
        )
            .into_response()
    }
}

// ──────────────── router ──────────────────────────────────────────────────

/// Build the axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.api.max_upload_bytes;
    Router::new()
        .route("/upload", post(handle_upload))
        .route("/download", get(handle_download).post(handle_download))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server. Returns only on bind or serve failure.
pub async fn start_server(state: Arc<AppState>, port: u16) -> std::io::Result<()> {
    let app = build_router(state);
    let addr = format!("0.0.0.0:{}", port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(port, "HTTP API listening on http://{}", addr);
    axum::serve(listener, app).await
}

// ──────────────── handlers ────────────────────────────────────────────────

async fn handle_upload(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<String, ApiError> {
    let mut multipart = multipart
        .map_err(|e| ApiError::bad_request(format!("expected multipart form: {}", e.body_text())))?;

    // First part named `file` wins; everything else in the form is ignored.
    let (name, data) = loop {
        let Some(field) = multipart.next_field().await? else {
            return Err(ApiError::bad_request(format!(
                "couldn't read form file: no '{FILE_FIELD}' part"
            )));
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| ApiError::bad_request("couldn't read form file: part has no filename"))?;
        let data = field.bytes().await?;
        break (name, data);
    };

    let size = data.len();
    let worker = state.clone();
    let stored = tokio::task::spawn_blocking(move || worker.store.store(&name, &data[..]))
        .await
        .map_err(|e| ApiError::internal(format!("couldn't save file: store task failed: {e}")))??;

    info!(item = ?stored.path, chunks = stored.chunks, bytes = size, "Upload stored via API");
    Ok(format!("{} saved", stored.path.display()))
}

async fn handle_download(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<DownloadParams>, QueryRejection>,
    form: std::result::Result<Form<DownloadParams>, FormRejection>,
) -> std::result::Result<Response, ApiError> {
    // Form body first, then the query string, like a merged form value.
    let params = match (form, query) {
        (Ok(Form(params)), _) | (Err(_), Ok(Query(params))) => params,
        (Err(e), Err(_)) => {
            return Err(ApiError::bad_request(format!(
                "expected '{FILE_FIELD}' parameter: {}",
                e.body_text()
            )));
        }
    };

    let name = params.file;
    let worker = state.clone();
    let body = tokio::task::spawn_blocking(move || worker.retriever.retrieve(&name))
        .await
        .map_err(|e| ApiError::internal(format!("couldn't collect files: retrieve task failed: {e}")))??;

    Ok((StatusCode::OK, body).into_response())
}
