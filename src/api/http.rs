//! HTTP API Server
//!
//! REST API for listing, uploading and downloading files under a PIN.

use std::sync::Arc;
use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio_util::io::ReaderStream;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::cors::{handle_cors, Cors};
use super::docs::handle_docs;
use crate::config::PinDropConfig;
use crate::error::{Error, Result};
use crate::storage::{FileInfo, FileStore};

/// Multipart field carrying the uploaded file
const FILE_FIELD: &str = "file";

/// Shared application state
pub struct AppState {
    /// PIN-partitioned file store
    pub store: FileStore,
}

/// HTTP API server
pub struct HttpServer {
    bind_address: String,
    max_upload_bytes: usize,
    cors: Cors,
    state: Arc<AppState>,
}

impl HttpServer {
    /// Create a new HTTP server from resolved configuration
    pub fn new(config: &PinDropConfig) -> Result<Self> {
        let store = FileStore::new(config.storage_path().clone(), config.storage.strict_pins);

        Ok(Self {
            bind_address: config.server.bind_address.clone(),
            max_upload_bytes: config.max_upload_bytes(),
            cors: Cors::new(&config.cors.allowed_origin)?,
            state: Arc::new(AppState { store }),
        })
    }

    /// Create the router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/files/:pin", get(handle_list).post(handle_upload))
            .route("/api/files/:pin/:filename", get(handle_download))
            // API documentation
            .route("/api/swagger", get(handle_docs))
            .route("/api/swagger/openapi.json", get(handle_docs))
            .layer(DefaultBodyLimit::max(self.max_upload_bytes))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(middleware::from_fn_with_state(self.cors.clone(), handle_cors)),
            )
            .with_state(Arc::clone(&self.state))
    }

    /// Start the HTTP server and run until Ctrl-C
    pub async fn start(&self) -> Result<()> {
        self.state.store.init().await?;
        tracing::info!("Using storage path: {}", self.state.store.root().display());

        let app = self.router();

        let listener = tokio::net::TcpListener::bind(&self.bind_address).await?;
        tracing::info!("HTTP API listening on {}", self.bind_address);
        tracing::info!("API documentation available at http://{}/api/swagger", self.bind_address);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Network(format!("HTTP server error: {}", e)))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}

// ============ Request/Response Types ============

/// File listing response
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub files: Vec<FileInfo>,
}

/// Upload response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

// ============ Handlers ============

async fn handle_list(
    State(state): State<Arc<AppState>>,
    Path(pin): Path<String>,
) -> std::result::Result<Json<ListResponse>, Error> {
    tracing::info!("[GET /files/{}] Listing files", pin);

    match state.store.list(&pin).await {
        Ok(files) => {
            tracing::info!("[GET /files/{}] Found {} files", pin, files.len());
            Ok(Json(ListResponse { files }))
        }
        Err(e) => {
            tracing::error!("[GET /files/{}] Listing failed: {}", pin, e);
            Err(e)
        }
    }
}

async fn handle_upload(
    State(state): State<Arc<AppState>>,
    Path(pin): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<Json<MessageResponse>, Error> {
    tracing::info!("[POST /files/{}] Upload request received", pin);

    match receive_upload(&state.store, &pin, multipart).await {
        Ok(info) => {
            tracing::info!("[POST /files/{}] File uploaded successfully: {} ({} bytes)", pin, info.name, info.size);
            Ok(Json(MessageResponse {
                message: format!("File {} uploaded successfully", info.name),
            }))
        }
        Err(e) if e.is_client_error() => {
            tracing::warn!("[POST /files/{}] Rejected upload: {}", pin, e);
            Err(e)
        }
        Err(e) => {
            tracing::error!("[POST /files/{}] Error saving file: {}", pin, e);
            Err(e)
        }
    }
}

/// Stream the `file` field of a multipart body into the store
async fn receive_upload(
    store: &FileStore,
    pin: &str,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<FileInfo> {
    store.ensure_pin_dir(pin).await?;
    let mut multipart = multipart.map_err(|e| Error::Multipart(e.body_text()))?;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Multipart(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(raw_name) = field.file_name().map(str::to_owned) else {
            return Err(Error::MissingFile);
        };

        let mut upload = store.create(pin, &raw_name).await?;
        tracing::debug!("[POST /files/{}] Receiving {}", pin, upload.name());
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| Error::Multipart(e.body_text()))?
        {
            upload.write_chunk(&chunk).await?;
        }
        return upload.finish().await;
    }

    Err(Error::MissingFile)
}

async fn handle_download(
    State(state): State<Arc<AppState>>,
    Path((pin, filename)): Path<(String, String)>,
) -> std::result::Result<Response, Error> {
    tracing::info!("[GET /files/{}/{}] Download request", pin, filename);

    let (file, size) = match state.store.open(&pin, &filename).await {
        Ok(opened) => opened,
        Err(e) => {
            tracing::warn!("[GET /files/{}/{}] {}", pin, filename, e);
            return Err(e);
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', "\\\""));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    tracing::info!("[GET /files/{}/{}] Serving file ({} bytes)", pin, filename, size);
    Ok((StatusCode::OK, headers, Body::from_stream(ReaderStream::new(file))).into_response())
}
