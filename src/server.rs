use crate::{
    config::Config,
    errors::{UploadError, UploadResult},
    limits,
    static_files::{StaticError, StaticFiles},
    storage::ImageStore,
    upload::handle_upload,
};
use anyhow::Context;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use std::{sync::Arc, time::Instant};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub store: Arc<ImageStore>,
    pub statics: Arc<StaticFiles>,
}

impl AppState {
    /// Creates the upload directory if it is missing.
    pub fn new(cfg: Config) -> anyhow::Result<Self> {
        let store = ImageStore::new(cfg.storage.upload_dir.clone());
        store.ensure_dir().context("creating upload dir")?;
        let statics = StaticFiles::new(cfg.storage.public_dir.clone());
        Ok(Self { cfg: Arc::new(cfg), store: Arc::new(store), statics: Arc::new(statics) })
    }
}

pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr: std::net::SocketAddr =
        format!("{}:{}", state.cfg.server.bind_addr, state.cfg.server.port)
            .parse()
            .context("parsing bind address")?;
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(shared: AppState) -> Router {
    Router::new()
        .route("/upload", post(upload).fallback(method_not_allowed))
        .fallback(static_file)
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

async fn upload(State(state): State<AppState>, headers: HeaderMap, body: Body) -> Response {
    let started = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string();

    let body = match receive(&state, &headers, body).await {
        Ok(b) => b,
        Err(e) => {
            audit_end(&request_id, "deny", e.code(), started.elapsed().as_millis() as u64, 0, None);
            return e.into_response();
        }
    };
    let bytes_in = body.len() as u64;

    match handle_upload(&state.store, &body).await {
        Ok(receipt) => {
            tracing::debug!(request_id = %request_id, bytes_written = receipt.bytes_written, "upload stored");
            audit_end(
                &request_id,
                "allow",
                "OK",
                started.elapsed().as_millis() as u64,
                bytes_in,
                Some(&receipt.file_name),
            );
            (StatusCode::OK, Json(receipt)).into_response()
        }
        Err(e) => {
            let decision = match &e {
                UploadError::StorageFailure(detail) => {
                    tracing::error!(request_id = %request_id, detail = %detail, "failed to store upload");
                    "error"
                }
                _ => "deny",
            };
            audit_end(&request_id, decision, e.code(), started.elapsed().as_millis() as u64, bytes_in, None);
            e.into_response()
        }
    }
}

async fn receive(state: &AppState, headers: &HeaderMap, body: Body) -> UploadResult<Bytes> {
    let max = state.cfg.limits.max_body_bytes();
    limits::content_length_ok(headers, max)?;
    limits::read_body_limited(body, max).await
}

async fn static_file(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET {
        return method_not_allowed().await;
    }
    match state.statics.load(uri.path()).await {
        Ok((bytes, content_type)) => (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], bytes).into_response(),
        Err(StaticError::BadPath) => plain(StatusCode::BAD_REQUEST, "Bad request"),
        Err(StaticError::NotFound) => plain(StatusCode::NOT_FOUND, "Not found"),
    }
}

async fn method_not_allowed() -> Response {
    plain(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

fn plain(status: StatusCode, text: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain")], text).into_response()
}

fn audit_end(
    request_id: &str,
    decision: &str,
    code: &str,
    duration_ms: u64,
    bytes_in: u64,
    file_name: Option<&str>,
) {
    tracing::info!(
        request_id = request_id,
        decision = decision,
        code = code,
        duration_ms = duration_ms,
        bytes_in = bytes_in,
        file_name = file_name,
        "audit"
    );
}
