//! Visage HTTP REST API
//!
//! Axum-based HTTP server exposing the session workflow.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to a
//! pure inner function returning `(StatusCode, serde_json::Value)`. The
//! inner functions are directly testable without axum dispatch machinery.
//!
//! Endpoints:
//! - GET  /ping                         — liveness probe
//! - POST /start_session?user_id=...    — open a session, closing prior ones
//! - POST /upload?session_id=...        — multipart selfie upload
//! - GET  /session_summary/:session_id  — aggregated encodings

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use visage_core::VisageConfig;

use crate::orchestrator::{ApiError, SessionOrchestrator};

/// Multipart bodies are capped well above any sane `max_file_size` so the
/// orchestrator's own size check produces the error, not the framework.
const MULTIPART_BODY_CAP: usize = 32 * 1024 * 1024;

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub orchestrator: SessionOrchestrator,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/ping", get(ping_handler))
        .route("/start_session", post(start_session_handler))
        .route("/upload", post(upload_handler))
        .route("/session_summary/:session_id", get(session_summary_handler))
        .layer(DefaultBodyLimit::max(MULTIPART_BODY_CAP))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    orchestrator: SessionOrchestrator,
    config: VisageConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let state = Arc::new(HttpState { orchestrator });

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Visage HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub session_id: String,
}

// ============================================================================
// Inner (directly testable) functions
// ============================================================================

/// Inner ping — pure, no IO.
pub fn ping_inner() -> serde_json::Value {
    serde_json::json!({ "status": 200 })
}

/// Translate an `ApiError` into the HTTP-facing `{message}` shape.
pub fn error_response(e: &ApiError) -> (StatusCode, serde_json::Value) {
    (e.status(), serde_json::json!({ "message": e.to_string() }))
}

pub async fn start_session_inner(
    orchestrator: &SessionOrchestrator,
    user_id: &str,
) -> (StatusCode, serde_json::Value) {
    match orchestrator.start_session(user_id).await {
        Ok(session_id) => (StatusCode::OK, serde_json::json!({ "session_id": session_id })),
        Err(e) => {
            tracing::error!(user_id, error = %e, "Error while starting session");
            error_response(&e)
        }
    }
}

pub async fn upload_inner(
    orchestrator: &SessionOrchestrator,
    session_id: &str,
    image: Bytes,
    filename: &str,
) -> (StatusCode, serde_json::Value) {
    let size = image.len() as u64;
    match orchestrator.upload(session_id, image, size, filename).await {
        Ok(output) => match serde_json::to_value(&output) {
            Ok(body) => (StatusCode::OK, body),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "message": e.to_string() }),
            ),
        },
        Err(e) => {
            tracing::error!(session_id, error = %e, "Error while uploading file");
            error_response(&e)
        }
    }
}

pub async fn session_summary_inner(
    orchestrator: &SessionOrchestrator,
    session_id: &str,
) -> (StatusCode, serde_json::Value) {
    match orchestrator.session_summary(session_id).await {
        Ok(summary) => match serde_json::to_value(&summary) {
            Ok(body) => (StatusCode::OK, body),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "message": e.to_string() }),
            ),
        },
        Err(e) => {
            tracing::error!(session_id, error = %e, "Error while getting session summary");
            error_response(&e)
        }
    }
}

/// Pull the `file` part out of a multipart body.
async fn read_file_field(mut multipart: Multipart) -> Result<(Bytes, String), String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Invalid multipart body: {e}"))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| format!("Failed to read file field: {e}"))?;
            return Ok((bytes, filename));
        }
    }
    Err("Multipart field 'file' is required".to_string())
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn ping_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(ping_inner()))
}

pub async fn start_session_handler(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<StartSessionQuery>,
) -> impl IntoResponse {
    let (status, body) = start_session_inner(&state.orchestrator, &query.user_id).await;
    (status, Json(body))
}

pub async fn upload_handler(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> impl IntoResponse {
    let (image, filename) = match read_file_field(multipart).await {
        Ok(parts) => parts,
        Err(message) => {
            tracing::error!(session_id = %query.session_id, %message, "Rejected upload body");
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "message": message })),
            );
        }
    };

    let (status, body) = upload_inner(&state.orchestrator, &query.session_id, image, &filename).await;
    (status, Json(body))
}

pub async fn session_summary_handler(
    State(state): State<Arc<HttpState>>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let (status, body) = session_summary_inner(&state.orchestrator, &session_id).await;
    (status, Json(body))
}

// ============================================================================
// Unit tests — pure pieces only; dispatch tests live in tests/
// ============================================================================
