//! Session Orchestrator — the workflow rules behind the HTTP surface.
//!
//! Holds no state between requests: every operation reads and writes
//! through the injected `SessionStore` and makes at most one call to the
//! face-encoding service. `ApiError` is the single place internal error
//! kinds are translated into HTTP-facing statuses.

use std::sync::Arc;

use axum::http::StatusCode;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use visage_core::encoder::{EncoderError, FaceEncoderClient};
use visage_core::ids;
use visage_core::models::SessionSummary;
use visage_core::store::{SessionStore, StoreError};

/// Maximum number of session rows (uploads) per session_id.
pub const SESSION_UPLOAD_LIMIT: i64 = 5;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Session {0} not found")]
    SessionNotFound(String),

    #[error("The file is too large. File should be less than {limit_mb} MB. FileSize: {actual_mb} MB")]
    PayloadTooLarge { limit_mb: f64, actual_mb: f64 },

    #[error("Session limit reached. Maximum of {SESSION_UPLOAD_LIMIT} files per session")]
    SessionLimitReached,

    #[error("{body}")]
    Upstream { status: u16, body: String },

    #[error("Error connecting to face-encoding service: {0}")]
    Unreachable(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge { .. } | ApiError::SessionLimitReached => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Unreachable(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<EncoderError> for ApiError {
    fn from(e: EncoderError) -> Self {
        match e {
            EncoderError::Api { status, body } => ApiError::Upstream { status, body },
            EncoderError::Unreachable(inner) => ApiError::Unreachable(inner.to_string()),
        }
    }
}

/// Result record for a successful upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutput {
    pub face_embedding: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionOrchestrator {
    store: Arc<dyn SessionStore>,
    encoder: FaceEncoderClient,
    max_file_size: u64,
}

impl SessionOrchestrator {
    pub fn new(store: Arc<dyn SessionStore>, encoder: FaceEncoderClient, max_file_size: u64) -> Self {
        Self {
            store,
            encoder,
            max_file_size,
        }
    }

    /// Open a fresh session for the user, closing any previously-open ones.
    /// After a successful return the user has exactly one open session.
    pub async fn start_session(&self, user_id: &str) -> Result<String, ApiError> {
        let session_id = ids::generate_session_id();
        tracing::info!(session_id, user_id, "Starting session");

        let open = self.store.open_user_sessions(user_id).await?;
        tracing::info!(user_id, open = open.len(), "Open sessions before start");
        if !open.is_empty() {
            // More than zero open sessions here is an anomaly, not an error.
            tracing::warn!(user_id, "User already has open sessions; closing them");
            self.store.close_user_session(user_id).await?;
        }

        self.store.add_user_session(&session_id, user_id).await?;

        Ok(session_id)
    }

    /// Validate and broker one image upload.
    ///
    /// The upload limit is check-then-insert with no cross-call lock, so it
    /// is only approximately enforced under concurrency: two in-flight
    /// uploads can both observe a count below the limit and both persist.
    pub async fn upload(
        &self,
        session_id: &str,
        image: Bytes,
        size_hint: u64,
        filename: &str,
    ) -> Result<UploadOutput, ApiError> {
        tracing::debug!(session_id, size_hint, "Upload requested");

        if !self.store.session_exists(session_id).await? {
            tracing::error!(session_id, "Upload against unknown session");
            return Err(ApiError::SessionNotFound(session_id.to_string()));
        }

        if size_hint > self.max_file_size {
            return Err(ApiError::PayloadTooLarge {
                limit_mb: bytes_to_megabytes(self.max_file_size),
                actual_mb: bytes_to_megabytes(size_hint),
            });
        }

        if self.store.session_count(session_id).await? >= SESSION_UPLOAD_LIMIT {
            tracing::warn!(session_id, "Session upload limit reached");
            return Err(ApiError::SessionLimitReached);
        }

        let encoding = self.encoder.encode(image, filename).await?;
        tracing::info!(session_id, filename, "Image encoded");

        self.store
            .add_session(session_id, Some(encoding.clone()))
            .await?;

        Ok(UploadOutput {
            face_embedding: encoding,
            timestamp: Utc::now(),
        })
    }

    /// Aggregate all recorded encodings for a session.
    ///
    /// A missing session surfaces as a 500-equivalent rather than a 404:
    /// this matches the deployed service's contract (see DESIGN.md).
    pub async fn session_summary(&self, session_id: &str) -> Result<SessionSummary, ApiError> {
        tracing::info!(session_id, "Getting session summary");
        self.store.session_summary(session_id).await.map_err(|e| {
            ApiError::Internal(format!(
                "Failed to get session summary for session '{session_id}'. Error: {e}"
            ))
        })
    }
}

/// Bytes to megabytes (1 MB = 1,048,576 bytes), rounded to two decimals.
pub fn bytes_to_megabytes(size_in_bytes: u64) -> f64 {
    (size_in_bytes as f64 / 1024.0 / 1024.0 * 100.0).round() / 100.0
}
