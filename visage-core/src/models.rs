use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One upload event and its resulting face encoding. Rows are append-only;
/// `face_encoding` stays NULL when a row is recorded without a successful
/// encoding.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: i64,
    pub session_id: String,
    pub face_encoding: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// A user's claim on a session_id, open until `closed_at` is stamped.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSession {
    pub session_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Derived aggregation of all non-null encodings recorded under one
/// session_id, in insertion order. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub all_face_encodings: Vec<serde_json::Value>,
}
