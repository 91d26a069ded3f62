//! Request/response types for the HTTP API.

use serde::{Deserialize, Serialize};

/// Body of `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message, free text or slash command.
    pub message: String,
    /// Conversation key for pending-action state. A fresh id is issued when
    /// absent; clients should echo it back on subsequent requests.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Reply from `POST /chat`.
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub session_id: String,
}

/// Reply from `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
