//! HTTP API surface.

mod routes;
mod types;

pub use routes::{serve, AppState};
pub use types::{ChatReply, ChatRequest, HealthResponse};
