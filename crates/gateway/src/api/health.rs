//! Liveness endpoints. None of these touch the model or the backend.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};

pub async fn root() -> &'static str {
    "The Guru Speaks: server is running."
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn ping() -> impl IntoResponse {
    Json(serde_json::json!({
        "ok": true,
        "message": "Server responding fine",
    }))
}
