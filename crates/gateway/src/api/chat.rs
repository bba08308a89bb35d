//! `POST /chat`: run one conversational turn and return the reply.

use std::net::SocketAddr;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use tracing::Instrument;

use guru_sessions::resolve_session_id;

use super::error_response;
use crate::state::AppState;

pub const MISSING_MESSAGE: &str = "No message received.";
pub const REPLY_FAILED: &str = "The Guru is silent right now.";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request shape
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    #[serde(default)]
    pub message: Option<String>,
    /// Opaque caller token. Falls back to the peer address when absent.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Display name, only recorded on the request span.
    #[serde(default)]
    pub user_name: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /chat
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn chat(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(b)) => b,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "chat body rejected");
            return error_response(StatusCode::BAD_REQUEST, MISSING_MESSAGE);
        }
    };

    let message = match body.message {
        Some(m) if !m.trim().is_empty() => m,
        _ => return error_response(StatusCode::BAD_REQUEST, MISSING_MESSAGE),
    };

    let session_id = resolve_session_id(
        body.session_id.as_deref(),
        peer.map(|ConnectInfo(addr)| addr.ip()),
    );

    let span = tracing::info_span!(
        "chat_turn",
        session_id = %session_id,
        user_name = tracing::field::Empty,
    );
    if let Some(name) = body.user_name.as_deref() {
        span.record("user_name", name);
    }

    let result = state
        .pipeline
        .run_turn(&session_id, &message)
        .instrument(span)
        .await;

    match result {
        Ok(reply) => Json(serde_json::json!({ "reply": reply })).into_response(),
        Err(e) => {
            tracing::error!(session_id = %session_id, error = %e, "chat turn failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, REPLY_FAILED)
        }
    }
}
