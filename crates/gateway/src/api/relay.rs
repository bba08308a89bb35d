//! `POST /supabase`: forward an arbitrary operation to the backend REST API.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::Value;

use guru_relay::RelayError;

use super::error_response;
use crate::state::AppState;

pub const TRANSPORT_FAILED: &str = "Backend relay failed";
pub const INVALID_JSON: &str = "Invalid JSON from backend";

#[derive(Debug, Deserialize)]
pub struct RelayBody {
    /// Path on the backend, e.g. `/rest/v1/journal?select=*`.
    pub url: String,
    #[serde(default = "d_get")]
    pub method: String,
    #[serde(default)]
    pub body: Option<Value>,
}

fn d_get() -> String {
    "GET".into()
}

pub async fn relay(
    State(state): State<AppState>,
    body: Result<Json<RelayBody>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(b)) => b,
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, &rejection.body_text());
        }
    };

    match state
        .relay
        .relay(&req.url, &req.method, req.body.as_ref())
        .await
    {
        // No Content carries no body, not even `null`.
        Ok(resp) if resp.status == 204 => StatusCode::NO_CONTENT.into_response(),
        Ok(resp) => {
            let status = StatusCode::from_u16(resp.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(resp.body)).into_response()
        }
        Err(RelayError::NonJson { status, preview }) => {
            tracing::warn!(
                upstream_status = status,
                path = %req.url,
                "backend returned non-JSON body"
            );
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({
                    "error": INVALID_JSON,
                    "preview": preview,
                })),
            )
                .into_response()
        }
        Err(e) if e.is_client_error() => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
        Err(e) => {
            tracing::error!(
                path = %req.url,
                method = %req.method,
                error = %e,
                "backend relay failed"
            );
            error_response(StatusCode::INTERNAL_SERVER_ERROR, TRANSPORT_FAILED)
        }
    }
}
