use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use tracing::{error, warn};

use rewrite_module::signature::{verify_notion_signature, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use rewrite_module::webhook::handle_notion_webhook;

use super::state::GatewayState;

pub(super) async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

pub(super) async fn notion_webhook(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    let timestamp = headers
        .get(TIMESTAMP_HEADER)
        .and_then(|value| value.to_str().ok());

    if !verify_notion_signature(
        state.config.notion_webhook_secret.as_deref(),
        signature,
        timestamp,
        &body,
    ) {
        warn!("rejected notion webhook with invalid signature");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"ok": false, "error": "invalid signature"})),
        );
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"ok": false, "error": "invalid json"})),
            )
        }
    };

    match handle_notion_webhook(
        &state.notion,
        &state.openrouter,
        &state.config.trigger_keyword,
        &payload,
    )
    .await
    {
        Ok(()) => (StatusCode::OK, Json(json!({"ok": true}))),
        Err(err) => {
            error!("failed to handle notion webhook: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"ok": false})))
        }
    }
}
