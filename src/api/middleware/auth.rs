//! Shared-key authentication for the push endpoint
//!
//! Only agents hold the key, so only the ingest route is gated; the query
//! endpoints and the realtime channel stay open, matching the rest of the
//! wire contract.

use axum::{
    Json,
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::state::ApiState;

/// Authentication middleware
///
/// Checks the `x-api-key` header against the configured shared secret.
/// Rejection happens before the handler runs, so an unauthorized push
/// never touches the store.
pub async fn require_api_key(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let presented = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok());

    match presented {
        Some(key) if key == state.api_key => Ok(next.run(request).await),
        _ => Err(AuthError::InvalidKey),
    }
}

/// Authentication errors
#[derive(Debug)]
pub enum AuthError {
    /// Key missing or mismatched; the two are deliberately not distinguished
    InvalidKey,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": "Invalid API key" }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
