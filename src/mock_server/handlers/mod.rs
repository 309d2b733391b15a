//! HTTP request handlers for the mock server.

pub mod reports;
pub mod scans;

pub use reports::*;
pub use scans::*;

use std::sync::Arc;

use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::RwLock;

use crate::mock_server::state::MockState;

/// State type shared by every handler.
pub type SharedState = Arc<RwLock<MockState>>;

/// `{"error": message}` with the given status, the way MobSF reports failures.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Count the request, then apply any injected failure and the API key check.
pub fn admit(state: &mut MockState, headers: &HeaderMap) -> Result<(), Response> {
    state.requests += 1;

    if let Some(code) = state.injected_failures.pop_front() {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Err(error_response(status, "Injected failure"));
    }

    if let Some(ref key) = state.required_api_key {
        let sent = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        if sent != Some(key.as_str()) {
            return Err(error_response(
                StatusCode::UNAUTHORIZED,
                "You are unauthorized to make this request.",
            ));
        }
    }

    Ok(())
}
