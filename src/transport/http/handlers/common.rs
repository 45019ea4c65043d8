use crate::error::Error;
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value as JsonValue;
use tracing::{error, warn};

pub fn ok(state: &AppState, data: JsonValue) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            timestamp: state.clock.now_millis(),
        }),
    )
        .into_response()
}

pub fn fail(state: &AppState, status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
            timestamp: state.clock.now_millis(),
        }),
    )
        .into_response()
}

/// Input errors map to 400, everything downstream to 500.
pub fn from_error(state: &AppState, context: &str, e: Error) -> Response {
    if e.is_client_error() {
        warn!(context, error = %e, "rejected request");
        fail(state, StatusCode::BAD_REQUEST, e.to_string())
    } else {
        error!(context, error = %e, "request failed");
        fail(state, StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

pub fn json_400(state: &AppState, err: JsonRejection, expected: &str) -> Response {
    fail(
        state,
        StatusCode::BAD_REQUEST,
        format!("Invalid JSON body: {} (expected: {})", err.body_text(), expected),
    )
}

pub fn method_not_allowed(state: &AppState, message: &str) -> Response {
    fail(state, StatusCode::METHOD_NOT_ALLOWED, message)
}

/// First hop of `x-forwarded-for`, or `unknown`.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_uses_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), "unknown");
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 172.16.0.1"));
        assert_eq!(client_ip(&headers), "10.0.0.1");
    }
}
