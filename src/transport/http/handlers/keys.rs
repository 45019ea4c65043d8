use crate::transport::http::handlers::common::{fail, from_error, json_400, ok};
use crate::transport::http::types::{ApiResponse, AppState, KeyGenerationRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::debug;

#[utoipa::path(
    post,
    path = "/api/keys",
    request_body = KeyGenerationRequest,
    responses(
        (status = 200, description = "Client key reused or generated, or a fresh server key", body = ApiResponse),
        (status = 400, description = "Unknown key type", body = ApiResponse),
        (status = 500, description = "Key store failure", body = ApiResponse)
    )
)]
pub async fn generate_keys_handler(
    State(state): State<AppState>,
    payload: Result<Json<KeyGenerationRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(e) => return json_400(&state, e, "{ type: \"client\" | \"server\", options? }"),
    };
    let key_type = request.key_type.as_deref().unwrap_or("client");
    if request.options.is_some() {
        debug!("key generation options are accepted but ignored");
    }

    let pair = match key_type {
        "client" => match state.key_cache.get_or_generate_key() {
            Ok(pair) => pair,
            Err(e) => return from_error(&state, "generate_keys", e),
        },
        // Server keys are never cached.
        "server" => state.key_cache.generate_key_pair(),
        _ => {
            return fail(
                &state,
                StatusCode::BAD_REQUEST,
                "Invalid key type. Must be \"client\" or \"server\"",
            )
        }
    };

    ok(
        &state,
        json!({
            "publicKey": pair.public_key,
            "generated": pair.generated,
            "type": key_type,
        }),
    )
}

#[utoipa::path(
    get,
    path = "/api/keys",
    responses(
        (status = 200, description = "Usage description for key generation", body = ApiResponse)
    )
)]
pub async fn keys_info_handler(State(state): State<AppState>) -> impl IntoResponse {
    ok(
        &state,
        json!({
            "message": "FHE Key Management API",
            "endpoints": {
                "POST": "Generate new keys",
                "DELETE": "Clear the cached client key",
            },
            "supportedTypes": ["client", "server"],
            "maxAgeHours": state.key_cache.max_age().as_secs() / 3600,
        }),
    )
}

#[utoipa::path(
    delete,
    path = "/api/keys",
    responses(
        (status = 200, description = "Cached client key removed", body = ApiResponse),
        (status = 500, description = "Key store failure", body = ApiResponse)
    )
)]
pub async fn clear_keys_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.key_cache.clear_stored_keys() {
        Ok(()) => ok(&state, json!({ "cleared": true })),
        Err(e) => from_error(&state, "clear_keys", e),
    }
}
