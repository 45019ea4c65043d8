use crate::domain::compute::{validate_operands, Operation};
use crate::domain::encryption::DEFAULT_BITS;
use crate::domain::types::{BitWidth, EncryptedHandle, PlainValue};
use crate::transport::http::handlers::common::{
    client_ip, fail, from_error, json_400, method_not_allowed, ok,
};
use crate::transport::http::types::{
    ApiResponse, AppState, ComputeRequest, DecryptRequest, EncryptRequest,
};
use crate::util::is_valid_address;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::info;

#[utoipa::path(
    post,
    path = "/api/fhe/encrypt",
    request_body = EncryptRequest,
    responses(
        (status = 200, description = "Value encrypted", body = ApiResponse),
        (status = 400, description = "Missing value, unsupported width or value out of range", body = ApiResponse),
        (status = 500, description = "FHE instance failure", body = ApiResponse)
    )
)]
pub async fn encrypt_handler(
    State(state): State<AppState>,
    payload: Result<Json<EncryptRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(e) => return json_400(&state, e, "{ value, bits? }"),
    };
    if request.value.is_null() {
        return fail(&state, StatusCode::BAD_REQUEST, "Value is required");
    }
    let bits = request.bits.unwrap_or(DEFAULT_BITS);
    if BitWidth::from_bits(bits).is_err() {
        return fail(
            &state,
            StatusCode::BAD_REQUEST,
            "Invalid bit size. Must be 8, 16, 32, 64, 128, or 256",
        );
    }
    let value = match PlainValue::from_json(&request.value) {
        Ok(v) => v,
        Err(e) => return from_error(&state, "encrypt", e),
    };

    match state.fhe_service.encrypt(value, bits).await {
        Ok(encrypted) => ok(
            &state,
            json!({
                "encrypted": encrypted.to_hex(),
                "originalValue": request.value,
                "bits": bits,
            }),
        ),
        Err(e) => from_error(&state, "encrypt", e),
    }
}

pub async fn encrypt_get_handler(State(state): State<AppState>) -> impl IntoResponse {
    method_not_allowed(&state, "GET method not supported. Use POST with value and bits.")
}

#[utoipa::path(
    post,
    path = "/api/fhe/decrypt",
    request_body = DecryptRequest,
    responses(
        (status = 200, description = "Publicly decryptable value revealed", body = ApiResponse),
        (status = 400, description = "Invalid handle or addresses", body = ApiResponse),
        (status = 500, description = "Gateway failure", body = ApiResponse)
    )
)]
pub async fn decrypt_handler(
    State(state): State<AppState>,
    payload: Result<Json<DecryptRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(e) => return json_400(&state, e, "{ encryptedHandle, userAddress, contractAddress }"),
    };

    let Some(raw_handle) = request.encrypted_handle.filter(|h| !h.is_empty()) else {
        return fail(&state, StatusCode::BAD_REQUEST, "Encrypted handle is required");
    };
    let bits = match BitWidth::from_bits(request.bits.unwrap_or(DEFAULT_BITS)) {
        Ok(b) => b,
        Err(e) => return from_error(&state, "decrypt", e),
    };
    let handle = match EncryptedHandle::new(raw_handle, bits) {
        Ok(h) => h,
        Err(_) => {
            return fail(&state, StatusCode::BAD_REQUEST, "Invalid encrypted handle format");
        }
    };
    if !request.user_address.as_deref().is_some_and(is_valid_address) {
        return fail(&state, StatusCode::BAD_REQUEST, "Valid user address is required");
    }
    if !request.contract_address.as_deref().is_some_and(is_valid_address) {
        return fail(&state, StatusCode::BAD_REQUEST, "Valid contract address is required");
    }

    // Only public decryption is served here; user decryption needs the user's own signature.
    match state.fhe_service.public_decrypt(&handle).await {
        Ok(value) => ok(
            &state,
            json!({ "value": value, "handle": handle.as_str(), "bits": bits }),
        ),
        Err(e) => from_error(&state, "decrypt", e),
    }
}

pub async fn decrypt_get_handler(State(state): State<AppState>) -> impl IntoResponse {
    method_not_allowed(&state, "GET method not supported. Use POST with encrypted handle.")
}

#[utoipa::path(
    post,
    path = "/api/fhe/compute",
    request_body = ComputeRequest,
    responses(
        (status = 200, description = "Computation accepted", body = ApiResponse),
        (status = 400, description = "Invalid operation or operands", body = ApiResponse),
        (status = 429, description = "Rate limit exceeded", body = ApiResponse),
        (status = 500, description = "Computation failure", body = ApiResponse)
    )
)]
pub async fn compute_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ComputeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let ip = client_ip(&headers);
    if !state.compute_limiter.check(&ip).await {
        info!(%ip, "compute rate limit exceeded");
        return fail(
            &state,
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded. Please try again later.",
        );
    }

    let Json(request) = match payload {
        Ok(p) => p,
        Err(e) => return json_400(&state, e, "{ operation, operands, bits? }"),
    };
    let operation = match request.operation.as_deref().map(str::parse::<Operation>) {
        Some(Ok(op)) => op,
        _ => {
            return fail(
                &state,
                StatusCode::BAD_REQUEST,
                "Invalid operation. Must be add, subtract, multiply, or compare",
            )
        }
    };
    if validate_operands(&request.operands).is_err() {
        return fail(
            &state,
            StatusCode::BAD_REQUEST,
            "Invalid operands. Must provide at least 2 encrypted handles",
        );
    }
    let bits = request.bits.unwrap_or(DEFAULT_BITS);

    match state
        .fhe_service
        .compute(operation, &request.operands, bits)
        .await
    {
        Ok(result) => ok(
            &state,
            json!({
                "result": result,
                "operation": operation,
                "operands": request.operands.len(),
                "bits": bits,
            }),
        ),
        Err(e) => from_error(&state, "compute", e),
    }
}

pub async fn compute_get_handler(State(state): State<AppState>) -> impl IntoResponse {
    method_not_allowed(
        &state,
        "GET method not supported. Use POST with operation and operands.",
    )
}
