use crate::domain::compute::Operation;
use crate::transport::http::handlers::{fhe, health, keys};
use crate::transport::http::types::{
    ApiResponse, AppState, ComputeRequest, DecryptRequest, EncryptRequest, KeyGenerationRequest,
};
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        fhe::encrypt_handler,
        fhe::decrypt_handler,
        fhe::compute_handler,
        keys::generate_keys_handler,
        keys::keys_info_handler,
        keys::clear_keys_handler
    ),
    components(schemas(
        ApiResponse,
        EncryptRequest,
        DecryptRequest,
        ComputeRequest,
        KeyGenerationRequest,
        Operation
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/api/fhe/encrypt",
            post(fhe::encrypt_handler).get(fhe::encrypt_get_handler),
        )
        .route(
            "/api/fhe/decrypt",
            post(fhe::decrypt_handler).get(fhe::decrypt_get_handler),
        )
        .route(
            "/api/fhe/compute",
            post(fhe::compute_handler).get(fhe::compute_get_handler),
        )
        .route(
            "/api/keys",
            post(keys::generate_keys_handler)
                .get(keys::keys_info_handler)
                .delete(keys::clear_keys_handler),
        )
        .with_state(app_state)
}
