use crate::transport::http::handlers::common::ok;
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::State;
use axum::response::IntoResponse;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up; reports whether the FHE client is initialized", body = ApiResponse)
    )
)]
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    let client_ready = state.fhe_service.registry().is_ready().await;
    ok(
        &state,
        serde_json::json!({ "status": "ok", "clientReady": client_ready }),
    )
}
