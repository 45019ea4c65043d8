use crate::app::fhe_service::FheService;
use crate::infra::clock::Clock;
use crate::storage::keys::KeyCache;
use crate::transport::http::rate_limit::RateLimiter;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub fhe_service: Arc<FheService>,
    pub key_cache: Arc<KeyCache>,
    pub compute_limiter: Arc<RateLimiter>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Unix millis.
    pub timestamp: i64,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct EncryptRequest {
    /// Unsigned integer, decimal string, or boolean.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub value: JsonValue,
    /// One of 8, 16, 32, 64, 128, 256 (default 32).
    #[serde(default)]
    pub bits: Option<u32>,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecryptRequest {
    #[serde(default)]
    pub encrypted_handle: Option<String>,
    #[serde(default)]
    pub user_address: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
    /// Width of the value behind the handle (default 32).
    #[serde(default)]
    pub bits: Option<u32>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ComputeRequest {
    /// add | subtract | multiply | compare
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub operands: Vec<String>,
    #[serde(default)]
    pub bits: Option<u32>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct KeyGenerationRequest {
    /// client | server (default client)
    #[serde(default, rename = "type")]
    pub key_type: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub options: Option<JsonValue>,
}
