pub mod client;

pub use client::JsonRpcClient;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

/// External signing provider (wallet or node) able to sign EIP-712 typed data.
#[async_trait]
pub trait TypedDataSigner: Send + Sync {
    async fn sign_typed_data(&self, address: &str, typed_data: &JsonValue) -> Result<String>;
}
