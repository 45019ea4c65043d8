// Responsible for all communication with the Ethereum JSON-RPC endpoint.

use crate::error::{Error, Result};
use crate::infra::rpc::TypedDataSigner;
use async_trait::async_trait;
use primitive_types::U256;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize, Debug)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize, Debug)]
struct RpcResponse {
    #[serde(default)]
    result: Option<JsonValue>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

pub struct JsonRpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Rpc(e.to_string()))?;
        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn request<T: DeserializeOwned>(&self, method: &str, params: JsonValue) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        debug!(method, id, "json-rpc request");

        let resp = self.http.post(&self.url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Rpc(format!("{} returned HTTP {}", method, status)));
        }
        let parsed: RpcResponse = resp.json().await?;
        if let Some(err) = parsed.error {
            return Err(Error::Rpc(format!("{} failed ({}): {}", method, err.code, err.message)));
        }
        let result = parsed
            .result
            .ok_or_else(|| Error::Rpc(format!("{} returned no result", method)))?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn chain_id(&self) -> Result<u64> {
        let hex_id: String = self.request("eth_chainId", json!([])).await?;
        parse_quantity(&hex_id).map(|v| v.low_u64())
    }

    pub async fn accounts(&self) -> Result<Vec<String>> {
        self.request("eth_accounts", json!([])).await
    }

    /// Read-only contract call against the latest block.
    pub async fn call(&self, to: &str, data: &[u8]) -> Result<Vec<u8>> {
        let out: String = self
            .request(
                "eth_call",
                json!([{ "to": to, "data": crate::util::to_hex_string(data) }, "latest"]),
            )
            .await?;
        crate::util::from_hex_string(&out).map_err(|e| Error::Rpc(e.to_string()))
    }

    /// Submits a transaction signed by the node/provider account; returns the tx hash.
    pub async fn send_transaction(&self, from: &str, to: &str, data: &[u8]) -> Result<String> {
        self.request(
            "eth_sendTransaction",
            json!([{ "from": from, "to": to, "data": crate::util::to_hex_string(data) }]),
        )
        .await
    }
}

#[async_trait]
impl TypedDataSigner for JsonRpcClient {
    async fn sign_typed_data(&self, address: &str, typed_data: &JsonValue) -> Result<String> {
        // eth_signTypedData_v4 takes the typed data as a JSON string.
        let payload = serde_json::to_string(typed_data)?;
        self.request("eth_signTypedData_v4", json!([address, payload]))
            .await
    }
}

/// Parses a `0x`-prefixed JSON-RPC quantity.
pub fn parse_quantity(s: &str) -> Result<U256> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| Error::Rpc(format!("expected hex quantity, got {:?}", s)))?;
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(digits, 16).map_err(|_| Error::Rpc(format!("invalid hex quantity {:?}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities() {
        assert_eq!(parse_quantity("0xaa36a7").unwrap(), U256::from(11_155_111u64));
        assert_eq!(parse_quantity("0x").unwrap(), U256::zero());
        assert!(parse_quantity("42").is_err());
    }
}
