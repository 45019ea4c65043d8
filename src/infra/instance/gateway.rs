// Responsible for all communication with the FHE gateway / relayer.

use crate::domain::types::{DecryptedValue, EncryptedHandle, EncryptedValue, ReencryptionKeyPair};
use crate::error::{Error, Result};
use crate::infra::instance::{random_keypair, FheInstance, ReencryptRequest};
use async_trait::async_trait;
use primitive_types::U256;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;
use tracing::debug;

pub struct GatewayInstance {
    http: reqwest::Client,
    base_url: String,
    chain_id: u64,
}

#[derive(Deserialize)]
struct CiphertextResponse {
    ciphertext: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicKeyResponse {
    public_key: String,
}

#[derive(Deserialize)]
struct PlaintextResponse {
    value: JsonValue,
}

impl GatewayInstance {
    pub fn new(base_url: &str, chain_id: u64, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Initialization(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            chain_id,
        })
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: JsonValue) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "gateway request");
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Instance(format!("gateway unreachable: {}", e)))?;
        Self::decode(resp).await
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Instance(format!("gateway returned {}: {}", status, body)));
        }
        resp.json::<T>()
            .await
            .map_err(|e| Error::Instance(format!("malformed gateway response: {}", e)))
    }

    async fn encrypt_value(&self, bits: u32, value: U256) -> Result<EncryptedValue> {
        let resp: CiphertextResponse = self
            .post(
                "/v1/encrypt",
                json!({ "chainId": self.chain_id, "bits": bits, "value": value.to_string() }),
            )
            .await?;
        crate::util::from_hex_string(&resp.ciphertext)
            .map(EncryptedValue)
            .map_err(|e| Error::Instance(e.to_string()))
    }
}

#[async_trait]
impl FheInstance for GatewayInstance {
    async fn encrypt8(&self, value: u8) -> Result<EncryptedValue> {
        self.encrypt_value(8, U256::from(value)).await
    }

    async fn encrypt16(&self, value: u16) -> Result<EncryptedValue> {
        self.encrypt_value(16, U256::from(value)).await
    }

    async fn encrypt32(&self, value: u32) -> Result<EncryptedValue> {
        self.encrypt_value(32, U256::from(value)).await
    }

    async fn encrypt64(&self, value: u64) -> Result<EncryptedValue> {
        self.encrypt_value(64, U256::from(value)).await
    }

    async fn encrypt128(&self, value: u128) -> Result<EncryptedValue> {
        self.encrypt_value(128, U256::from(value)).await
    }

    async fn encrypt256(&self, value: U256) -> Result<EncryptedValue> {
        self.encrypt_value(256, value).await
    }

    async fn public_key(&self) -> Result<String> {
        let url = format!("{}/v1/public-key?chainId={}", self.base_url, self.chain_id);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Instance(format!("gateway unreachable: {}", e)))?;
        let key: PublicKeyResponse = Self::decode(resp).await?;
        Ok(key.public_key)
    }

    fn generate_keypair(&self) -> ReencryptionKeyPair {
        random_keypair()
    }

    async fn reencrypt(&self, request: ReencryptRequest<'_>) -> Result<DecryptedValue> {
        let resp: PlaintextResponse = self
            .post(
                "/v1/reencrypt",
                json!({
                    "chainId": self.chain_id,
                    "handle": request.handle.as_str(),
                    "userAddress": request.user_address,
                    "contractAddress": request.contract_address,
                    "signature": request.signature,
                }),
            )
            .await?;
        DecryptedValue::from_json(&resp.value)
    }

    async fn public_decrypt(&self, handle: &EncryptedHandle) -> Result<DecryptedValue> {
        let resp: PlaintextResponse = self
            .post(
                "/v1/public-decrypt",
                json!({ "chainId": self.chain_id, "handle": handle.as_str() }),
            )
            .await?;
        DecryptedValue::from_json(&resp.value)
    }
}
