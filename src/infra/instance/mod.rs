//! The wrapped FHE instance.
//!
//! Every cryptographic operation the SDK exposes is a single call into an `FheInstance`.
//! Two implementations ship with the crate: a gateway-backed instance that forwards to a
//! remote relayer, and a local simulated instance for development networks and tests.

use crate::domain::types::{DecryptedValue, EncryptedHandle, EncryptedValue, ReencryptionKeyPair};
use crate::error::Result;
use async_trait::async_trait;
use primitive_types::U256;
use rand::RngCore;
use std::sync::Arc;

pub mod gateway;
pub mod simulated;

pub use gateway::GatewayInstance;
pub use simulated::SimulatedInstance;

/// Inputs of an authorized reencryption.
#[derive(Debug, Clone, Copy)]
pub struct ReencryptRequest<'a> {
    pub handle: &'a EncryptedHandle,
    pub user_address: &'a str,
    pub contract_address: &'a str,
    pub signature: &'a str,
}

#[async_trait]
pub trait FheInstance: Send + Sync {
    async fn encrypt8(&self, value: u8) -> Result<EncryptedValue>;
    async fn encrypt16(&self, value: u16) -> Result<EncryptedValue>;
    async fn encrypt32(&self, value: u32) -> Result<EncryptedValue>;
    async fn encrypt64(&self, value: u64) -> Result<EncryptedValue>;
    async fn encrypt128(&self, value: u128) -> Result<EncryptedValue>;
    async fn encrypt256(&self, value: U256) -> Result<EncryptedValue>;

    /// Network FHE public key.
    async fn public_key(&self) -> Result<String>;

    /// Ephemeral keypair used to authorize a reencryption.
    fn generate_keypair(&self) -> ReencryptionKeyPair;

    async fn reencrypt(&self, request: ReencryptRequest<'_>) -> Result<DecryptedValue>;

    /// Decrypts a value the contract has marked publicly decryptable.
    async fn public_decrypt(&self, handle: &EncryptedHandle) -> Result<DecryptedValue>;
}

/// Parameters handed to the instance factory when a client is built.
#[derive(Debug, Clone, Default)]
pub struct InstanceParams {
    pub chain_id: u64,
    pub contract_address: String,
    pub acl_address: Option<String>,
    pub kms_verifier_address: Option<String>,
    pub gateway_url: Option<String>,
}

#[async_trait]
pub trait InstanceFactory: Send + Sync {
    async fn create(&self, params: &InstanceParams) -> Result<Arc<dyn FheInstance>>;
}

/// Gateway-backed when a gateway URL is configured, simulated otherwise.
#[derive(Debug, Default, Clone)]
pub struct DefaultInstanceFactory {
    pub gateway_timeout: Option<std::time::Duration>,
}

#[async_trait]
impl InstanceFactory for DefaultInstanceFactory {
    async fn create(&self, params: &InstanceParams) -> Result<Arc<dyn FheInstance>> {
        match &params.gateway_url {
            Some(url) => {
                let timeout = self
                    .gateway_timeout
                    .unwrap_or(std::time::Duration::from_secs(30));
                let instance = GatewayInstance::new(url, params.chain_id, timeout)?;
                Ok(Arc::new(instance))
            }
            None => {
                tracing::warn!(
                    chain_id = params.chain_id,
                    "no gateway configured, using the simulated FHE instance (not secure)"
                );
                Ok(Arc::new(SimulatedInstance::new()))
            }
        }
    }
}

pub(crate) fn random_keypair() -> ReencryptionKeyPair {
    let mut rng = rand::thread_rng();
    let mut private_key = [0u8; 32];
    let mut public_key = [0u8; 32];
    rng.fill_bytes(&mut private_key);
    rng.fill_bytes(&mut public_key);
    ReencryptionKeyPair {
        public_key: crate::util::to_hex_string(&public_key),
        private_key: crate::util::to_hex_string(&private_key),
    }
}
