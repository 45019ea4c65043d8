//! FHEVM client: the resolved configuration plus the wrapped FHE instance.

pub mod network;
pub mod registry;

pub use network::Network;
pub use registry::ClientRegistry;

use crate::domain::types::ReencryptionKeyPair;
use crate::error::{Error, Result};
use crate::infra::instance::{FheInstance, InstanceFactory, InstanceParams};
use crate::infra::rpc::TypedDataSigner;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Client configuration. Immutable once a client has been built from it.
#[derive(Clone, Default)]
pub struct ClientConfig {
    pub network: Network,
    pub contract_address: String,
    pub rpc_url: Option<String>,
    pub chain_id: Option<u64>,
    /// Signing provider used for EIP-712 decryption authorization.
    pub provider: Option<Arc<dyn TypedDataSigner>>,
    pub acl_address: Option<String>,
    pub kms_verifier_address: Option<String>,
    pub gateway_url: Option<String>,
}

impl ClientConfig {
    pub fn new(network: Network, contract_address: impl Into<String>) -> Self {
        Self {
            network,
            contract_address: contract_address.into(),
            ..Default::default()
        }
    }

    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.rpc_url = Some(url.into());
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn TypedDataSigner>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = Some(url.into());
        self
    }

    pub fn with_acl_address(mut self, address: impl Into<String>) -> Self {
        self.acl_address = Some(address.into());
        self
    }

    pub fn with_kms_verifier_address(mut self, address: impl Into<String>) -> Self {
        self.kms_verifier_address = Some(address.into());
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("network", &self.network)
            .field("contract_address", &self.contract_address)
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .field("provider", &self.provider.is_some())
            .field("acl_address", &self.acl_address)
            .field("kms_verifier_address", &self.kms_verifier_address)
            .field("gateway_url", &self.gateway_url)
            .finish()
    }
}

pub struct FhevmClient {
    config: ClientConfig,
    chain_id: u64,
    rpc_url: String,
    instance: Arc<dyn FheInstance>,
}

impl FhevmClient {
    /// Resolves network defaults and creates the FHE instance.
    pub async fn create(config: ClientConfig, factory: &dyn InstanceFactory) -> Result<Self> {
        let chain_id = config
            .chain_id
            .unwrap_or_else(|| config.network.default_chain_id());
        let rpc_url = match (&config.rpc_url, config.network.default_rpc_url()) {
            (Some(url), _) => url.clone(),
            (None, Some(default)) => default.to_string(),
            (None, None) => {
                return Err(Error::Initialization("Custom network requires rpcUrl".to_string()))
            }
        };
        if !crate::util::is_valid_address(&config.contract_address) {
            return Err(Error::Initialization(format!(
                "invalid contract address {:?}",
                config.contract_address
            )));
        }

        let params = InstanceParams {
            chain_id,
            contract_address: config.contract_address.clone(),
            acl_address: config.acl_address.clone(),
            kms_verifier_address: config.kms_verifier_address.clone(),
            gateway_url: config.gateway_url.clone(),
        };
        let instance = factory.create(&params).await.map_err(|e| match e {
            Error::Initialization(_) => e,
            other => Error::Initialization(other.to_string()),
        })?;

        info!(network = %config.network, chain_id, %rpc_url, "FHEVM client created");
        Ok(Self {
            config,
            chain_id,
            rpc_url,
            instance,
        })
    }

    /// Wraps an existing instance without going through a factory.
    pub fn with_instance(config: ClientConfig, instance: Arc<dyn FheInstance>) -> Self {
        let chain_id = config
            .chain_id
            .unwrap_or_else(|| config.network.default_chain_id());
        let rpc_url = config
            .rpc_url
            .clone()
            .or_else(|| config.network.default_rpc_url().map(str::to_string))
            .unwrap_or_default();
        Self {
            config,
            chain_id,
            rpc_url,
            instance,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn network(&self) -> Network {
        self.config.network
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    pub fn contract_address(&self) -> &str {
        &self.config.contract_address
    }

    pub fn provider(&self) -> Option<&Arc<dyn TypedDataSigner>> {
        self.config.provider.as_ref()
    }

    pub fn instance(&self) -> &dyn FheInstance {
        self.instance.as_ref()
    }

    pub async fn public_key(&self) -> Result<String> {
        self.instance.public_key().await
    }

    pub fn generate_reencryption_keypair(&self) -> ReencryptionKeyPair {
        self.instance.generate_keypair()
    }
}

impl fmt::Debug for FhevmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FhevmClient")
            .field("network", &self.config.network)
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url)
            .field("contract_address", &self.config.contract_address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::instance::DefaultInstanceFactory;

    const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    #[tokio::test]
    async fn network_defaults_are_resolved() {
        let client = FhevmClient::create(
            ClientConfig::new(Network::Sepolia, CONTRACT),
            &DefaultInstanceFactory::default(),
        )
        .await
        .unwrap();
        assert_eq!(client.chain_id(), 11_155_111);
        assert_eq!(client.rpc_url(), "https://rpc.sepolia.org");
    }

    #[tokio::test]
    async fn explicit_values_override_defaults() {
        let config = ClientConfig::new(Network::Localhost, CONTRACT)
            .with_chain_id(1337)
            .with_rpc_url("http://node:8545");
        let client = FhevmClient::create(config, &DefaultInstanceFactory::default())
            .await
            .unwrap();
        assert_eq!(client.chain_id(), 1337);
        assert_eq!(client.rpc_url(), "http://node:8545");
    }

    #[tokio::test]
    async fn custom_network_requires_rpc_url() {
        let err = FhevmClient::create(
            ClientConfig::new(Network::Custom, CONTRACT),
            &DefaultInstanceFactory::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Initialization(ref m) if m.contains("rpcUrl")));
    }

    #[tokio::test]
    async fn malformed_contract_address_fails_initialization() {
        let err = FhevmClient::create(
            ClientConfig::new(Network::Sepolia, "0x1234"),
            &DefaultInstanceFactory::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Initialization(_)));
    }
}
