//! Centralized configuration (environment variables + defaults).

use crate::domain::client::{ClientConfig, Network};
use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match optional(name) {
        Some(v) => v
            .parse::<T>()
            .map_err(|_| Error::Config(format!("{} has an invalid value: {:?}", name, v))),
        None => Ok(default),
    }
}

/// Target network (default: sepolia).
pub fn network() -> Result<Network> {
    match optional("FHEVM_NETWORK") {
        Some(v) => v.parse(),
        None => Ok(Network::default()),
    }
}

/// Contract the server-side client talks to (required).
pub fn contract_address() -> Result<String> {
    optional("FHEVM_CONTRACT_ADDRESS")
        .ok_or_else(|| Error::Config("Contract address not configured (FHEVM_CONTRACT_ADDRESS)".to_string()))
}

pub fn rpc_url() -> Option<String> {
    optional("FHEVM_RPC_URL")
}

pub fn chain_id() -> Result<Option<u64>> {
    optional("FHEVM_CHAIN_ID")
        .map(|v| {
            v.parse::<u64>()
                .map_err(|_| Error::Config(format!("FHEVM_CHAIN_ID must be a valid u64: {:?}", v)))
        })
        .transpose()
}

pub fn gateway_url() -> Option<String> {
    optional("FHEVM_GATEWAY_URL")
}

/// Address the API server binds to (default: 0.0.0.0:3000).
pub fn bind_addr() -> String {
    optional("API_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string())
}

/// JSON file backing the key cache (default: fhe_keys.json).
pub fn key_store_path() -> PathBuf {
    optional("FHE_KEY_STORE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("fhe_keys.json"))
}

pub fn rpc_timeout() -> Result<Duration> {
    Ok(Duration::from_secs(parsed("RPC_TIMEOUT_SECS", 30u64)?.max(1)))
}

/// Compute endpoint limit: requests per window per client (default: 20 per 60s).
pub fn compute_rate_limit() -> Result<(usize, Duration)> {
    let max = parsed("COMPUTE_RATE_LIMIT", 20usize)?.max(1);
    let window = parsed("COMPUTE_RATE_WINDOW_SECS", 60u64)?.max(1);
    Ok((max, Duration::from_secs(window)))
}

/// Client configuration assembled from the `FHEVM_*` variables. No signing provider is set.
pub fn client_config() -> Result<ClientConfig> {
    let mut config = ClientConfig::new(network()?, contract_address()?);
    config.rpc_url = rpc_url();
    config.chain_id = chain_id()?;
    config.gateway_url = gateway_url();
    config.acl_address = optional("FHEVM_ACL_ADDRESS");
    config.kms_verifier_address = optional("FHEVM_KMS_VERIFIER_ADDRESS");
    Ok(config)
}
