//! Server-side FHE service.
//!
//! Owns the client registry for the API process and lazily creates the server client from the
//! configured `ClientConfig` on first use. Handlers go through this type instead of touching the
//! registry directly.

use crate::domain::client::{ClientConfig, ClientRegistry, FhevmClient};
use crate::domain::compute::{ComputationService, Operation};
use crate::domain::types::{DecryptedValue, EncryptedHandle, EncryptedValue, PlainValue};
use crate::domain::{decryption, encryption};
use crate::error::Result;
use std::sync::Arc;

pub struct FheService {
    registry: ClientRegistry,
    config: ClientConfig,
    computation: Arc<dyn ComputationService>,
}

impl FheService {
    pub fn new(
        registry: ClientRegistry,
        config: ClientConfig,
        computation: Arc<dyn ComputationService>,
    ) -> Self {
        Self {
            registry,
            config,
            computation,
        }
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// Get or create the server client.
    pub async fn client(&self) -> Result<Arc<FhevmClient>> {
        self.registry.initialize(self.config.clone()).await
    }

    pub async fn encrypt(&self, value: PlainValue, bits: u32) -> Result<EncryptedValue> {
        let client = self.client().await?;
        encryption::encrypt(&client, value, bits).await
    }

    pub async fn public_decrypt(&self, handle: &EncryptedHandle) -> Result<DecryptedValue> {
        let client = self.client().await?;
        decryption::public_decrypt(&client, handle).await
    }

    pub async fn compute(&self, operation: Operation, operands: &[String], bits: u32) -> Result<String> {
        self.computation.compute(operation, operands, bits).await
    }
}
