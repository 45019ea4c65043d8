//! Holds at most one live `FhevmClient`.
//!
//! Lifecycle: uninitialized -> ready -> (reset) -> uninitialized. The registry is an explicit
//! handle owned by the caller; concurrent `initialize` calls are serialized so only one
//! instance is ever created.

use crate::domain::client::{ClientConfig, FhevmClient};
use crate::error::{Error, Result};
use crate::infra::instance::{DefaultInstanceFactory, InstanceFactory};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

pub struct ClientRegistry {
    factory: Arc<dyn InstanceFactory>,
    slot: RwLock<Option<Arc<FhevmClient>>>,
    /// Serializes creation and reset.
    init_lock: Mutex<()>,
}

impl ClientRegistry {
    pub fn new(factory: Arc<dyn InstanceFactory>) -> Self {
        Self {
            factory,
            slot: RwLock::new(None),
            init_lock: Mutex::new(()),
        }
    }

    /// Returns the cached client if one exists; otherwise creates it from `config`.
    ///
    /// Once initialized, later configs are ignored until `reset`.
    pub async fn initialize(&self, config: ClientConfig) -> Result<Arc<FhevmClient>> {
        if let Some(client) = self.slot.read().await.as_ref() {
            return Ok(client.clone());
        }

        let _guard = self.init_lock.lock().await;
        // Another caller may have finished while we waited.
        if let Some(client) = self.slot.read().await.as_ref() {
            debug!("client initialized concurrently, reusing it");
            return Ok(client.clone());
        }

        let client = Arc::new(FhevmClient::create(config, self.factory.as_ref()).await?);
        *self.slot.write().await = Some(client.clone());
        info!(network = %client.network(), "client registry ready");
        Ok(client)
    }

    pub async fn get(&self) -> Result<Arc<FhevmClient>> {
        self.slot
            .read()
            .await
            .as_ref()
            .cloned()
            .ok_or(Error::NotInitialized)
    }

    /// Drops the cached client. Remote state is untouched.
    pub async fn reset(&self) {
        let _guard = self.init_lock.lock().await;
        if self.slot.write().await.take().is_some() {
            info!("client registry reset");
        }
    }

    pub async fn is_ready(&self) -> bool {
        self.slot.read().await.is_some()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new(Arc::new(DefaultInstanceFactory::default()))
    }
}
