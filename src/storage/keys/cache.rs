//! Display-only public key cache with a fixed validity window.
//!
//! The cached identifier is not key material: no private key is ever produced or stored here,
//! and validity is a pure time-window check.

use crate::error::{Error, Result};
use crate::infra::clock::{Clock, SystemClock};
use crate::storage::keys::store::KeyValueStore;
use rand::Rng;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

pub const PUBLIC_KEY_ENTRY: &str = "fhe_public_key";
pub const TIMESTAMP_ENTRY: &str = "fhe_key_timestamp";

/// 24 hours.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPair {
    pub public_key: String,
    /// Unix millis.
    pub generated: i64,
}

pub struct KeyCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    max_age: Duration,
    /// Serializes read-then-write sequences against the store.
    op_lock: Mutex<()>,
}

impl KeyCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            max_age: DEFAULT_MAX_AGE,
            op_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.op_lock
            .lock()
            .map_err(|_| Error::Storage("key cache lock poisoned".to_string()))
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Fresh `pk_<millis>_<base36>` identifier; not persisted.
    pub fn generate_key_pair(&self) -> KeyPair {
        let generated = self.clock.now_millis();
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        KeyPair {
            public_key: format!("pk_{}_{}", generated, suffix),
            generated,
        }
    }

    pub fn store_public_key(&self, public_key: &str) -> Result<()> {
        let _guard = self.lock()?;
        self.write_public_key(public_key)
    }

    fn write_public_key(&self, public_key: &str) -> Result<()> {
        self.store.set(PUBLIC_KEY_ENTRY, public_key)?;
        self.store
            .set(TIMESTAMP_ENTRY, &self.clock.now_millis().to_string())
    }

    pub fn stored_public_key(&self) -> Result<Option<String>> {
        self.store.get(PUBLIC_KEY_ENTRY)
    }

    fn stored_timestamp(&self) -> Result<Option<i64>> {
        Ok(self
            .store
            .get(TIMESTAMP_ENTRY)?
            .and_then(|ts| ts.trim().parse::<i64>().ok()))
    }

    /// True when a stored timestamp exists and is younger than `max_age`.
    pub fn is_key_valid(&self, max_age: Duration) -> Result<bool> {
        let Some(ts) = self.stored_timestamp()? else {
            return Ok(false);
        };
        let age = self.clock.now_millis() - ts;
        Ok(age < max_age.as_millis() as i64)
    }

    pub fn get_or_generate_key(&self) -> Result<KeyPair> {
        let _guard = self.lock()?;
        if let Some(public_key) = self.stored_public_key()? {
            if self.is_key_valid(self.max_age)? {
                let generated = self
                    .stored_timestamp()?
                    .unwrap_or_else(|| self.clock.now_millis());
                debug!(%public_key, "reusing cached public key");
                return Ok(KeyPair {
                    public_key,
                    generated,
                });
            }
        }

        let pair = self.generate_key_pair();
        self.write_public_key(&pair.public_key)?;
        info!(public_key = %pair.public_key, "generated new display public key");
        Ok(pair)
    }

    pub fn clear_stored_keys(&self) -> Result<()> {
        let _guard = self.lock()?;
        self.store.remove(PUBLIC_KEY_ENTRY)?;
        self.store.remove(TIMESTAMP_ENTRY)
    }
}
