//! Local stand-in for the FHE library.
//!
//! Plaintexts are masked with a SHA-256 keystream derived from an instance secret and a random
//! nonce. This gives opaque, non-deterministic ciphertexts that the same instance can open again,
//! which is enough for development networks and tests. It is NOT encryption.
//!
//! Ciphertext layout: `[MAGIC][width][nonce: 16][masked value: 32]`. A handle produced by this
//! instance is the `0x`-hex of the ciphertext.

use crate::domain::types::{BitWidth, DecryptedValue, EncryptedHandle, EncryptedValue, ReencryptionKeyPair};
use crate::error::{Error, Result};
use crate::infra::instance::{random_keypair, FheInstance, ReencryptRequest};
use async_trait::async_trait;
use primitive_types::U256;
use rand::RngCore;
use sha2::{Digest, Sha256};

const MAGIC: u8 = 0xfe;
const NONCE_LEN: usize = 16;
const CIPHERTEXT_LEN: usize = 2 + NONCE_LEN + 32;
const KEYSTREAM_DOMAIN: &[u8] = b"FHEVM-SIM-KEYSTREAM";
const PUBKEY_DOMAIN: &[u8] = b"FHEVM-SIM-PUBKEY";

pub struct SimulatedInstance {
    secret: [u8; 32],
}

impl SimulatedInstance {
    pub fn new() -> Self {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self { secret }
    }

    /// Deterministic secret, so separate instances can open each other's ciphertexts.
    pub fn from_seed(seed: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        Self {
            secret: hasher.finalize().into(),
        }
    }

    fn keystream(&self, nonce: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(KEYSTREAM_DOMAIN);
        hasher.update(self.secret);
        hasher.update(nonce);
        hasher.finalize().into()
    }

    fn seal(&self, value: U256, width: BitWidth) -> EncryptedValue {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let mut plain = [0u8; 32];
        value.to_big_endian(&mut plain);
        let stream = self.keystream(&nonce);

        let mut out = Vec::with_capacity(CIPHERTEXT_LEN);
        out.push(MAGIC);
        out.push((width.bits() / 8) as u8);
        out.extend_from_slice(&nonce);
        out.extend(plain.iter().zip(stream.iter()).map(|(p, k)| p ^ k));
        EncryptedValue(out)
    }

    /// Opens a ciphertext produced by this instance.
    pub fn open(&self, ciphertext: &[u8]) -> Result<(U256, BitWidth)> {
        if ciphertext.len() != CIPHERTEXT_LEN || ciphertext[0] != MAGIC {
            return Err(Error::Instance("ciphertext was not produced by this instance".to_string()));
        }
        let width = BitWidth::from_bits(ciphertext[1] as u32 * 8)
            .map_err(|e| Error::Instance(e.to_string()))?;
        let nonce = &ciphertext[2..2 + NONCE_LEN];
        let stream = self.keystream(nonce);
        let plain: Vec<u8> = ciphertext[2 + NONCE_LEN..]
            .iter()
            .zip(stream.iter())
            .map(|(c, k)| c ^ k)
            .collect();
        let value = U256::from_big_endian(&plain);
        if value > width.max_value() {
            return Err(Error::Instance("ciphertext integrity check failed".to_string()));
        }
        Ok((value, width))
    }

    fn open_handle(&self, handle: &EncryptedHandle) -> Result<DecryptedValue> {
        let bytes = crate::util::from_hex_string(handle.as_str())
            .map_err(|_| Error::InvalidHandle(format!("not a hex handle: {}", handle)))?;
        let (value, _) = self.open(&bytes)?;
        Ok(DecryptedValue::Uint(value))
    }
}

impl Default for SimulatedInstance {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FheInstance for SimulatedInstance {
    async fn encrypt8(&self, value: u8) -> Result<EncryptedValue> {
        Ok(self.seal(U256::from(value), BitWidth::W8))
    }

    async fn encrypt16(&self, value: u16) -> Result<EncryptedValue> {
        Ok(self.seal(U256::from(value), BitWidth::W16))
    }

    async fn encrypt32(&self, value: u32) -> Result<EncryptedValue> {
        Ok(self.seal(U256::from(value), BitWidth::W32))
    }

    async fn encrypt64(&self, value: u64) -> Result<EncryptedValue> {
        Ok(self.seal(U256::from(value), BitWidth::W64))
    }

    async fn encrypt128(&self, value: u128) -> Result<EncryptedValue> {
        Ok(self.seal(U256::from(value), BitWidth::W128))
    }

    async fn encrypt256(&self, value: U256) -> Result<EncryptedValue> {
        Ok(self.seal(value, BitWidth::W256))
    }

    async fn public_key(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(PUBKEY_DOMAIN);
        hasher.update(self.secret);
        Ok(crate::util::to_hex_string(&hasher.finalize()))
    }

    fn generate_keypair(&self) -> ReencryptionKeyPair {
        random_keypair()
    }

    async fn reencrypt(&self, request: ReencryptRequest<'_>) -> Result<DecryptedValue> {
        if request.signature.trim().is_empty() {
            return Err(Error::Instance("reencryption requires a signature".to_string()));
        }
        self.open_handle(request.handle)
    }

    async fn public_decrypt(&self, handle: &EncryptedHandle) -> Result<DecryptedValue> {
        self.open_handle(handle)
    }
}
