//! Encrypt facade: validate the plaintext against its width, then make exactly one call into
//! the instance's width-specific encrypt. Failures surface immediately; nothing is retried.

use crate::domain::client::FhevmClient;
use crate::domain::types::{BitWidth, EncryptedValue, PlainValue};
use crate::error::Result;
use futures_util::future::try_join_all;
use primitive_types::U256;
use tracing::debug;

/// Width used when callers do not pick one.
pub const DEFAULT_BITS: u32 = 32;

pub async fn encrypt(
    client: &FhevmClient,
    value: impl Into<PlainValue>,
    bits: u32,
) -> Result<EncryptedValue> {
    let width = BitWidth::from_bits(bits)?;
    let value = value.into().to_uint(width)?;
    debug!(bits, "encrypting value");
    encrypt_checked(client, value, width).await
}

/// `value` has already been checked against `width`, so the narrowing casts cannot truncate.
async fn encrypt_checked(client: &FhevmClient, value: U256, width: BitWidth) -> Result<EncryptedValue> {
    let instance = client.instance();
    match width {
        BitWidth::W8 => instance.encrypt8(value.low_u32() as u8).await,
        BitWidth::W16 => instance.encrypt16(value.low_u32() as u16).await,
        BitWidth::W32 => instance.encrypt32(value.low_u32()).await,
        BitWidth::W64 => instance.encrypt64(value.low_u64()).await,
        BitWidth::W128 => instance.encrypt128(value.as_u128()).await,
        BitWidth::W256 => instance.encrypt256(value).await,
    }
}

pub async fn encrypt8(client: &FhevmClient, value: u8) -> Result<EncryptedValue> {
    encrypt(client, value, 8).await
}

pub async fn encrypt16(client: &FhevmClient, value: u16) -> Result<EncryptedValue> {
    encrypt(client, value, 16).await
}

pub async fn encrypt32(client: &FhevmClient, value: u32) -> Result<EncryptedValue> {
    encrypt(client, value, 32).await
}

pub async fn encrypt64(client: &FhevmClient, value: u64) -> Result<EncryptedValue> {
    encrypt(client, value, 64).await
}

pub async fn encrypt128(client: &FhevmClient, value: u128) -> Result<EncryptedValue> {
    encrypt(client, value, 128).await
}

pub async fn encrypt256(client: &FhevmClient, value: U256) -> Result<EncryptedValue> {
    encrypt(client, value, 256).await
}

/// Booleans are encrypted as 8-bit 0/1.
pub async fn encrypt_bool(client: &FhevmClient, value: bool) -> Result<EncryptedValue> {
    encrypt(client, value, 8).await
}

/// Encrypts every element concurrently; the first failure fails the whole batch.
///
/// Results come back in input order.
pub async fn encrypt_batch<V>(client: &FhevmClient, values: &[V], bits: u32) -> Result<Vec<EncryptedValue>>
where
    V: Into<PlainValue> + Copy,
{
    try_join_all(values.iter().map(|v| encrypt(client, *v, bits))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::client::{ClientConfig, Network};
    use crate::error::Error;
    use crate::infra::instance::SimulatedInstance;
    use std::sync::Arc;

    fn client() -> (FhevmClient, Arc<SimulatedInstance>) {
        let instance = Arc::new(SimulatedInstance::new());
        let client = FhevmClient::with_instance(
            ClientConfig::new(Network::Localhost, "0x5FbDB2315678afecb367f032d93F642f64180aa3"),
            instance.clone(),
        );
        (client, instance)
    }

    #[tokio::test]
    async fn bounds_are_accepted_for_every_width() {
        let (client, instance) = client();
        for width in BitWidth::ALL {
            for value in [U256::zero(), U256::one(), width.max_value()] {
                let ct = encrypt(&client, value, width.bits()).await.unwrap();
                let (opened, opened_width) = instance.open(ct.as_bytes()).unwrap();
                assert_eq!(opened, value);
                assert_eq!(opened_width, width);
            }
        }
    }

    #[tokio::test]
    async fn one_past_max_is_a_range_error() {
        let (client, _) = client();
        for width in BitWidth::ALL.into_iter().filter(|w| *w != BitWidth::W256) {
            let too_big = width.max_value() + U256::one();
            let err = encrypt(&client, too_big, width.bits()).await.unwrap_err();
            assert!(
                matches!(err, Error::Range { bits, .. } if bits == width.bits()),
                "width {} accepted {}",
                width,
                too_big
            );
        }
        assert!(matches!(
            encrypt(&client, -1i64, 256).await,
            Err(Error::Range { .. })
        ));
    }

    #[tokio::test]
    async fn unsupported_width_is_rejected() {
        let (client, _) = client();
        assert!(matches!(
            encrypt(&client, 1u8, 24).await,
            Err(Error::UnsupportedWidth(24))
        ));
    }

    #[tokio::test]
    async fn booleans_encrypt_like_zero_and_one() {
        let (client, instance) = client();
        let t = encrypt(&client, true, 8).await.unwrap();
        let one = encrypt(&client, 1u8, 8).await.unwrap();
        assert_eq!(instance.open(t.as_bytes()).unwrap(), instance.open(one.as_bytes()).unwrap());

        let f = encrypt_bool(&client, false).await.unwrap();
        let zero = encrypt8(&client, 0).await.unwrap();
        assert_eq!(instance.open(f.as_bytes()).unwrap(), instance.open(zero.as_bytes()).unwrap());
    }

    #[tokio::test]
    async fn batch_fails_as_a_whole() {
        let (client, _) = client();
        let err = encrypt_batch(&client, &[5u64, 999_999_999_999], 32)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Range { bits: 32, .. }));
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let (client, instance) = client();
        let out = encrypt_batch(&client, &[100u32, 200, 300], DEFAULT_BITS)
            .await
            .unwrap();
        let opened: Vec<U256> = out
            .iter()
            .map(|ct| instance.open(ct.as_bytes()).unwrap().0)
            .collect();
        assert_eq!(opened, vec![U256::from(100u32), U256::from(200u32), U256::from(300u32)]);
    }
}
