//! End-to-end SDK flow against the simulated instance: registry lifecycle, encryption ranges,
//! authorized decryption and the display key cache.

use fhevm_sdk::infra::clock::ManualClock;
use fhevm_sdk::infra::rpc::TypedDataSigner;
use fhevm_sdk::{
    decrypt, encrypt, encrypt_batch, BitWidth, ClientConfig, ClientRegistry, DecryptOptions,
    DecryptedValue, DefaultInstanceFactory, EncryptedHandle, Error, FileStore, KeyCache, Network,
};
use primitive_types::U256;
use serde_json::Value;
use std::sync::Arc;

const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
const USER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

struct StaticSigner;

#[async_trait::async_trait]
impl TypedDataSigner for StaticSigner {
    async fn sign_typed_data(&self, _address: &str, typed_data: &Value) -> fhevm_sdk::Result<String> {
        assert_eq!(typed_data["primaryType"], "Reencrypt");
        Ok(format!("0x{}", "ab".repeat(65)))
    }
}

fn registry() -> ClientRegistry {
    ClientRegistry::new(Arc::new(DefaultInstanceFactory::default()))
}

#[tokio::test]
async fn registry_lifecycle() -> anyhow::Result<()> {
    let registry = registry();
    assert!(matches!(registry.get().await, Err(Error::NotInitialized)));

    let first = registry
        .initialize(ClientConfig::new(Network::Localhost, CONTRACT))
        .await?;
    let second = registry
        .initialize(ClientConfig::new(Network::Sepolia, CONTRACT))
        .await?;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.chain_id(), 31_337);
    assert!(Arc::ptr_eq(&first, &registry.get().await?));

    registry.reset().await;
    assert!(!registry.is_ready().await);

    let custom = registry
        .initialize(ClientConfig::new(Network::Custom, CONTRACT))
        .await;
    assert!(matches!(custom, Err(Error::Initialization(_))));
    Ok(())
}

#[tokio::test]
async fn encryption_respects_width_bounds() -> anyhow::Result<()> {
    let client = registry()
        .initialize(ClientConfig::new(Network::Localhost, CONTRACT))
        .await?;

    for width in BitWidth::ALL {
        let max = width.max_value();
        encrypt(&client, max, width.bits()).await?;
        if width != BitWidth::W256 {
            let err = encrypt(&client, max + U256::one(), width.bits()).await;
            assert!(matches!(err, Err(Error::Range { .. })), "{}", width);
        }
    }
    assert!(matches!(
        encrypt(&client, 1u32, 24).await,
        Err(Error::UnsupportedWidth(24))
    ));

    let batch = encrypt_batch(&client, &[5u64, 999_999_999_999], 32).await;
    assert!(matches!(batch, Err(Error::Range { .. })));
    assert_eq!(encrypt_batch(&client, &[1u64, 2, 3], 16).await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn authorized_decrypt_round_trip() -> anyhow::Result<()> {
    let registry = registry();
    let client = registry
        .initialize(
            ClientConfig::new(Network::Localhost, CONTRACT).with_provider(Arc::new(StaticSigner)),
        )
        .await?;

    let encrypted = encrypt(&client, true, 8).await?;
    let handle = EncryptedHandle::new(encrypted.to_hex(), BitWidth::W8)?;
    let options = DecryptOptions {
        user_address: USER.to_string(),
        contract_address: CONTRACT.to_string(),
        signature: None,
    };
    let result = decrypt(&client, &handle, &options).await?;
    assert_eq!(result.value, DecryptedValue::Uint(U256::one()));
    assert_eq!(result.bits, BitWidth::W8);

    // Without a provider a signature must be supplied.
    registry.reset().await;
    let bare = registry
        .initialize(ClientConfig::new(Network::Localhost, CONTRACT))
        .await?;
    let encrypted = encrypt(&bare, 7u8, 8).await?;
    let handle = EncryptedHandle::new(encrypted.to_hex(), BitWidth::W8)?;
    assert!(matches!(
        decrypt(&bare, &handle, &options).await,
        Err(Error::ProviderRequired)
    ));
    let signed = DecryptOptions {
        signature: Some("0x1234".to_string()),
        ..options
    };
    assert_eq!(
        decrypt(&bare, &handle, &signed).await?.value,
        DecryptedValue::Uint(U256::from(7u8))
    );
    Ok(())
}

#[test]
fn key_cache_persists_across_instances() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("fhe_keys.json");
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));

    let first = KeyCache::with_clock(Arc::new(FileStore::new(&path)), clock.clone())
        .get_or_generate_key()?;
    let reopened = KeyCache::with_clock(Arc::new(FileStore::new(&path)), clock.clone());
    assert_eq!(reopened.get_or_generate_key()?, first);

    clock.advance(24 * 60 * 60 * 1000 + 1);
    assert_ne!(reopened.get_or_generate_key()?.public_key, first.public_key);
    Ok(())
}

#[test]
fn key_cache_recovers_from_truncated_store() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("fhe_keys.json");
    std::fs::write(&path, r#"{"entries": {"fhe_pub"#)?;
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));

    let cache = KeyCache::with_clock(Arc::new(FileStore::new(&path)), clock);
    cache.clear_stored_keys()?;
    let pair = cache.get_or_generate_key()?;
    assert_eq!(cache.stored_public_key()?, Some(pair.public_key));
    Ok(())
}
