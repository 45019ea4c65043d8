//! Decrypt facade.
//!
//! `decrypt` is the authorized path: the user signs an EIP-712 `Reencrypt` request (or supplies
//! a signature) and the gateway reencrypts the handle for them. `public_decrypt` skips
//! authorization and only works for values the contract marked publicly decryptable.

use crate::crypto::eip712::reencrypt_typed_data;
use crate::domain::client::FhevmClient;
use crate::domain::types::{DecryptOptions, DecryptResult, DecryptedValue, EncryptedHandle};
use crate::error::{Error, Result};
use crate::infra::instance::ReencryptRequest;
use crate::util::ensure_address;
use futures_util::future::try_join_all;
use tracing::debug;

pub async fn decrypt(
    client: &FhevmClient,
    handle: &EncryptedHandle,
    options: &DecryptOptions,
) -> Result<DecryptResult> {
    ensure_address(&options.user_address)?;
    ensure_address(&options.contract_address)?;

    let signature = match &options.signature {
        Some(sig) => sig.clone(),
        None => {
            generate_decrypt_signature(client, handle, &options.user_address, &options.contract_address)
                .await?
        }
    };

    let value = client
        .instance()
        .reencrypt(ReencryptRequest {
            handle,
            user_address: &options.user_address,
            contract_address: &options.contract_address,
            signature: &signature,
        })
        .await?;
    debug!(handle = %crate::util::format_handle(handle.as_str()), "handle decrypted");

    Ok(DecryptResult {
        value,
        handle: handle.clone(),
        bits: handle.bits(),
    })
}

/// Asks the configured provider to sign the `Reencrypt` typed data for `user_address`.
pub async fn generate_decrypt_signature(
    client: &FhevmClient,
    handle: &EncryptedHandle,
    user_address: &str,
    contract_address: &str,
) -> Result<String> {
    let provider = client.provider().ok_or(Error::ProviderRequired)?;
    let keypair = client.generate_reencryption_keypair();
    let typed_data = reencrypt_typed_data(
        client.chain_id(),
        contract_address,
        &keypair.public_key,
        handle.as_str(),
    );
    provider.sign_typed_data(user_address, &typed_data).await
}

pub async fn public_decrypt(client: &FhevmClient, handle: &EncryptedHandle) -> Result<DecryptedValue> {
    client.instance().public_decrypt(handle).await
}

/// Decrypts every handle concurrently; the first failure fails the whole batch.
pub async fn decrypt_batch(
    client: &FhevmClient,
    handles: &[EncryptedHandle],
    options: &DecryptOptions,
) -> Result<Vec<DecryptResult>> {
    try_join_all(handles.iter().map(|h| decrypt(client, h, options))).await
}
