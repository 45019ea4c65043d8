// Builds the EIP-712 typed data that authorizes a reencryption request.

use serde_json::{json, Value as JsonValue};

pub const DOMAIN_NAME: &str = "Authorization token";
pub const DOMAIN_VERSION: &str = "1";
pub const PRIMARY_TYPE: &str = "Reencrypt";

/// Typed data in the shape `eth_signTypedData_v4` expects.
pub fn reencrypt_typed_data(
    chain_id: u64,
    verifying_contract: &str,
    public_key: &str,
    ciphertext: &str,
) -> JsonValue {
    json!({
        "types": {
            "EIP712Domain": [
                { "name": "name", "type": "string" },
                { "name": "version", "type": "string" },
                { "name": "chainId", "type": "uint256" },
                { "name": "verifyingContract", "type": "address" }
            ],
            "Reencrypt": [
                { "name": "publicKey", "type": "bytes" },
                { "name": "ciphertext", "type": "bytes" }
            ]
        },
        "primaryType": PRIMARY_TYPE,
        "domain": {
            "name": DOMAIN_NAME,
            "version": DOMAIN_VERSION,
            "chainId": chain_id,
            "verifyingContract": verifying_contract
        },
        "message": {
            "publicKey": public_key,
            "ciphertext": ciphertext
        }
    })
}
