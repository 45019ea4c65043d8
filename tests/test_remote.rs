//! Gateway-backed instance and JSON-RPC client against in-process mock servers.

use axum::routing::{get, post};
use axum::{Json, Router};
use fhevm_sdk::infra::contract::{EnergyMarket, EnergyType};
use fhevm_sdk::infra::rpc::JsonRpcClient;
use fhevm_sdk::{
    encrypt, public_decrypt, BitWidth, ClientConfig, ClientRegistry, DecryptedValue,
    DefaultInstanceFactory, EncryptedHandle, Error, Network,
};
use primitive_types::U256;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
const ACCOUNT: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

async fn serve(router: Router) -> Result<String, std::io::Error> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Ok(format!("http://{}", addr))
}

/// Echoes the plaintext back as the "ciphertext" so decryption can be checked end to end.
fn mock_gateway() -> Router {
    Router::new()
        .route(
            "/v1/encrypt",
            post(|Json(body): Json<Value>| async move {
                let value = body["value"].as_str().unwrap_or("0").to_string();
                let bits = body["bits"].as_u64().unwrap_or(0);
                let ciphertext = format!("0x{:02x}{}", bits, hex::encode(value.as_bytes()));
                Json(json!({ "ciphertext": ciphertext }))
            }),
        )
        .route(
            "/v1/public-key",
            get(|| async { Json(json!({ "publicKey": "0xfeed" })) }),
        )
        .route(
            "/v1/public-decrypt",
            post(|Json(body): Json<Value>| async move {
                let handle = body["handle"].as_str().unwrap_or_default();
                let raw = hex::decode(handle.trim_start_matches("0x")).unwrap_or_default();
                let value = String::from_utf8(raw.get(1..).unwrap_or_default().to_vec()).unwrap_or_default();
                Json(json!({ "value": value }))
            }),
        )
        .route(
            "/v1/reencrypt",
            post(|| async {
                (
                    axum::http::StatusCode::FORBIDDEN,
                    "signature rejected".to_string(),
                )
            }),
        )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn gateway_instance_forwards_calls() -> anyhow::Result<()> {
    let gateway_url = serve(mock_gateway()).await?;
    let registry = ClientRegistry::new(Arc::new(DefaultInstanceFactory {
        gateway_timeout: Some(Duration::from_secs(5)),
    }));
    let client = registry
        .initialize(ClientConfig::new(Network::Localhost, CONTRACT).with_gateway_url(&gateway_url))
        .await?;

    assert_eq!(client.public_key().await?, "0xfeed");

    let encrypted = encrypt(&client, 4242u32, 32).await?;
    assert_eq!(encrypted.as_bytes()[0], 32);
    let handle = EncryptedHandle::new(encrypted.to_hex(), BitWidth::W32)?;
    assert_eq!(
        public_decrypt(&client, &handle).await?,
        DecryptedValue::Uint(U256::from(4242u32))
    );

    let options = fhevm_sdk::DecryptOptions {
        user_address: ACCOUNT.to_string(),
        contract_address: CONTRACT.to_string(),
        signature: Some("0x00".to_string()),
    };
    let err = fhevm_sdk::decrypt(&client, &handle, &options).await;
    assert!(matches!(err, Err(Error::Instance(msg)) if msg.contains("403")));
    Ok(())
}

fn word(n: u64) -> String {
    format!("{:064x}", n)
}

fn mock_node() -> Router {
    Router::new().route(
        "/",
        post(|Json(body): Json<Value>| async move {
            let id = body["id"].clone();
            let result = match body["method"].as_str().unwrap_or_default() {
                "eth_chainId" => json!("0x7a69"),
                "eth_accounts" => json!([ACCOUNT]),
                "eth_call" => {
                    let data = body["params"][0]["data"].as_str().unwrap_or_default();
                    // tradingPeriods(uint256) carries an argument; getCurrentTradingPeriod() does not.
                    if data.len() > 10 {
                        json!(format!("0x{}{}{}{}", word(100), word(200), word(1), word(0)))
                    } else {
                        json!(format!("0x{}", word(3)))
                    }
                }
                "eth_sendTransaction" => json!(format!("0x{}", "11".repeat(32))),
                _ => {
                    return Json(json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "error": { "code": -32601, "message": "method not found" }
                    }))
                }
            };
            Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
        }),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn energy_market_over_json_rpc() -> anyhow::Result<()> {
    let node_url = serve(mock_node()).await?;
    let rpc = Arc::new(JsonRpcClient::new(format!("{}/", node_url), Duration::from_secs(5))?);

    assert_eq!(rpc.chain_id().await?, 31_337);
    assert_eq!(rpc.accounts().await?, vec![ACCOUNT.to_string()]);
    assert!(matches!(
        rpc.request::<Value>("eth_unknown", json!([])).await,
        Err(Error::Rpc(msg)) if msg.contains("method not found")
    ));

    let market = EnergyMarket::new(rpc.clone(), CONTRACT)?;
    assert_eq!(market.current_trading_period().await?, U256::from(3u8));

    let period = market.trading_period(U256::from(3u8)).await?;
    assert_eq!(period.start_time, U256::from(100u8));
    assert_eq!(period.end_time, U256::from(200u8));
    assert!(period.is_active);
    assert!(!period.settled);

    let amount = fhevm_sdk::EncryptedValue(vec![1, 2, 3]);
    let price = fhevm_sdk::EncryptedValue(vec![4, 5, 6]);
    let tx = market
        .submit_energy_offer(ACCOUNT, &amount, &price, EnergyType::Solar)
        .await?;
    assert_eq!(tx.len(), 66);
    Ok(())
}
