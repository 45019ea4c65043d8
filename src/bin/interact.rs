//! Command-line interaction with a deployed energy market contract.
//!
//! Amounts and prices are encrypted locally through the configured FHE instance before they are
//! submitted; the node's first unlocked account signs the transactions.

use fhevm_sdk::infra::config;
use fhevm_sdk::infra::contract::{EnergyMarket, EnergyType};
use fhevm_sdk::infra::rpc::JsonRpcClient;
use fhevm_sdk::util::{explorer_address_url, explorer_tx_url, format_handle};
use fhevm_sdk::{encrypt32, encrypt64, ClientRegistry, DefaultInstanceFactory};
use primitive_types::U256;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin interact -- <command>\n\
         \n\
         Commands:\n\
           info                                   contract, network and current period\n\
           period <id>                            trading period status\n\
           offer <kwh> <price_per_kwh> <type>     submit an encrypted energy offer\n\
           demand <kwh> <max_price> <type>        submit an encrypted energy demand\n\
         \n\
         Energy types: solar, wind, hydro, geothermal, biomass (or 0-4)\n\
         \n\
         Requires env vars:\n\
           FHEVM_CONTRACT_ADDRESS (FHEVM_NETWORK, FHEVM_RPC_URL, FHEVM_GATEWAY_URL optional)\n"
    );
    std::process::exit(2);
}

fn arg<'a>(args: &'a [String], i: usize) -> &'a str {
    match args.get(i) {
        Some(a) => a.as_str(),
        None => usage_and_exit(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    let timeout = config::rpc_timeout()?;
    let registry = ClientRegistry::new(Arc::new(DefaultInstanceFactory {
        gateway_timeout: Some(timeout),
    }));
    let client = registry.initialize(config::client_config()?).await?;
    let rpc = Arc::new(JsonRpcClient::new(client.rpc_url(), timeout)?);
    let market = EnergyMarket::new(rpc.clone(), client.contract_address())?;
    let network = client.network().as_str();

    match arg(&args, 0) {
        "info" => {
            let chain_id = rpc.chain_id().await?;
            let period = market.current_trading_period().await?;
            println!("> Contract: {}", market.address());
            println!("  Explorer: {}", explorer_address_url(network, market.address()));
            println!("  Network: {} (chain id {}, node reports {})", network, client.chain_id(), chain_id);
            if chain_id != client.chain_id() {
                eprintln!("  Warning: node chain id does not match the configured network.");
            }
            println!("  Current trading period: {}", period);
        }
        "period" => {
            let id = U256::from_dec_str(arg(&args, 1))
                .map_err(|e| anyhow::anyhow!("period id must be a decimal integer: {:?}", e))?;
            let period = market.trading_period(id).await?;
            println!("> Trading period {}", id);
            println!("  Start time: {}", period.start_time);
            println!("  End time: {}", period.end_time);
            println!("  Active: {}", period.is_active);
            println!("  Settled: {}", period.settled);
        }
        cmd @ ("offer" | "demand") => {
            let amount: u32 = arg(&args, 1).parse()?;
            let price: u64 = arg(&args, 2).parse()?;
            let energy_type: EnergyType = arg(&args, 3).parse()?;

            let from = rpc
                .accounts()
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| anyhow::anyhow!("node exposes no unlocked accounts"))?;

            let encrypted_amount = encrypt32(&client, amount).await?;
            let encrypted_price = encrypt64(&client, price).await?;
            println!("> Encrypted amount: {}", format_handle(&encrypted_amount.to_hex()));
            println!("> Encrypted price: {}", format_handle(&encrypted_price.to_hex()));

            let tx = if cmd == "offer" {
                market
                    .submit_energy_offer(&from, &encrypted_amount, &encrypted_price, energy_type)
                    .await?
            } else {
                market
                    .submit_energy_demand(&from, &encrypted_amount, &encrypted_price, energy_type)
                    .await?
            };
            println!("> Submitted {} of {} kWh ({}) from {}", cmd, amount, energy_type, from);
            println!("  Transaction: {}", explorer_tx_url(network, &tx));
        }
        _ => usage_and_exit(),
    }

    Ok(())
}
