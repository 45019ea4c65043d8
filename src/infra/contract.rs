// Binding for the private renewable-energy market contract.
//
// Calldata is built by hand from the function signatures; encrypted amounts and prices travel
// as opaque `bytes` arguments.

use crate::crypto::abi::{decode_bool, decode_uint, encode_call, Token};
use crate::domain::types::EncryptedValue;
use crate::error::{Error, Result};
use crate::infra::rpc::JsonRpcClient;
use primitive_types::U256;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

pub const SUBMIT_OFFER_SIG: &str = "submitEnergyOffer(bytes,bytes,uint8)";
pub const SUBMIT_DEMAND_SIG: &str = "submitEnergyDemand(bytes,bytes,uint8)";
pub const CURRENT_PERIOD_SIG: &str = "getCurrentTradingPeriod()";
pub const TRADING_PERIODS_SIG: &str = "tradingPeriods(uint256)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyType {
    Solar = 0,
    Wind = 1,
    Hydro = 2,
    Geothermal = 3,
    Biomass = 4,
}

impl EnergyType {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for EnergyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnergyType::Solar => "solar",
            EnergyType::Wind => "wind",
            EnergyType::Hydro => "hydro",
            EnergyType::Geothermal => "geothermal",
            EnergyType::Biomass => "biomass",
        };
        f.write_str(name)
    }
}

impl FromStr for EnergyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "solar" | "0" => Ok(EnergyType::Solar),
            "wind" | "1" => Ok(EnergyType::Wind),
            "hydro" | "2" => Ok(EnergyType::Hydro),
            "geothermal" | "3" => Ok(EnergyType::Geothermal),
            "biomass" | "4" => Ok(EnergyType::Biomass),
            other => Err(Error::InvalidInput(format!("unknown energy type {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingPeriod {
    pub start_time: U256,
    pub end_time: U256,
    pub is_active: bool,
    pub settled: bool,
}

pub fn submit_offer_calldata(
    encrypted_amount: &EncryptedValue,
    encrypted_price_per_kwh: &EncryptedValue,
    energy_type: EnergyType,
) -> Vec<u8> {
    encode_call(
        SUBMIT_OFFER_SIG,
        &[
            Token::Bytes(encrypted_amount.as_bytes().to_vec()),
            Token::Bytes(encrypted_price_per_kwh.as_bytes().to_vec()),
            Token::Uint(U256::from(energy_type.code())),
        ],
    )
}

pub fn submit_demand_calldata(
    encrypted_amount: &EncryptedValue,
    encrypted_max_price: &EncryptedValue,
    energy_type: EnergyType,
) -> Vec<u8> {
    encode_call(
        SUBMIT_DEMAND_SIG,
        &[
            Token::Bytes(encrypted_amount.as_bytes().to_vec()),
            Token::Bytes(encrypted_max_price.as_bytes().to_vec()),
            Token::Uint(U256::from(energy_type.code())),
        ],
    )
}

pub fn decode_trading_period(data: &[u8]) -> Result<TradingPeriod> {
    Ok(TradingPeriod {
        start_time: decode_uint(data, 0)?,
        end_time: decode_uint(data, 1)?,
        is_active: decode_bool(data, 2)?,
        settled: decode_bool(data, 3)?,
    })
}

pub struct EnergyMarket {
    rpc: Arc<JsonRpcClient>,
    address: String,
}

impl EnergyMarket {
    pub fn new(rpc: Arc<JsonRpcClient>, address: impl Into<String>) -> Result<Self> {
        let address = address.into();
        crate::util::ensure_address(&address)?;
        Ok(Self { rpc, address })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub async fn current_trading_period(&self) -> Result<U256> {
        let out = self
            .rpc
            .call(&self.address, &encode_call(CURRENT_PERIOD_SIG, &[]))
            .await?;
        decode_uint(&out, 0)
    }

    pub async fn trading_period(&self, id: U256) -> Result<TradingPeriod> {
        let out = self
            .rpc
            .call(&self.address, &encode_call(TRADING_PERIODS_SIG, &[Token::Uint(id)]))
            .await?;
        decode_trading_period(&out)
    }

    /// Returns the transaction hash.
    pub async fn submit_energy_offer(
        &self,
        from: &str,
        encrypted_amount: &EncryptedValue,
        encrypted_price_per_kwh: &EncryptedValue,
        energy_type: EnergyType,
    ) -> Result<String> {
        let data = submit_offer_calldata(encrypted_amount, encrypted_price_per_kwh, energy_type);
        let tx = self.rpc.send_transaction(from, &self.address, &data).await?;
        info!(%tx, %energy_type, "energy offer submitted");
        Ok(tx)
    }

    pub async fn submit_energy_demand(
        &self,
        from: &str,
        encrypted_amount: &EncryptedValue,
        encrypted_max_price: &EncryptedValue,
        energy_type: EnergyType,
    ) -> Result<String> {
        let data = submit_demand_calldata(encrypted_amount, encrypted_max_price, energy_type);
        let tx = self.rpc.send_transaction(from, &self.address, &data).await?;
        info!(%tx, %energy_type, "energy demand submitted");
        Ok(tx)
    }
}
