use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Sepolia,
    Mainnet,
    Localhost,
    Custom,
}

impl Network {
    pub fn default_chain_id(self) -> u64 {
        match self {
            Network::Sepolia => 11_155_111,
            Network::Mainnet => 1,
            Network::Localhost => 31_337,
            Network::Custom => 0,
        }
    }

    /// `custom` has no default endpoint.
    pub fn default_rpc_url(self) -> Option<&'static str> {
        match self {
            Network::Sepolia => Some("https://rpc.sepolia.org"),
            Network::Mainnet => Some("https://eth.llamarpc.com"),
            Network::Localhost => Some("http://127.0.0.1:8545"),
            Network::Custom => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Sepolia => "sepolia",
            Network::Mainnet => "mainnet",
            Network::Localhost => "localhost",
            Network::Custom => "custom",
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Sepolia
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sepolia" => Ok(Network::Sepolia),
            "mainnet" => Ok(Network::Mainnet),
            "localhost" => Ok(Network::Localhost),
            "custom" => Ok(Network::Custom),
            other => Err(Error::Config(format!("unknown network {:?}", other))),
        }
    }
}
