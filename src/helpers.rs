use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEVNET_FULLNODE_URL, LOCALNET_FULLNODE_URL, MAINNET_FULLNODE_URL, MAINNET_INDEXER_URL,
    TESTNET_FULLNODE_URL, TESTNET_INDEXER_URL,
};

/// Round `x` to `decimals` places, ties away from zero.
pub fn round_to_decimals(x: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (x * factor).round() / factor
}

/// Sui network the planner talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
    Localnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Localnet => "localnet",
        }
    }

    /// Default fullnode JSON-RPC endpoint
    pub fn fullnode_url(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_FULLNODE_URL,
            Network::Testnet => TESTNET_FULLNODE_URL,
            Network::Devnet => DEVNET_FULLNODE_URL,
            Network::Localnet => LOCALNET_FULLNODE_URL,
        }
    }

    /// Default DeepBook indexer endpoint. Only mainnet and testnet host one.
    pub fn indexer_url(&self) -> Option<&'static str> {
        match self {
            Network::Mainnet => Some(MAINNET_INDEXER_URL),
            Network::Testnet => Some(TESTNET_INDEXER_URL),
            Network::Devnet | Network::Localnet => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            "localnet" | "local" => Ok(Network::Localnet),
            other => Err(format!("unknown network '{other}'")),
        }
    }
}
