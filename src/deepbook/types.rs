//! Wire types for the DeepBook indexer and Sui JSON-RPC

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Pool entry as listed by the indexer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub pool_id: String,
    /// Pool key, e.g. "SUI_USDC"
    pub pool_name: String,
    pub base_asset_symbol: String,
    pub quote_asset_symbol: String,
    #[serde(default)]
    pub base_asset_decimals: u8,
    #[serde(default)]
    pub quote_asset_decimals: u8,
    #[serde(default)]
    pub tick_size: u64,
    #[serde(default)]
    pub lot_size: u64,
    #[serde(default)]
    pub min_size: u64,
}

/// Order book snapshot; each entry is `[price, quantity]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderBookSnapshot {
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default, deserialize_with = "de_book_side")]
    pub bids: Vec<(f64, f64)>,
    #[serde(default, deserialize_with = "de_book_side")]
    pub asks: Vec<(f64, f64)>,
}

impl OrderBookSnapshot {
    /// Highest bid price
    pub fn best_bid(&self) -> Option<f64> {
        self.bids.iter().map(|(p, _)| *p).fold(None, |best, p| match best {
            Some(b) if b >= p => Some(b),
            _ => Some(p),
        })
    }

    /// Lowest ask price
    pub fn best_ask(&self) -> Option<f64> {
        self.asks.iter().map(|(p, _)| *p).fold(None, |best, p| match best {
            Some(b) if b <= p => Some(b),
            _ => Some(p),
        })
    }
}

/// The indexer quotes prices and sizes as strings; accept numbers too
fn de_book_side<'de, D>(deserializer: D) -> Result<Vec<(f64, f64)>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<(Value, Value)> = Vec::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(price, qty)| Ok((value_to_f64(&price)?, value_to_f64(&qty)?)))
        .collect()
}

fn value_to_f64<E: serde::de::Error>(value: &Value) -> Result<f64, E> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| E::custom(format!("number out of range: {n}"))),
        Value::String(s) => s
            .parse()
            .map_err(|_| E::custom(format!("not a number: {s}"))),
        other => Err(E::custom(format!("expected number, got {other}"))),
    }
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// One page of `suix_queryEvents`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    pub data: Vec<SuiEvent>,
    #[serde(default)]
    pub next_cursor: Option<Value>,
    #[serde(default)]
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiEvent {
    #[serde(default)]
    pub parsed_json: Value,
}

/// Payload of DeepBook's `BalanceManagerEvent`
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceManagerEvent {
    pub balance_manager_id: String,
    pub owner: String,
}

/// Canonical 64-digit lowercase form of a Sui address for comparison
pub fn normalize_address(address: &str) -> String {
    let hex = address.trim().trim_start_matches("0x").to_lowercase();
    format!("0x{:0>64}", hex)
}
