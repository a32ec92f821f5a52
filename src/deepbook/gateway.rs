//! DeepBook access abstraction - enables mocking for tests

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::Settings;
use crate::consts::MAINNET_DEEPBOOK_PACKAGE;
use crate::grid::{GridError, GridResult};

use super::types::{
    normalize_address, BalanceManagerEvent, EventPage, OrderBookSnapshot, PoolInfo, RpcResponse,
};

/// Read-only DeepBook operations the planner depends on
#[async_trait]
pub trait DeepBookGateway: Send + Sync {
    /// Mid price of a pool: halfway between best bid and best ask
    async fn mid_price(&self, pool_key: &str) -> GridResult<f64>;

    /// All pools known to the indexer
    async fn pools(&self) -> GridResult<Vec<PoolInfo>>;

    /// Balance manager object ids created by `owner`
    async fn balance_manager_ids(&self, owner: &str) -> GridResult<Vec<String>>;
}

// ============================================================================
// HTTP implementation (DeepBook indexer + Sui fullnode JSON-RPC)
// ============================================================================

const EVENTS_PAGE_SIZE: u32 = 50;
const MAX_EVENT_PAGES: u32 = 40;

/// Gateway backed by the public DeepBook indexer and a Sui fullnode
pub struct IndexerGateway {
    http: reqwest::Client,
    indexer_url: String,
    fullnode_url: String,
    deepbook_package: String,
    max_retries: u32,
    retry_base_delay_ms: u64,
}

impl IndexerGateway {
    pub fn new(
        indexer_url: impl Into<String>,
        fullnode_url: impl Into<String>,
        deepbook_package: impl Into<String>,
    ) -> GridResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            http,
            indexer_url: indexer_url.into().trim_end_matches('/').to_string(),
            fullnode_url: fullnode_url.into(),
            deepbook_package: deepbook_package.into(),
            max_retries: 3,
            retry_base_delay_ms: 200,
        })
    }

    /// Build from settings, falling back to the network's public endpoints
    pub fn from_settings(settings: &Settings) -> GridResult<Self> {
        let package = settings
            .network
            .deepbook_package
            .clone()
            .unwrap_or_else(|| MAINNET_DEEPBOOK_PACKAGE.to_string());
        Self::new(settings.indexer_url()?, settings.fullnode_url()?, package)
    }

    /// Builder: set retry parameters
    pub fn with_retry_config(mut self, max_retries: u32, base_delay_ms: u64) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_base_delay_ms = base_delay_ms;
        self
    }

    /// Execute with exponential backoff retry.
    ///
    /// Only transport failures are retried; any other error is returned as is.
    async fn with_retry<T, F, Fut>(&self, what: &str, operation: F) -> GridResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = GridResult<T>>,
    {
        let mut attempts = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    attempts += 1;
                    if attempts >= self.max_retries {
                        return Err(GridError::RetriesExhausted {
                            what: what.to_string(),
                            attempts,
                            reason: e.to_string(),
                        });
                    }

                    let delay = self.retry_base_delay_ms * 2u64.pow(attempts - 1);
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {}ms: {}",
                        what, attempts, self.max_retries, delay, e
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> GridResult<T> {
        debug!("GET {}", url);
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }

    async fn rpc_call<T: DeserializeOwned>(&self, method: &str, params: Value) -> GridResult<T> {
        debug!("RPC {} {}", method, params);
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response: RpcResponse<T> = self
            .http
            .post(&self.fullnode_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(GridError::Gateway(format!(
                "{method} returned error {}: {}",
                err.code, err.message
            )));
        }
        response
            .result
            .ok_or_else(|| GridError::Gateway(format!("{method} returned no result")))
    }

    fn balance_manager_event_type(&self) -> String {
        format!(
            "{}::balance_manager::BalanceManagerEvent",
            self.deepbook_package
        )
    }
}

#[async_trait]
impl DeepBookGateway for IndexerGateway {
    async fn mid_price(&self, pool_key: &str) -> GridResult<f64> {
        let url = format!("{}/orderbook/{}?level=1&depth=1", self.indexer_url, pool_key);
        let book: OrderBookSnapshot = self
            .with_retry("orderbook", || self.get_json(&url))
            .await?;
        mid_from_book(pool_key, &book)
    }

    async fn pools(&self) -> GridResult<Vec<PoolInfo>> {
        let url = format!("{}/get_pools", self.indexer_url);
        self.with_retry("get_pools", || self.get_json(&url)).await
    }

    async fn balance_manager_ids(&self, owner: &str) -> GridResult<Vec<String>> {
        let owner = normalize_address(owner);
        let event_type = self.balance_manager_event_type();
        let mut cursor = Value::Null;
        let mut ids = Vec::new();

        for page_num in 0..MAX_EVENT_PAGES {
            let params = json!([{ "MoveEventType": event_type }, cursor, EVENTS_PAGE_SIZE, true]);
            let page: EventPage = self
                .with_retry("suix_queryEvents", || {
                    self.rpc_call("suix_queryEvents", params.clone())
                })
                .await?;

            for event in page.data {
                match serde_json::from_value::<BalanceManagerEvent>(event.parsed_json) {
                    Ok(ev) if normalize_address(&ev.owner) == owner => {
                        if !ids.contains(&ev.balance_manager_id) {
                            ids.push(ev.balance_manager_id);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => debug!("Skipping unparseable balance manager event: {}", e),
                }
            }

            match page.next_cursor {
                Some(next) if page.has_next_page => cursor = next,
                _ => return Ok(ids),
            }

            if page_num + 1 == MAX_EVENT_PAGES {
                warn!(
                    "Stopped scanning balance manager events after {} pages; results may be incomplete",
                    MAX_EVENT_PAGES
                );
            }
        }

        Ok(ids)
    }
}

/// Midpoint of the best bid and best ask
pub fn mid_from_book(pool_key: &str, book: &OrderBookSnapshot) -> GridResult<f64> {
    let bid = book.best_bid().ok_or_else(|| GridError::EmptyBook {
        pool: pool_key.to_string(),
        side: "bid",
    })?;
    let ask = book.best_ask().ok_or_else(|| GridError::EmptyBook {
        pool: pool_key.to_string(),
        side: "ask",
    })?;
    Ok((bid + ask) / 2.0)
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================

pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::Mutex;

    /// In-memory gateway for tests
    pub struct MockGateway {
        pub mid_prices: Mutex<HashMap<String, f64>>,
        pub pools: Mutex<Vec<PoolInfo>>,
        pub managers: Mutex<HashMap<String, Vec<String>>>,
        pub should_fail: Mutex<bool>,
        mid_price_calls: AtomicU32,
    }

    impl MockGateway {
        pub fn new() -> Self {
            Self {
                mid_prices: Mutex::new(HashMap::new()),
                pools: Mutex::new(Vec::new()),
                managers: Mutex::new(HashMap::new()),
                should_fail: Mutex::new(false),
                mid_price_calls: AtomicU32::new(0),
            }
        }

        /// Builder: quote `pool_key` at `price`
        pub fn with_mid_price(mut self, pool_key: &str, price: f64) -> Self {
            self.mid_prices
                .get_mut()
                .insert(pool_key.to_string(), price);
            self
        }

        pub async fn set_mid_price(&self, pool_key: &str, price: f64) {
            self.mid_prices
                .lock()
                .await
                .insert(pool_key.to_string(), price);
        }

        pub async fn add_pool(&self, pool: PoolInfo) {
            self.pools.lock().await.push(pool);
        }

        pub async fn add_manager(&self, owner: &str, manager_id: &str) {
            self.managers
                .lock()
                .await
                .entry(normalize_address(owner))
                .or_default()
                .push(manager_id.to_string());
        }

        pub async fn set_should_fail(&self, fail: bool) {
            *self.should_fail.lock().await = fail;
        }

        /// Number of `mid_price` calls served so far
        pub fn mid_price_calls(&self) -> u32 {
            self.mid_price_calls.load(Ordering::SeqCst)
        }

        async fn check_fail(&self) -> GridResult<()> {
            if *self.should_fail.lock().await {
                return Err(GridError::Gateway("Mock failure".into()));
            }
            Ok(())
        }
    }

    impl Default for MockGateway {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl DeepBookGateway for MockGateway {
        async fn mid_price(&self, pool_key: &str) -> GridResult<f64> {
            self.mid_price_calls.fetch_add(1, Ordering::SeqCst);
            self.check_fail().await?;
            self.mid_prices
                .lock()
                .await
                .get(pool_key)
                .copied()
                .ok_or_else(|| GridError::PoolNotFound(pool_key.to_string()))
        }

        async fn pools(&self) -> GridResult<Vec<PoolInfo>> {
            self.check_fail().await?;
            Ok(self.pools.lock().await.clone())
        }

        async fn balance_manager_ids(&self, owner: &str) -> GridResult<Vec<String>> {
            self.check_fail().await?;
            Ok(self
                .managers
                .lock()
                .await
                .get(&normalize_address(owner))
                .cloned()
                .unwrap_or_default())
        }
    }
}
