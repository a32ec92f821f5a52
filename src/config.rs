use std::fmt;

use config::{Config, Environment, File};
pub use config::ConfigError;
use serde::Deserialize;

use crate::grid::{GridError, GridParameters, GridResult};
use crate::helpers::Network;

/// Prefix for environment overrides, e.g. `APP_NETWORK__ENV=mainnet`
pub const ENV_PREFIX: &str = "APP";

/// Main configuration struct
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Network configuration (env, endpoints, owner)
    pub network: NetworkConfig,
    /// DeepBook pool to plan against
    pub pool: PoolConfig,
    /// Grid band and capital
    pub grid: GridSection,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
    /// Step journal configuration
    #[serde(default)]
    pub journal: JournalConfig,
}

#[derive(Clone, Deserialize)]
pub struct NetworkConfig {
    /// Environment: "mainnet", "testnet", "devnet" or "localnet"
    #[serde(default = "default_network_env")]
    pub env: String,
    /// Fullnode JSON-RPC URL; defaults to the public node for `env`
    #[serde(default)]
    pub fullnode_url: Option<String>,
    /// DeepBook indexer URL; defaults to the public indexer for `env`
    #[serde(default)]
    pub indexer_url: Option<String>,
    /// DeepBook package id; defaults to the mainnet package
    #[serde(default)]
    pub deepbook_package: Option<String>,
    /// Sui address owning the balance managers
    #[serde(default)]
    pub owner_address: Option<String>,
    /// Accepted so existing `.env` layouts keep loading. Never used or logged.
    #[serde(default)]
    pub private_key: Option<String>,
}

impl fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("env", &self.env)
            .field("fullnode_url", &self.fullnode_url)
            .field("indexer_url", &self.indexer_url)
            .field("deepbook_package", &self.deepbook_package)
            .field("owner_address", &self.owner_address)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn default_network_env() -> String {
    "testnet".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Pool key, e.g. "SUI_USDC"
    pub key: String,
    /// Balance manager id carried as the grid's account reference
    #[serde(default)]
    pub balance_manager: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridSection {
    pub min_price: f64,
    pub max_price: f64,
    pub levels: i64,
    pub total_capital: f64,
    /// Fixed current price; when absent the pool mid price is fetched
    #[serde(default)]
    pub current_price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalConfig {
    /// JSON-lines file step outcomes are appended to; disabled when absent
    #[serde(default)]
    pub path: Option<String>,
}

impl Settings {
    /// Load settings from a configuration file, with `APP_` environment overrides
    pub fn new(config_path: &str) -> Result<Self, ConfigError> {
        Self::load(config_path, ENV_PREFIX)
    }

    /// Load settings from `config_path`, letting variables under `env_prefix` override it
    pub fn load(config_path: &str, env_prefix: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(config_path))
            // e.g. APP_NETWORK__OWNER_ADDRESS=0x...
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        s.try_deserialize()
    }

    /// Parsed network selection
    pub fn network(&self) -> GridResult<Network> {
        self.network
            .env
            .parse()
            .map_err(GridError::InvalidConfig)
    }

    /// Fullnode URL, explicit or derived from the network
    pub fn fullnode_url(&self) -> GridResult<String> {
        match &self.network.fullnode_url {
            Some(url) => Ok(url.clone()),
            None => Ok(self.network()?.fullnode_url().to_string()),
        }
    }

    /// Indexer URL, explicit or derived from the network
    pub fn indexer_url(&self) -> GridResult<String> {
        if let Some(url) = &self.network.indexer_url {
            return Ok(url.clone());
        }
        let network = self.network()?;
        network
            .indexer_url()
            .map(str::to_string)
            .ok_or_else(|| {
                GridError::InvalidConfig(format!(
                    "no public DeepBook indexer for {network}; set network.indexer_url"
                ))
            })
    }

    /// Grid parameters for a resolved current price
    pub fn grid_parameters(&self, current_price: f64) -> GridParameters {
        let params = GridParameters::new(
            self.grid.min_price,
            self.grid.max_price,
            self.grid.levels,
            current_price,
            self.grid.total_capital,
        );
        match &self.pool.balance_manager {
            Some(manager) => params.with_account_reference(manager.clone()),
            None => params,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> GridResult<()> {
        self.network()?;

        if self.pool.key.trim().is_empty() {
            return Err(GridError::InvalidConfig("pool.key cannot be empty".into()));
        }

        if let Some(owner) = &self.network.owner_address {
            if !is_sui_address(owner) {
                return Err(GridError::InvalidConfig(format!(
                    "network.owner_address is not a Sui address: {owner}"
                )));
            }
        }

        if let Some(manager) = &self.pool.balance_manager {
            if !is_sui_address(manager) {
                return Err(GridError::InvalidConfig(format!(
                    "pool.balance_manager is not an object id: {manager}"
                )));
            }
        }

        if let Some(price) = self.grid.current_price {
            if !price.is_finite() || price <= 0.0 {
                return Err(GridError::InvalidConfig(
                    "grid.current_price must be positive".into(),
                ));
            }
        }

        Ok(())
    }
}

/// `0x` followed by 1 to 64 hex digits
pub fn is_sui_address(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(hex) => !hex.is_empty() && hex.len() <= 64 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[network]
env = "mainnet"
owner_address = "0x1234abcd"
private_key = "suiprivkey1secret"

[pool]
key = "SUI_USDC"
balance_manager = "0xbeef"

[grid]
min_price = 1.0
max_price = 2.0
levels = 3
total_capital = 300.0
"#;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(SAMPLE);
        let settings = Settings::load(file.path().to_str().unwrap(), "DBGRID_TEST_UNSET").unwrap();

        assert_eq!(settings.network().unwrap(), Network::Mainnet);
        assert_eq!(settings.pool.key, "SUI_USDC");
        assert_eq!(settings.grid.levels, 3);
        assert_eq!(settings.grid.current_price, None);
        assert_eq!(settings.log.level, "info");
        assert!(settings.journal.path.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_config(SAMPLE);
        std::env::set_var("DBGRID_TEST_ENV_POOL__KEY", "DEEP_SUI");
        let settings = Settings::load(file.path().to_str().unwrap(), "DBGRID_TEST_ENV").unwrap();
        std::env::remove_var("DBGRID_TEST_ENV_POOL__KEY");

        assert_eq!(settings.pool.key, "DEEP_SUI");
    }

    #[test]
    fn test_private_key_is_redacted() {
        let file = write_config(SAMPLE);
        let settings = Settings::load(file.path().to_str().unwrap(), "DBGRID_TEST_UNSET").unwrap();

        let debug = format!("{:?}", settings);
        assert!(!debug.contains("suiprivkey1secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_grid_parameters_carry_balance_manager() {
        let file = write_config(SAMPLE);
        let settings = Settings::load(file.path().to_str().unwrap(), "DBGRID_TEST_UNSET").unwrap();

        let params = settings.grid_parameters(1.5);
        assert_eq!(params.account_reference.as_deref(), Some("0xbeef"));
        assert!((params.current_price - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_validation() {
        let file = write_config(SAMPLE);
        let mut settings = Settings::load(file.path().to_str().unwrap(), "DBGRID_TEST_UNSET").unwrap();

        settings.network.env = "moonnet".into();
        assert!(settings.validate().is_err());
        settings.network.env = "testnet".into();

        settings.pool.key = "  ".into();
        assert!(settings.validate().is_err());
        settings.pool.key = "SUI_USDC".into();

        settings.network.owner_address = Some("not-an-address".into());
        assert!(settings.validate().is_err());
        settings.network.owner_address = None;

        settings.grid.current_price = Some(0.0);
        assert!(settings.validate().is_err());
        settings.grid.current_price = Some(1.2);

        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_urls() {
        let file = write_config(SAMPLE);
        let mut settings = Settings::load(file.path().to_str().unwrap(), "DBGRID_TEST_UNSET").unwrap();
        assert!(settings.indexer_url().unwrap().contains("mainnet"));

        settings.network.env = "localnet".into();
        assert!(settings.indexer_url().is_err());
        assert_eq!(settings.fullnode_url().unwrap(), "http://127.0.0.1:9000");

        settings.network.indexer_url = Some("http://localhost:9008".into());
        assert_eq!(settings.indexer_url().unwrap(), "http://localhost:9008");
    }

    #[test]
    fn test_is_sui_address() {
        assert!(is_sui_address("0x2"));
        assert!(is_sui_address(&format!("0x{}", "a".repeat(64))));
        assert!(!is_sui_address(&format!("0x{}", "a".repeat(65))));
        assert!(!is_sui_address("0x"));
        assert!(!is_sui_address("abcd"));
        assert!(!is_sui_address("0xzz"));
    }
}
