pub static MAINNET_FULLNODE_URL: &str = "https://fullnode.mainnet.sui.io:443";
pub static TESTNET_FULLNODE_URL: &str = "https://fullnode.testnet.sui.io:443";
pub static DEVNET_FULLNODE_URL: &str = "https://fullnode.devnet.sui.io:443";
pub static LOCALNET_FULLNODE_URL: &str = "http://127.0.0.1:9000";

pub static MAINNET_INDEXER_URL: &str = "https://deepbook-indexer.mainnet.mystenlabs.com";
pub static TESTNET_INDEXER_URL: &str = "https://deepbook-indexer.testnet.mystenlabs.com";

/// DeepBook v3 package on mainnet, source of `BalanceManagerEvent`
pub static MAINNET_DEEPBOOK_PACKAGE: &str =
    "0x2c8d603bc51326b8c13cef9dd07031a408a48dddb541963357661df5d3204809";

/// Quantities are quoted to two decimals
pub const QUANTITY_DECIMALS: u32 = 2;

/// Upper bound on rungs per ladder
pub const MAX_LEVELS: i64 = 10_000;
