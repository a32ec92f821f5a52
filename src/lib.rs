#![deny(unreachable_pub)]
pub mod config;
mod consts;
pub mod deepbook;
pub mod grid;
mod helpers;
pub mod journal;
pub mod planner;

pub use consts::{
    DEVNET_FULLNODE_URL, LOCALNET_FULLNODE_URL, MAINNET_DEEPBOOK_PACKAGE, MAINNET_FULLNODE_URL,
    MAINNET_INDEXER_URL, MAX_LEVELS, QUANTITY_DECIMALS, TESTNET_FULLNODE_URL, TESTNET_INDEXER_URL,
};
pub use grid::{compute_grid_levels, GridError, GridLevel, GridParameters, GridResult, OrderSide};
pub use helpers::{round_to_decimals, Network};
pub use planner::{GridPlan, GridPlanner, PriceSource};
