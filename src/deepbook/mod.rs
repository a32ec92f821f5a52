//! DeepBook Access Module
//!
//! Read-only access to DeepBook v3 pools on Sui, behind the [`DeepBookGateway`]
//! trait so planning can run against the live indexer or an in-memory mock.
//!
//! - [`gateway`] - The trait, the HTTP implementation and the mock
//! - [`types`] - Indexer and JSON-RPC wire types

pub mod gateway;
pub mod types;

pub use gateway::{mid_from_book, mock, DeepBookGateway, IndexerGateway};
pub use types::{normalize_address, OrderBookSnapshot, PoolInfo};
