//! Grid Ladder Module
//!
//! Computes grid-trading ladders: evenly spaced price rungs between a lower and
//! an upper bound, each tagged bid or ask against the current price and sized
//! so every rung carries the same share of capital.
//!
//! - [`types`] - Input parameters, rungs and order sides
//! - [`calculator`] - The pure ladder computation and its summary
//! - [`errors`] - Error types shared by the crate
//!
//! # Example
//!
//! ```rust
//! use deepbook_grid::grid::{compute_grid_levels, GridParameters, OrderSide};
//!
//! // $300 over three rungs between 1.0 and 2.0, market at 1.5
//! let params = GridParameters::new(1.0, 2.0, 3, 1.5, 300.0);
//! let levels = compute_grid_levels(&params);
//!
//! assert_eq!(levels.len(), 3);
//! assert_eq!(levels[0].side, OrderSide::Bid);
//! assert_eq!(levels[1].side, OrderSide::Ask);
//! ```

pub mod calculator;
pub mod errors;
pub mod types;

pub use calculator::{compute_grid_levels, price_step, GridSummary};
pub use errors::{GridError, GridResult};
pub use types::{GridLevel, GridParameters, OrderSide};
