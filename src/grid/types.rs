//! Core data types for grid planning

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_LEVELS, QUANTITY_DECIMALS};

use super::errors::{GridError, GridResult};

/// Order side of a grid rung relative to the current price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Bid,
    Ask,
}

impl OrderSide {
    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            OrderSide::Bid => OrderSide::Ask,
            OrderSide::Ask => OrderSide::Bid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Bid => "bid",
            OrderSide::Ask => "ask",
        }
    }

    /// Side a rung at `price` takes when the market trades at `current_price`
    pub fn for_price(price: f64, current_price: f64) -> Self {
        if price < current_price {
            OrderSide::Bid
        } else {
            OrderSide::Ask
        }
    }
}

/// Input to the grid calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridParameters {
    /// Lowest rung price
    pub min_price: f64,
    /// Highest rung price
    pub max_price: f64,
    /// Number of rungs; zero or negative yields an empty ladder
    pub levels: i64,
    /// Used only to classify rungs as bid or ask
    pub current_price: f64,
    /// Capital spread evenly across all rungs
    pub total_capital: f64,
    /// Opaque caller context (e.g. a balance manager id). Never read by the calculation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_reference: Option<String>,
}

impl GridParameters {
    pub fn new(
        min_price: f64,
        max_price: f64,
        levels: i64,
        current_price: f64,
        total_capital: f64,
    ) -> Self {
        Self {
            min_price,
            max_price,
            levels,
            current_price,
            total_capital,
            account_reference: None,
        }
    }

    /// Builder: attach caller context
    pub fn with_account_reference(mut self, reference: impl Into<String>) -> Self {
        self.account_reference = Some(reference.into());
        self
    }

    /// Capital apportioned to each rung
    pub fn capital_per_level(&self) -> f64 {
        if self.levels > 0 {
            self.total_capital / self.levels as f64
        } else {
            0.0
        }
    }

    /// The lowest rung carries the largest quantity; it must survive decimal rounding
    pub(crate) fn quantity_is_representable(&self) -> bool {
        let max_quantity = self.capital_per_level() / self.min_price;
        (max_quantity * 10f64.powi(QUANTITY_DECIMALS as i32)).is_finite()
    }

    /// Adjacent rungs stay distinct only while the step spans a few ulps of `max_price`
    pub(crate) fn step_is_resolvable(&self) -> bool {
        if self.levels <= 1 {
            return true;
        }
        let step = (self.max_price - self.min_price) / (self.levels - 1) as f64;
        step > self.max_price.abs() * f64::EPSILON * 4.0
    }

    /// Fail fast on inputs the calculator would otherwise collapse to an empty ladder.
    ///
    /// The calculator never calls this; callers that want an error instead of an
    /// empty result validate first.
    pub fn validate(&self) -> GridResult<()> {
        let scalars = [
            ("min_price", self.min_price),
            ("max_price", self.max_price),
            ("current_price", self.current_price),
            ("total_capital", self.total_capital),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(GridError::InvalidParameters(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }

        if self.levels <= 0 {
            return Err(GridError::InvalidParameters(format!(
                "levels must be positive, got {}",
                self.levels
            )));
        }

        if self.levels > MAX_LEVELS {
            return Err(GridError::InvalidParameters(format!(
                "levels must be at most {MAX_LEVELS}, got {}",
                self.levels
            )));
        }

        if self.min_price <= 0.0 {
            return Err(GridError::InvalidParameters(
                "min_price must be positive".into(),
            ));
        }

        if self.max_price <= self.min_price {
            return Err(GridError::InvalidParameters(
                "max_price must be greater than min_price".into(),
            ));
        }

        if !self.step_is_resolvable() {
            return Err(GridError::InvalidParameters(format!(
                "{} levels between {} and {} are closer than float resolution",
                self.levels, self.min_price, self.max_price
            )));
        }

        if self.current_price <= 0.0 {
            return Err(GridError::InvalidParameters(
                "current_price must be positive".into(),
            ));
        }

        if self.total_capital < 0.0 {
            return Err(GridError::InvalidParameters(
                "total_capital must not be negative".into(),
            ));
        }

        if !self.quantity_is_representable() {
            return Err(GridError::InvalidParameters(format!(
                "total_capital {} over {} levels overflows at min_price {}",
                self.total_capital, self.levels, self.min_price
            )));
        }

        Ok(())
    }
}

/// One rung of the ladder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLevel {
    pub price: f64,
    pub side: OrderSide,
    /// Base quantity, rounded to two decimals
    pub quantity: f64,
}

impl GridLevel {
    pub fn new(price: f64, side: OrderSide, quantity: f64) -> Self {
        Self {
            price,
            side,
            quantity,
        }
    }

    /// Quote value of the rung
    pub fn notional(&self) -> f64 {
        self.price * self.quantity
    }

    pub fn is_bid(&self) -> bool {
        self.side == OrderSide::Bid
    }
}
