//! Grid calculator - turns a price band and capital into a ladder of rungs

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_LEVELS, QUANTITY_DECIMALS};
use crate::helpers::round_to_decimals;

use super::types::{GridLevel, GridParameters, OrderSide};

/// Inputs the calculator collapses to an empty ladder
fn is_degenerate(params: &GridParameters) -> bool {
    let finite = params.min_price.is_finite()
        && params.max_price.is_finite()
        && params.current_price.is_finite()
        && params.total_capital.is_finite();

    // A non-positive lowest rung would divide capital by zero or a negative price
    if !finite
        || params.levels <= 0
        || params.levels > MAX_LEVELS
        || params.max_price <= params.min_price
        || params.min_price <= 0.0
    {
        return true;
    }

    !params.step_is_resolvable() || !params.quantity_is_representable()
}

/// Common difference between adjacent rungs.
///
/// `None` for degenerate inputs and for a single rung, where no step exists.
pub fn price_step(params: &GridParameters) -> Option<f64> {
    if is_degenerate(params) || params.levels == 1 {
        return None;
    }
    Some((params.max_price - params.min_price) / (params.levels - 1) as f64)
}

/// Compute the ladder of rungs for `params`.
///
/// Rungs are evenly spaced from `min_price` to `max_price` inclusive and come out
/// in increasing price order. A rung strictly below `current_price` is a bid,
/// everything else (including a rung exactly at the current price) is an ask.
/// Each rung gets `total_capital / levels` of quote, converted to base at the
/// rung price and rounded to two decimals.
///
/// Degenerate inputs return an empty ladder: `levels <= 0` or above
/// [`MAX_LEVELS`], `max_price <= min_price`, `min_price <= 0`, any non-finite
/// scalar, a step too fine to keep rungs distinct, or capital so large relative
/// to `min_price` that the lowest rung's quantity overflows. A single level yields one rung
/// at `min_price` holding all the capital.
pub fn compute_grid_levels(params: &GridParameters) -> Vec<GridLevel> {
    if is_degenerate(params) {
        return Vec::new();
    }

    let capital_per_level = params.capital_per_level();
    let step = price_step(params).unwrap_or(0.0);

    (0..params.levels)
        .map(|i| {
            let price = params.min_price + i as f64 * step;
            let side = OrderSide::for_price(price, params.current_price);
            let quantity = round_to_decimals(capital_per_level / price, QUANTITY_DECIMALS);
            GridLevel::new(price, side, quantity)
        })
        .collect()
}

/// Per-side totals of a ladder
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GridSummary {
    pub num_bids: usize,
    pub num_asks: usize,
    /// Base quantity resting on the bid side
    pub bid_quantity: f64,
    /// Base quantity resting on the ask side
    pub ask_quantity: f64,
    /// Quote value of every rung, after quantity rounding
    pub total_notional: f64,
}

impl GridSummary {
    pub fn from_levels(levels: &[GridLevel]) -> Self {
        levels.iter().fold(Self::default(), |mut acc, level| {
            if level.is_bid() {
                acc.num_bids += 1;
                acc.bid_quantity += level.quantity;
            } else {
                acc.num_asks += 1;
                acc.ask_quantity += level.quantity;
            }
            acc.total_notional += level.notional();
            acc
        })
    }

    pub fn num_levels(&self) -> usize {
        self.num_bids + self.num_asks
    }
}
