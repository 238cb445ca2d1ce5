//! Trade records produced by the matching loop.

use serde::{Deserialize, Serialize};

use crate::{
    order::OrderId,
    price::{Price, Quantity},
};

/// One side of a matched trade: which order it was, at what price, for how
/// much.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeLeg {
    pub order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
}

/// A single match between a resting bid and a resting ask. Both legs carry
/// the same quantity by construction (`min` of the two participants'
/// remaining quantity at match time); each leg's price is the *resting*
/// order's own price — the counterparty receives whatever price-improvement
/// that resting order had already posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub bid_leg: TradeLeg,
    pub ask_leg: TradeLeg,
}

impl Trade {
    pub fn quantity(&self) -> Quantity {
        debug_assert_eq!(self.bid_leg.quantity, self.ask_leg.quantity);
        self.bid_leg.quantity
    }
}
