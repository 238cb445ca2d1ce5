//! The matching engine: owns both price ladders and the order registry,
//! and implements admission, matching, cancellation, and snapshotting.
//!
//! This is a single-threaded cooperative state machine (see the crate's
//! concurrency notes in [`crate::state`]) — every public method here runs
//! to completion before the next one may start; callers that need
//! multi-client access serialize around it rather than the engine
//! serializing internally.

use tracing::{info, warn};

use crate::{
    ladder::{Direction, PriceLadder},
    order::{NewOrder, Order, OrderId, OrderType, Side},
    price::{Price, Quantity},
    registry::OrderRegistry,
    trade::{Trade, TradeLeg},
};

/// Result of a single `add_order`/`modify_order` call: the id the order
/// was (or would have been) admitted under, whether it was accepted, and
/// any trades the submission produced.
///
/// Rejection is signalled by `accepted == false` and an empty `trades`
/// list — the engine never raises an error for a rejected admission, per
/// the error-handling design (duplicate ids, a marketable order with no
/// opposite liquidity, FillAndKill with no cross, and FillOrKill without
/// sufficient depth are all just rejections, not faults).
#[derive(Debug, Clone)]
pub struct AddOutcome {
    pub order_id: OrderId,
    pub accepted: bool,
    pub trades: Vec<Trade>,
}

impl AddOutcome {
    fn rejected(order_id: OrderId) -> Self {
        AddOutcome {
            order_id,
            accepted: false,
            trades: Vec::new(),
        }
    }
}

/// A point-in-time view of the resting book: per-order `(price,
/// remaining_qty)` pairs on each side, in that side's price priority
/// order. This enumerates individual resident orders rather than
/// aggregating by price level, matching the reference implementation's
/// `GetOrderInfos` — callers that want aggregated depth can fold this
/// themselves.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookSnapshot {
    pub bids: Vec<(Price, Quantity)>,
    pub asks: Vec<(Price, Quantity)>,
}

pub struct MatchingEngine {
    bids: PriceLadder,
    asks: PriceLadder,
    registry: OrderRegistry,
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self {
            bids: PriceLadder::new(Direction::Descending),
            asks: PriceLadder::new(Direction::Ascending),
            registry: OrderRegistry::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.registry.len()
    }

    /// Whether `id` is currently resident (used by the HTTP layer to turn
    /// an unknown id into a `404` rather than a silent no-op response).
    pub fn contains_order(&self, id: OrderId) -> bool {
        self.registry.contains(id)
    }

    pub fn snapshot(&self) -> BookSnapshot {
        let bids = self
            .bids
            .iter_levels()
            .flat_map(|(price, queue)| {
                queue
                    .iter()
                    .map(move |id| (price, self.registry.get(*id).expect("resident").remaining_qty))
            })
            .collect();
        let asks = self
            .asks
            .iter_levels()
            .flat_map(|(price, queue)| {
                queue
                    .iter()
                    .map(move |id| (price, self.registry.get(*id).expect("resident").remaining_qty))
            })
            .collect();
        BookSnapshot { bids, asks }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    fn ladder(&self, side: Side) -> &PriceLadder {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn ladder_mut(&mut self, side: Side) -> &mut PriceLadder {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// `canMatch` from the admission protocol: true iff the opposite side
    /// is non-empty and `price` crosses its best price.
    fn can_match(&self, side: Side, price: Price) -> bool {
        match side {
            Side::Buy => self.asks.best_price().is_some_and(|ask| price >= ask),
            Side::Sell => self.bids.best_price().is_some_and(|bid| price <= bid),
        }
    }

    /// `canMatchCompletely`, with the corrected semantics: sums the
    /// resting quantity across *every* opposite-side level that crosses
    /// `price`, not just the best level. The reference implementation
    /// only checked the best level's total, which would erroneously
    /// reject a FillOrKill that could be satisfied by sweeping multiple
    /// levels. Per-level depth goes through `PriceLadder::total_at_price`
    /// rather than re-summing queues by hand.
    fn can_match_completely(&self, side: Side, price: Price, quantity: Quantity) -> bool {
        let opposite = self.ladder(side.opposite());
        if opposite.is_empty() {
            return false;
        }
        if !self.can_match(side, price) {
            return false;
        }
        let remaining_of = |id: OrderId| {
            self.registry.get(id).map(|o| o.remaining_qty.0).unwrap_or(0)
        };
        let total: u64 = opposite
            .crossing_levels(price)
            .map(|(level_price, _)| opposite.total_at_price(level_price, remaining_of))
            .sum();
        Quantity(total) >= quantity
    }

    /// Rewrite a `Market` order into a marketable `GoodTilCancelled` limit
    /// priced at the opposite side's *worst* price — preserved verbatim
    /// from the reference as a documented design choice (it guarantees a
    /// market order sweeps the entire opposite side, and no further).
    /// Returns `None` (reject) if the opposite side is empty.
    fn normalize(&self, new_order: NewOrder) -> Option<NewOrder> {
        if new_order.order_type != OrderType::Market {
            return Some(new_order);
        }
        let worst_opposite = match new_order.side {
            Side::Buy => self.asks.worst_price(),
            Side::Sell => self.bids.worst_price(),
        }?;
        Some(NewOrder {
            price: worst_opposite,
            order_type: OrderType::GoodTilCancelled,
            ..new_order
        })
    }

    /// Admit `new_order`, running the full protocol: duplicate check,
    /// market rewrite, FillAndKill/FillOrKill pre-checks, insertion, and a
    /// matching pass. Returns the trades produced by this submission.
    pub fn add_order(&mut self, new_order: NewOrder) -> AddOutcome {
        let id = new_order.id;

        if self.registry.contains(id) {
            warn!(order_id = %id, "rejected: duplicate order id");
            return AddOutcome::rejected(id);
        }

        let Some(new_order) = self.normalize(new_order) else {
            warn!(order_id = %id, "rejected: market order has no opposite-side liquidity");
            return AddOutcome::rejected(id);
        };

        if new_order.order_type == OrderType::FillAndKill
            && !self.can_match(new_order.side, new_order.price)
        {
            warn!(order_id = %id, "rejected: FillAndKill has no cross at admission");
            return AddOutcome::rejected(id);
        }

        if new_order.order_type == OrderType::FillOrKill
            && !self.can_match_completely(new_order.side, new_order.price, new_order.quantity)
        {
            warn!(order_id = %id, "rejected: FillOrKill cannot fill completely");
            return AddOutcome::rejected(id);
        }

        let side = new_order.side;
        let price = new_order.price;
        let order_type = new_order.order_type;
        let order = Order::new(new_order);
        self.registry.insert(order);
        self.ladder_mut(side).add(price, id);
        info!(order_id = %id, ?side, ?order_type, %price, "order admitted");

        let trades = self.match_orders();

        // FillAndKill sweep: cancel the order we just admitted, by id, if
        // it still has an unfilled residual. The reference implementation
        // inspected whichever order happened to sit at the best price
        // level after matching, which can spuriously cancel an unrelated
        // resting FillAndKill order that happens to be at the head of the
        // book. Tracking the admitted id directly avoids that.
        if order_type == OrderType::FillAndKill {
            if let Some(resting) = self.registry.get(id) {
                if !resting.remaining_qty.is_zero() {
                    info!(order_id = %id, "FillAndKill sweep: cancelling unfilled residual");
                    self.cancel_order(id);
                }
            }
        }

        AddOutcome {
            order_id: id,
            accepted: true,
            trades,
        }
    }

    /// Run the matching loop until no cross remains: repeatedly pair the
    /// best bid against the best ask, filling at the resting side's price,
    /// in strict price-time priority.
    fn match_orders(&mut self) -> Vec<Trade> {
        let mut trades = Vec::new();

        loop {
            let (Some(bid_price), Some(ask_price)) = (self.bids.best_price(), self.asks.best_price())
            else {
                break;
            };
            if bid_price < ask_price {
                break;
            }

            loop {
                let Some(bid_id) = self.bids.queue_at(bid_price).and_then(|q| q.front().copied())
                else {
                    break;
                };
                let Some(ask_id) = self.asks.queue_at(ask_price).and_then(|q| q.front().copied())
                else {
                    break;
                };

                let quantity = {
                    let bid_order = self.registry.get(bid_id).expect("bid resident");
                    let ask_order = self.registry.get(ask_id).expect("ask resident");
                    bid_order.remaining_qty.min(ask_order.remaining_qty)
                };

                self.registry.get_mut(bid_id).expect("bid resident").fill(quantity);
                self.registry.get_mut(ask_id).expect("ask resident").fill(quantity);

                trades.push(Trade {
                    bid_leg: TradeLeg {
                        order_id: bid_id,
                        price: bid_price,
                        quantity,
                    },
                    ask_leg: TradeLeg {
                        order_id: ask_id,
                        price: ask_price,
                        quantity,
                    },
                });

                if self.registry.get(bid_id).expect("bid resident").is_filled() {
                    self.bids.remove_order(bid_price, bid_id);
                    self.registry.remove(bid_id);
                }
                if self.registry.get(ask_id).expect("ask resident").is_filled() {
                    self.asks.remove_order(ask_price, ask_id);
                    self.registry.remove(ask_id);
                }
            }
        }

        trades
    }

    /// Cancel a resting order by id. A no-op (returns `false`) if the id
    /// isn't resident — cancelling an unknown or already-settled order is
    /// idempotent, not an error.
    pub fn cancel_order(&mut self, id: OrderId) -> bool {
        let Some(order) = self.registry.get(id) else {
            return false;
        };
        let side = order.side;
        let price = order.price;
        let removed = self.ladder_mut(side).remove_order(price, id);
        debug_assert!(removed, "registry/ladder fell out of sync for order {id}");
        self.registry.remove(id);
        true
    }

    /// Cancel the order with this id, then admit `replacement` (which must
    /// carry the same id). The replacement re-enters the tail of its price
    /// queue — modification always forfeits time priority, by design.
    pub fn modify_order(&mut self, id: OrderId, new_price: Price, new_quantity: Quantity) -> AddOutcome {
        let Some(existing) = self.registry.get(id) else {
            return AddOutcome::rejected(id);
        };
        let side = existing.side;
        let order_type = existing.order_type;
        self.cancel_order(id);
        self.add_order(NewOrder {
            id,
            side,
            order_type,
            price: new_price,
            quantity: new_quantity,
        })
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}
