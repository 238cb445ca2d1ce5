//! Sorted price ladder: groups resident orders by price, with price
//! levels iterated in a fixed direction and, within a level, in strict
//! insertion (time-priority) order.
//!
//! The reference implementation kept its keys in a flat array and resorted
//! it on every insert — fine for a handful of price levels, quadratic for a
//! real book. This ladder keys a [`BTreeMap`] directly, so `best_price`,
//! `worst_price`, and level insertion are all `O(log L)` in the number of
//! distinct price levels `L`, with no resort step.
//!
//! Queues hold [`OrderId`] rather than full [`Order`] values — see
//! [`crate::registry::OrderRegistry`] for why the canonical order record
//! lives there instead.

use std::collections::{BTreeMap, VecDeque};

use crate::{order::OrderId, price::Price};

/// Fixed iteration direction for a ladder. Bids are `Descending` (the
/// highest price is "first"); asks are `Ascending` (the lowest price is
/// "first").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

pub struct PriceLadder {
    direction: Direction,
    levels: BTreeMap<Price, VecDeque<OrderId>>,
}

impl PriceLadder {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            levels: BTreeMap::new(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Append `order_id` to the queue at `price`, creating the level if it
    /// doesn't exist yet.
    pub fn add(&mut self, price: Price, order_id: OrderId) {
        self.levels.entry(price).or_default().push_back(order_id);
    }

    /// Remove a specific order from its price level by id. Returns `true`
    /// if it was found. Drops the level if its queue becomes empty.
    ///
    /// This is `O(Q_p)` in the queue length at that price: the registry
    /// doesn't keep a back-reference into the queue, trading a small
    /// cancellation cost for not having to keep a second index in sync.
    pub fn remove_order(&mut self, price: Price, order_id: OrderId) -> bool {
        let Some(queue) = self.levels.get_mut(&price) else {
            return false;
        };
        let Some(pos) = queue.iter().position(|id| *id == order_id) else {
            return false;
        };
        queue.remove(pos);
        if queue.is_empty() {
            self.levels.remove(&price);
        }
        true
    }

    /// Drop a price level entirely, regardless of its contents.
    pub fn remove_price(&mut self, price: Price) {
        self.levels.remove(&price);
    }

    /// The best (first, in this ladder's direction) price level, if any.
    pub fn best_price(&self) -> Option<Price> {
        match self.direction {
            Direction::Ascending => self.levels.keys().next().copied(),
            Direction::Descending => self.levels.keys().next_back().copied(),
        }
    }

    /// The worst (last, in this ladder's direction) price level, if any.
    pub fn worst_price(&self) -> Option<Price> {
        match self.direction {
            Direction::Ascending => self.levels.keys().next_back().copied(),
            Direction::Descending => self.levels.keys().next().copied(),
        }
    }

    pub fn queue_at(&self, price: Price) -> Option<&VecDeque<OrderId>> {
        self.levels.get(&price)
    }

    pub fn queue_at_mut(&mut self, price: Price) -> Option<&mut VecDeque<OrderId>> {
        self.levels.get_mut(&price)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> usize {
        self.levels.len()
    }

    pub fn total_at_price(&self, price: Price, lookup_remaining: impl Fn(OrderId) -> u64) -> u64 {
        self.levels
            .get(&price)
            .map(|q| q.iter().map(|id| lookup_remaining(*id)).sum())
            .unwrap_or(0)
    }

    /// Iterate price levels in the ladder's declared direction, each paired
    /// with its queue. Used for sweeping (market rewrite, FillOrKill depth
    /// check) and for snapshotting.
    pub fn iter_levels(&self) -> Box<dyn Iterator<Item = (Price, &VecDeque<OrderId>)> + '_> {
        match self.direction {
            Direction::Ascending => Box::new(self.levels.iter().map(|(p, q)| (*p, q))),
            Direction::Descending => Box::new(self.levels.iter().rev().map(|(p, q)| (*p, q))),
        }
    }

    /// All distinct price levels whose price "crosses" a given limit, in
    /// the ladder's iteration direction. For the ask ladder a crossing
    /// level is one whose price is `<= limit`; for the bid ladder it's one
    /// whose price is `>= limit`. Used by the corrected
    /// `can_match_completely` (summing depth across every crossing level,
    /// not just the best one).
    pub fn crossing_levels(
        &self,
        limit: Price,
    ) -> Box<dyn Iterator<Item = (Price, &VecDeque<OrderId>)> + '_> {
        match self.direction {
            // Ascending ladder (asks): crossing levels are price <= limit,
            // which are exactly the leading levels in ascending order.
            Direction::Ascending => {
                Box::new(self.levels.range(..=limit).map(|(p, q)| (*p, q)))
            }
            // Descending ladder (bids): crossing levels are price >= limit,
            // the leading levels when iterated high-to-low.
            Direction::Descending => {
                Box::new(self.levels.range(limit..).rev().map(|(p, q)| (*p, q)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(ladder: &PriceLadder, price: Price) -> Vec<u64> {
        ladder
            .queue_at(price)
            .map(|q| q.iter().map(|id| id.0).collect())
            .unwrap_or_default()
    }

    #[test]
    fn bids_best_price_is_highest() {
        let mut bids = PriceLadder::new(Direction::Descending);
        bids.add(Price(100), OrderId(1));
        bids.add(Price(105), OrderId(2));
        bids.add(Price(98), OrderId(3));
        assert_eq!(bids.best_price(), Some(Price(105)));
        assert_eq!(bids.worst_price(), Some(Price(98)));
    }

    #[test]
    fn asks_best_price_is_lowest() {
        let mut asks = PriceLadder::new(Direction::Ascending);
        asks.add(Price(100), OrderId(1));
        asks.add(Price(105), OrderId(2));
        asks.add(Price(98), OrderId(3));
        assert_eq!(asks.best_price(), Some(Price(98)));
        assert_eq!(asks.worst_price(), Some(Price(105)));
    }

    #[test]
    fn queue_within_a_level_preserves_insertion_order() {
        let mut asks = PriceLadder::new(Direction::Ascending);
        asks.add(Price(100), OrderId(1));
        asks.add(Price(100), OrderId(2));
        asks.add(Price(100), OrderId(3));
        assert_eq!(ids(&asks, Price(100)), vec![1, 2, 3]);
    }

    #[test]
    fn removing_last_order_at_a_level_drops_the_level() {
        let mut asks = PriceLadder::new(Direction::Ascending);
        asks.add(Price(100), OrderId(1));
        assert!(asks.remove_order(Price(100), OrderId(1)));
        assert!(asks.is_empty());
        assert_eq!(asks.levels(), 0);
    }

    #[test]
    fn removing_unknown_order_is_a_no_op() {
        let mut asks = PriceLadder::new(Direction::Ascending);
        asks.add(Price(100), OrderId(1));
        assert!(!asks.remove_order(Price(100), OrderId(999)));
        assert!(!asks.remove_order(Price(200), OrderId(1)));
        assert_eq!(ids(&asks, Price(100)), vec![1]);
    }

    #[test]
    fn crossing_levels_for_descending_ladder_are_prices_at_or_above_limit() {
        let mut bids = PriceLadder::new(Direction::Descending);
        bids.add(Price(100), OrderId(1));
        bids.add(Price(101), OrderId(2));
        bids.add(Price(99), OrderId(3));
        let crossing: Vec<Price> = bids.crossing_levels(Price(100)).map(|(p, _)| p).collect();
        assert_eq!(crossing, vec![Price(101), Price(100)]);
    }

    #[test]
    fn total_at_price_sums_remaining_via_the_lookup_closure() {
        let mut asks = PriceLadder::new(Direction::Ascending);
        asks.add(Price(100), OrderId(1));
        asks.add(Price(100), OrderId(2));
        asks.add(Price(101), OrderId(3));
        let remaining = |id: OrderId| match id.0 {
            1 => 4,
            2 => 6,
            3 => 9,
            _ => 0,
        };
        assert_eq!(asks.total_at_price(Price(100), remaining), 10);
        assert_eq!(asks.total_at_price(Price(101), remaining), 9);
        assert_eq!(asks.total_at_price(Price(999), remaining), 0);
    }

    #[test]
    fn crossing_levels_for_ascending_ladder_are_prices_at_or_below_limit() {
        let mut asks = PriceLadder::new(Direction::Ascending);
        asks.add(Price(100), OrderId(1));
        asks.add(Price(101), OrderId(2));
        asks.add(Price(99), OrderId(3));
        let crossing: Vec<Price> = asks.crossing_levels(Price(100)).map(|(p, _)| p).collect();
        assert_eq!(crossing, vec![Price(99), Price(100)]);
    }
}
