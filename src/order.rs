//! Order identity, sides, disciplines, and the canonical order record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::price::{Price, Quantity};

/// Opaque per-order identifier. The engine never generates these itself —
/// see [`OrderIdGenerator`] — it only ever compares and stores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which book side an order rests on / which side of a trade it takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" | "b" => Ok(Side::Buy),
            "sell" | "s" => Ok(Side::Sell),
            other => Err(format!("invalid side: `{other}`")),
        }
    }
}

/// Order discipline. See the matching-engine module docs for admission
/// semantics of each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    /// Rests until matched or cancelled.
    GoodTilCancelled,
    /// Immediate-or-cancel: any unmatched residual after the current
    /// matching pass is withdrawn.
    FillAndKill,
    /// All-or-nothing: admitted only if the full initial quantity can
    /// match immediately, otherwise rejected before entering the book.
    FillOrKill,
    /// Rewritten on admission into a marketable `GoodTilCancelled` limit at
    /// the opposite side's worst price; rejected if that side is empty.
    Market,
}

impl std::str::FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "goodtilcancelled" | "goodtillcancel" | "gtc" => Ok(OrderType::GoodTilCancelled),
            "fillandkill" | "fak" | "ioc" => Ok(OrderType::FillAndKill),
            "fillorkill" | "fok" | "aon" => Ok(OrderType::FillOrKill),
            "market" => Ok(OrderType::Market),
            other => Err(format!("invalid order type: `{other}`")),
        }
    }
}

/// The caller-visible shape of an order about to be submitted. `price` is
/// ignored (and may be absent) for `Market` orders — the engine fills it in
/// during admission.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: OrderId,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Price,
    pub quantity: Quantity,
}

/// The canonical, single mutable copy of a resident order's state.
///
/// Exactly one of these exists per live order, owned by the
/// [`crate::registry::OrderRegistry`]; both ladders only ever hold an
/// [`OrderId`] pointing back at it. This is the corrected architecture
/// called out in the design notes — the reference implementation stored an
/// order by value in both the ladder queue and the registry, so a fill
/// applied through one handle was invisible through the other.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Price,
    pub initial_qty: Quantity,
    pub remaining_qty: Quantity,
}

impl Order {
    pub fn new(new_order: NewOrder) -> Self {
        Order {
            id: new_order.id,
            side: new_order.side,
            order_type: new_order.order_type,
            price: new_order.price,
            initial_qty: new_order.quantity,
            remaining_qty: new_order.quantity,
        }
    }

    pub fn filled_qty(&self) -> Quantity {
        self.initial_qty - self.remaining_qty
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_qty.is_zero()
    }

    /// Apply a fill of `qty` units. `qty` must never exceed `remaining_qty`
    /// — the matching loop always computes it as a `min`, so this is an
    /// internal invariant, not a user-reachable error path.
    pub fn fill(&mut self, qty: Quantity) {
        debug_assert!(
            qty <= self.remaining_qty,
            "fill of {qty} exceeds remaining {rem}",
            rem = self.remaining_qty
        );
        self.remaining_qty = self.remaining_qty - qty;
    }
}

/// Generates fresh order identifiers for callers that don't supply their
/// own. Order-ID strategy is explicitly delegated by the core engine to
/// this trait — the engine itself never invents an id.
pub trait OrderIdGenerator: Send + Sync {
    fn next_id(&self) -> OrderId;
}

/// A simple monotonically increasing generator, suitable for the CLI and
/// scenario replay where determinism is useful.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: std::sync::atomic::AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self {
            next: std::sync::atomic::AtomicU64::new(1),
        }
    }
}

impl OrderIdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> OrderId {
        OrderId(self.next.fetch_add(1, std::sync::atomic::Ordering::Relaxed))
    }
}

/// Generates ids from random `u64`s, the style the HTTP layer uses so
/// concurrently-submitting clients never collide.
#[derive(Debug, Default)]
pub struct RandomIdGenerator;

impl OrderIdGenerator for RandomIdGenerator {
    fn next_id(&self) -> OrderId {
        OrderId(uuid::Uuid::new_v4().as_u128() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_qty_is_derived() {
        let mut o = Order::new(NewOrder {
            id: OrderId(1),
            side: Side::Buy,
            order_type: OrderType::GoodTilCancelled,
            price: Price(100),
            quantity: Quantity(10),
        });
        assert_eq!(o.filled_qty(), Quantity(0));
        o.fill(Quantity(4));
        assert_eq!(o.filled_qty(), Quantity(4));
        assert_eq!(o.remaining_qty, Quantity(6));
        assert!(!o.is_filled());
        o.fill(Quantity(6));
        assert!(o.is_filled());
    }

    #[test]
    fn side_parses_shorthand() {
        assert_eq!("b".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!("SELL".parse::<Side>().unwrap(), Side::Sell);
        assert!("hold".parse::<Side>().is_err());
    }

    #[test]
    fn order_type_parses_aliases_case_insensitively() {
        assert_eq!(
            "GoodTillCancel".parse::<OrderType>().unwrap(),
            OrderType::GoodTilCancelled
        );
        assert_eq!("fak".parse::<OrderType>().unwrap(), OrderType::FillAndKill);
        assert_eq!("FOK".parse::<OrderType>().unwrap(), OrderType::FillOrKill);
        assert_eq!("market".parse::<OrderType>().unwrap(), OrderType::Market);
    }

    #[test]
    fn sequential_generator_is_monotonic() {
        let gen = SequentialIdGenerator::new();
        let a = gen.next_id();
        let b = gen.next_id();
        assert!(b.0 > a.0);
    }
}
