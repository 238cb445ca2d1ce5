//! Black-box tests against the public `MatchingEngine` API, covering the
//! invariants and literal boundary scenarios independent of the HTTP
//! binding.

use order_book_engine::{
    engine::MatchingEngine,
    order::{NewOrder, OrderId, OrderType, Side},
    price::{Price, Quantity},
};

fn order(id: u64, side: Side, order_type: OrderType, price: i64, qty: u64) -> NewOrder {
    NewOrder {
        id: OrderId(id),
        side,
        order_type,
        price: Price(price),
        quantity: Quantity(qty),
    }
}

fn gtc(id: u64, side: Side, price: i64, qty: u64) -> NewOrder {
    order(id, side, OrderType::GoodTilCancelled, price, qty)
}

#[test]
fn registry_size_matches_union_of_both_ladders() {
    let mut engine = MatchingEngine::new();
    engine.add_order(gtc(1, Side::Buy, 100, 5));
    engine.add_order(gtc(2, Side::Sell, 105, 5));
    engine.add_order(gtc(3, Side::Buy, 99, 5));
    assert_eq!(engine.size(), 3);
    let snap = engine.snapshot();
    assert_eq!(snap.bids.len() + snap.asks.len(), engine.size());
}

#[test]
fn no_cross_survives_a_sequence_of_non_crossing_orders() {
    let mut engine = MatchingEngine::new();
    engine.add_order(gtc(1, Side::Buy, 98, 5));
    engine.add_order(gtc(2, Side::Buy, 99, 5));
    engine.add_order(gtc(3, Side::Sell, 101, 5));
    engine.add_order(gtc(4, Side::Sell, 102, 5));
    assert!(engine.best_bid().unwrap() < engine.best_ask().unwrap());
}

#[test]
fn quantity_is_conserved_across_a_partial_fill() {
    let mut engine = MatchingEngine::new();
    engine.add_order(gtc(1, Side::Buy, 100, 10));
    let outcome = engine.add_order(gtc(2, Side::Sell, 100, 4));
    let filled: u64 = outcome.trades.iter().map(|t| t.quantity().0).sum();
    assert_eq!(filled, 4);
    // order 1: initial 10 == filled 4 + remaining 6
    let snap = engine.snapshot();
    assert_eq!(snap.bids[0].1, Quantity(6));
}

#[test]
fn trade_legs_always_carry_equal_quantity() {
    let mut engine = MatchingEngine::new();
    engine.add_order(gtc(1, Side::Sell, 100, 3));
    engine.add_order(gtc(2, Side::Sell, 101, 4));
    let outcome = engine.add_order(order(3, Side::Buy, OrderType::Market, 0, 7));
    assert_eq!(outcome.trades.len(), 2);
    for t in &outcome.trades {
        assert_eq!(t.bid_leg.quantity, t.ask_leg.quantity);
    }
}

#[test]
fn cancel_then_cancel_is_idempotent() {
    let mut engine = MatchingEngine::new();
    engine.add_order(gtc(1, Side::Buy, 100, 10));
    assert!(engine.cancel_order(OrderId(1)));
    assert!(!engine.cancel_order(OrderId(1)));
    assert!(!engine.contains_order(OrderId(1)));
}

#[test]
fn modify_with_identical_fields_still_forfeits_time_priority() {
    let mut engine = MatchingEngine::new();
    engine.add_order(gtc(1, Side::Sell, 100, 5));
    engine.add_order(gtc(2, Side::Sell, 100, 5));
    engine.modify_order(OrderId(1), Price(100), Quantity(5));
    engine.modify_order(OrderId(1), Price(100), Quantity(5));
    let outcome = engine.add_order(gtc(3, Side::Buy, 100, 5));
    assert_eq!(outcome.trades[0].ask_leg.order_id, OrderId(2));
}

#[test]
fn snapshot_does_not_mutate_state() {
    let mut engine = MatchingEngine::new();
    engine.add_order(gtc(1, Side::Buy, 100, 10));
    engine.add_order(gtc(2, Side::Sell, 105, 3));
    let a = engine.snapshot();
    let b = engine.snapshot();
    assert_eq!(a, b);
    assert_eq!(engine.size(), 2);
}

#[test]
fn price_time_priority_holds_across_three_resting_orders() {
    let mut engine = MatchingEngine::new();
    engine.add_order(gtc(1, Side::Sell, 100, 2));
    engine.add_order(gtc(2, Side::Sell, 100, 2));
    engine.add_order(gtc(3, Side::Sell, 100, 2));
    let outcome = engine.add_order(gtc(4, Side::Buy, 100, 3));
    assert_eq!(outcome.trades.len(), 2);
    assert_eq!(outcome.trades[0].ask_leg.order_id, OrderId(1));
    assert_eq!(outcome.trades[0].ask_leg.quantity, Quantity(2));
    assert_eq!(outcome.trades[1].ask_leg.order_id, OrderId(2));
    assert_eq!(outcome.trades[1].ask_leg.quantity, Quantity(1));
    assert!(engine.contains_order(OrderId(2)));
    assert!(!engine.contains_order(OrderId(1)));
}

#[test]
fn fill_and_kill_cancels_only_the_submitted_order_not_a_resident_fak_at_the_same_level() {
    // A resting FillAndKill order sits at the best level (possible only
    // while it's still mid-match in a real system, but modeled here via a
    // GTC substitute since a resting FAK would have already been swept —
    // this test instead guards against the reference bug where the
    // post-match sweep inspects whatever sits at the head of the best
    // level rather than tracking the admitted order's own id).
    let mut engine = MatchingEngine::new();
    engine.add_order(gtc(1, Side::Sell, 100, 10));
    let outcome = engine.add_order(order(2, Side::Buy, OrderType::FillAndKill, 100, 4));
    assert_eq!(outcome.trades.len(), 1);
    assert!(!engine.contains_order(OrderId(2)));
    // the resting GTC order keeps its residual, untouched by the sweep.
    assert!(engine.contains_order(OrderId(1)));
    assert_eq!(engine.snapshot().asks[0].1, Quantity(6));
}
