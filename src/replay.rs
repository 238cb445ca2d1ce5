//! Scenario-file replay: a tiny text format for driving a
//! [`MatchingEngine`] from a line-oriented script and asserting on its
//! resulting shape, used by the `replay` CLI subcommand and by
//! `tests/replay_tests.rs`.
//!
//! Grammar, one command per line (blank lines and `#`-prefixed comments are
//! skipped):
//!
//! ```text
//! A <side> <type> <price> <qty>     # admit an order
//! R <total> <bidLevels> <askLevels> # assert registry size + distinct price levels
//! ```

use tracing::info;

use crate::{
    engine::MatchingEngine,
    errors::ReplayError,
    order::{NewOrder, OrderIdGenerator, OrderType, Side},
    price::{Price, Quantity},
};

/// Run every line of `script` against `engine` in order. Returns the number
/// of `R` assertions that passed. Aborts at the first malformed line or
/// failed assertion.
pub fn run_scenario(
    engine: &mut MatchingEngine,
    id_gen: &dyn OrderIdGenerator,
    script: &str,
) -> Result<usize, ReplayError> {
    let mut assertions_passed = 0;

    for (idx, raw_line) in script.lines().enumerate() {
        let line = idx + 1;
        let text = raw_line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let mut fields = text.split_whitespace();
        match fields.next() {
            Some("A") => {
                let rest: Vec<&str> = fields.collect();
                let [side, order_type, price, qty] = rest[..] else {
                    return Err(ReplayError::MalformedAdmit {
                        line,
                        text: text.to_string(),
                    });
                };
                let malformed = || ReplayError::MalformedAdmit {
                    line,
                    text: text.to_string(),
                };
                let side: Side = side.parse().map_err(|_| malformed())?;
                let order_type: OrderType = order_type.parse().map_err(|_| malformed())?;
                let price: Price = price.parse().map_err(|_| malformed())?;
                let qty: u64 = qty.parse().map_err(|_| malformed())?;

                let id = id_gen.next_id();
                let outcome = engine.add_order(NewOrder {
                    id,
                    side,
                    order_type,
                    price,
                    quantity: Quantity(qty),
                });
                info!(line, order_id = %id, accepted = outcome.accepted, trades = outcome.trades.len(), "replay: admitted order");
            }
            Some("R") => {
                let rest: Vec<&str> = fields.collect();
                let [total, bid_levels, ask_levels] = rest[..] else {
                    return Err(ReplayError::MalformedAssertion {
                        line,
                        text: text.to_string(),
                    });
                };
                let malformed = || ReplayError::MalformedAssertion {
                    line,
                    text: text.to_string(),
                };
                let expected = (
                    total.parse::<usize>().map_err(|_| malformed())?,
                    bid_levels.parse::<usize>().map_err(|_| malformed())?,
                    ask_levels.parse::<usize>().map_err(|_| malformed())?,
                );
                let snapshot = engine.snapshot();
                let actual_bid_levels = snapshot
                    .bids
                    .iter()
                    .map(|(p, _)| *p)
                    .collect::<std::collections::BTreeSet<_>>()
                    .len();
                let actual_ask_levels = snapshot
                    .asks
                    .iter()
                    .map(|(p, _)| *p)
                    .collect::<std::collections::BTreeSet<_>>()
                    .len();
                let actual = (engine.size(), actual_bid_levels, actual_ask_levels);
                if actual != expected {
                    return Err(ReplayError::AssertionFailed {
                        line,
                        expected,
                        actual,
                    });
                }
                assertions_passed += 1;
                info!(line, ?expected, "replay: assertion passed");
            }
            Some(other) => {
                return Err(ReplayError::UnrecognizedCommand {
                    line,
                    token: other.to_string(),
                });
            }
            None => unreachable!("empty lines are skipped above"),
        }
    }

    Ok(assertions_passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::SequentialIdGenerator;

    #[test]
    fn admits_orders_and_checks_registry_shape() {
        let mut engine = MatchingEngine::new();
        let gen = SequentialIdGenerator::new();
        let script = "\
            A buy gtc 100 10\n\
            A sell gtc 101 5\n\
            R 2 1 1\n";
        let passed = run_scenario(&mut engine, &gen, script).unwrap();
        assert_eq!(passed, 1);
    }

    #[test]
    fn crossing_orders_reduce_registry_size() {
        let mut engine = MatchingEngine::new();
        let gen = SequentialIdGenerator::new();
        let script = "\
            A buy gtc 100 10\n\
            A sell gtc 100 10\n\
            R 0 0 0\n";
        run_scenario(&mut engine, &gen, script).unwrap();
    }

    #[test]
    fn blank_lines_and_comments_are_skipped() {
        let mut engine = MatchingEngine::new();
        let gen = SequentialIdGenerator::new();
        let script = "\n# a comment\nA buy gtc 100 1\n\nR 1 1 0\n";
        assert_eq!(run_scenario(&mut engine, &gen, script).unwrap(), 1);
    }

    #[test]
    fn unrecognized_command_is_a_replay_error() {
        let mut engine = MatchingEngine::new();
        let gen = SequentialIdGenerator::new();
        let err = run_scenario(&mut engine, &gen, "X 1 2 3\n").unwrap_err();
        assert!(matches!(err, ReplayError::UnrecognizedCommand { line: 1, .. }));
    }

    #[test]
    fn failed_assertion_aborts_with_diagnostic() {
        let mut engine = MatchingEngine::new();
        let gen = SequentialIdGenerator::new();
        let script = "A buy gtc 100 10\nR 5 5 5\n";
        let err = run_scenario(&mut engine, &gen, script).unwrap_err();
        assert!(matches!(err, ReplayError::AssertionFailed { line: 2, .. }));
    }

    #[test]
    fn malformed_admit_line_reports_its_number() {
        let mut engine = MatchingEngine::new();
        let gen = SequentialIdGenerator::new();
        let err = run_scenario(&mut engine, &gen, "A buy gtc 100\n").unwrap_err();
        assert!(matches!(err, ReplayError::MalformedAdmit { line: 1, .. }));
    }
}
