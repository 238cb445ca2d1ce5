//! Boundary error types. Internal invariant violations never surface here —
//! they're `debug_assert!`s inside the engine, not `Result`s, because a
//! valid external request can never trigger one.

use thiserror::Error;

/// Failures surfaced by the HTTP layer, mapped to a status code in
/// [`crate::api`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid side: {0}")]
    InvalidSide(String),
    #[error("invalid order type: {0}")]
    InvalidOrderType(String),
    #[error("invalid price: {0}")]
    InvalidPrice(#[from] crate::price::PriceParseError),
    #[error("order not found")]
    OrderNotFound,
}

/// Diagnostics for malformed scenario-replay input, carrying the 1-indexed
/// line number so a failure points back at the offending line.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("line {line}: unrecognized command `{token}`")]
    UnrecognizedCommand { line: usize, token: String },
    #[error("line {line}: expected `A <side> <type> <price> <qty>`, got `{text}`")]
    MalformedAdmit { line: usize, text: String },
    #[error("line {line}: expected `R <total> <bidLevels> <askLevels>`, got `{text}`")]
    MalformedAssertion { line: usize, text: String },
    #[error("line {line}: assertion failed: expected {expected:?}, got {actual:?}")]
    AssertionFailed {
        line: usize,
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },
}
