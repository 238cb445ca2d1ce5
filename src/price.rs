//! Exact, tick-denominated price and quantity types.
//!
//! The reference implementation this engine is modeled on used a
//! floating-point price as a map key, which the design review flagged as a
//! correctness risk (`BTreeMap<f64, _>` has no total order and float
//! equality is not exact). Prices here are integral ticks: whatever
//! quantization the caller wants (cents, satoshis, basis points) is fixed
//! once at the boundary and the engine only ever compares integers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A price expressed in indivisible ticks.
///
/// Ticks are compared and ordered exactly; there is no rounding inside the
/// engine. Anything that accepts a decimal string (the HTTP API, the
/// scenario-file reader) must quantize at that boundary with
/// [`Price::from_decimal_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub i64);

impl Price {
    /// Parse a decimal string (e.g. `"101.50"`) into ticks at the given
    /// number of decimal places (`scale`). This is the boundary quantizer
    /// called out in the design notes: everything past this point in the
    /// engine deals in exact integers only.
    pub fn from_decimal_str(s: &str, scale: u32) -> Result<Self, PriceParseError> {
        let negative = s.starts_with('-');
        let s = s.strip_prefix('-').unwrap_or(s);
        let mut parts = s.splitn(2, '.');
        let whole = parts.next().unwrap_or("");
        let frac = parts.next().unwrap_or("");
        if whole.is_empty() && frac.is_empty() {
            return Err(PriceParseError::Empty);
        }
        if frac.len() as u32 > scale {
            return Err(PriceParseError::TooPrecise);
        }
        let whole: i64 = whole
            .parse()
            .map_err(|_| PriceParseError::NotANumber(s.to_string()))?;
        let mut frac_digits = frac.to_string();
        while (frac_digits.len() as u32) < scale {
            frac_digits.push('0');
        }
        let frac_value: i64 = if frac_digits.is_empty() {
            0
        } else {
            frac_digits
                .parse()
                .map_err(|_| PriceParseError::NotANumber(s.to_string()))?
        };
        let scale_factor = 10i64.pow(scale);
        let ticks = whole * scale_factor + frac_value;
        Ok(Price(if negative { -ticks } else { ticks }))
    }

    pub fn ticks(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(Price)
            .map_err(|_| PriceParseError::NotANumber(s.to_string()))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PriceParseError {
    #[error("empty price")]
    Empty,
    #[error("price has more fractional digits than the configured scale")]
    TooPrecise,
    #[error("`{0}` is not a valid price")]
    NotANumber(String),
}

/// A non-negative count of units. Zero is a valid, meaningful value (a
/// fully filled or fully cancelled order has `Quantity(0)` remaining).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(pub u64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn min(self, other: Quantity) -> Quantity {
        Quantity(self.0.min(other.0))
    }

    pub fn checked_sub(self, rhs: Quantity) -> Option<Quantity> {
        self.0.checked_sub(rhs.0).map(Quantity)
    }
}

impl std::ops::Add for Quantity {
    type Output = Quantity;
    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Quantity {
    type Output = Quantity;
    fn sub(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 - rhs.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
