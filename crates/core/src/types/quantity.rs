//! Line item quantity as submitted by the storefront.
//!
//! Quantities arrive as numbers or strings and are read with leading-integer
//! semantics: surrounding whitespace and an optional sign are accepted, and
//! parsing stops at the first non-digit. `"3 boxes"` is 3, `2.9` is 2.
//!
//! Input with no leading integer does not fail. It yields an invalid quantity
//! that serializes as JSON `null` and is forwarded to Shopify unchanged, which
//! leaves the decision to reject it with the store.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A parsed line item quantity.
///
/// `Quantity(None)` is the invalid quantity described in the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Option<i64>);

impl Quantity {
    /// Create a valid quantity.
    #[must_use]
    pub const fn new(quantity: i64) -> Self {
        Self(Some(quantity))
    }

    /// The invalid quantity.
    #[must_use]
    pub const fn invalid() -> Self {
        Self(None)
    }

    /// Parse a quantity from an arbitrary JSON value.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_i64().map_or_else(|| Self::from_float(n.as_f64()), Self::new),
            Value::String(s) => Self::parse(s),
            _ => Self::invalid(),
        }
    }

    /// Parse the leading integer of a string.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let s = input.trim_start();
        let (negative, rest) = match s.as_bytes().first() {
            Some(b'-') => (true, s.get(1..).unwrap_or_default()),
            Some(b'+') => (false, s.get(1..).unwrap_or_default()),
            _ => (false, s),
        };

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let Some(digits) = rest.get(..digits_end).filter(|d| !d.is_empty()) else {
            return Self::invalid();
        };

        // Out-of-range values are treated like any other unusable input
        digits
            .parse::<i64>()
            .ok()
            .map_or_else(Self::invalid, |n| Self::new(if negative { -n } else { n }))
    }

    #[allow(clippy::cast_possible_truncation)] // Truncation is the intended rounding
    fn from_float(value: Option<f64>) -> Self {
        match value {
            Some(f) if f.is_finite() && f.abs() < 9.0e18 => Self::new(f.trunc() as i64),
            _ => Self::invalid(),
        }
    }

    /// Whether the input contained a usable integer.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.0.is_some()
    }
}
