//! Unit price type backed by decimal arithmetic.
//!
//! Supabase returns `numeric` columns as JSON numbers, while the persisted
//! cart snapshot historically stored prices as plain numbers too; some
//! seed tooling writes them as strings. [`Price`] therefore deserializes
//! from either representation and keeps the exact decimal value internally.
//! Display rounds to two decimals; arithmetic does not.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A unit price in the store's single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Line subtotal for `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }

    /// Format for display, rounded to two decimals (e.g., `$19.99`).
    ///
    /// Midpoints round away from zero. Formatting alone would truncate,
    /// so the amount is rounded first.
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.rounded())
    }

    fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.rounded())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        let amount = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Decimal::from_f64(n)
                .ok_or_else(|| D::Error::custom(format!("price out of range: {n}")))?,
            Raw::Text(s) => s
                .trim()
                .parse::<Decimal>()
                .map_err(|e| D::Error::custom(format!("invalid price {s:?}: {e}")))?,
        };

        Ok(Self(amount))
    }
}
