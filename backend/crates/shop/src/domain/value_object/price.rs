//! Price Value Object
//!
//! Money is kept in integer cents. The wire format is a decimal number
//! (`12.5` means 1250 cents); conversion rounds to the nearest cent.

use std::fmt;
use std::iter::Sum;

use kernel::error::app_error::{AppError, AppResult};
use serde::{Serialize, Serializer};

use super::quantity::Quantity;

/// Upper bound for a single product price: 100 million in major units
pub const MAX_PRICE_CENTS: i64 = 10_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(i64);

impl Price {
    pub fn from_cents(cents: i64) -> AppResult<Self> {
        if !(0..=MAX_PRICE_CENTS).contains(&cents) {
            return Err(out_of_range());
        }
        Ok(Self(cents))
    }

    /// Parse a decimal amount from a request body
    pub fn from_decimal(amount: f64) -> AppResult<Self> {
        if !amount.is_finite() {
            return Err(out_of_range());
        }
        let cents = (amount * 100.0).round();
        if cents < 0.0 || cents > MAX_PRICE_CENTS as f64 {
            return Err(out_of_range());
        }
        Ok(Self(cents as i64))
    }

    /// Trusted value read back from the store
    pub fn from_db(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn as_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Line total for `quantity` units
    pub fn times(self, quantity: Quantity) -> Self {
        Self(self.0.saturating_mul(i64::from(quantity.get())))
    }
}

fn out_of_range() -> AppError {
    AppError::bad_request("Price must be a number between 0 and 100000000")
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.fold(0i64, |acc, p| acc.saturating_add(p.0)))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
