//! # Money Module
//!
//! Provides the `Money` type for unit prices and stock valuation.
//!
//! ## Integer Minor Units
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Prices are stored as INTEGER minor units, never as floats.            │
//! │                                                                         │
//! │    products.unit_price             = 15000                             │
//! │    transaction_details.unit_price  = 15000   (snapshot at insert)      │
//! │    dashboard total value           = Σ unit_price × stock              │
//! │                                                                         │
//! │  Sums over thousands of rows stay exact.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let price = Money::from_minor(2_500);
//! let line = price.multiply_quantity(4);
//! assert_eq!(line.minor(), 10_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Serializes as a bare integer so JSON payloads carry plain numbers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// Saturates instead of wrapping; a line worth more than `i64::MAX`
    /// minor units is not a real line.
    ///
    /// ## User Workflow
    /// ```text
    /// Detail row: P001 × 4 @ 2500
    ///      │
    ///      ▼
    /// multiply_quantity(4) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line value: 10000 (feeds RecordedMovement.total_value)
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl From<i64> for Money {
    fn from(minor: i64) -> Self {
        Money(minor)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply_quantity() {
        assert_eq!(Money::from_minor(299).multiply_quantity(3).minor(), 897);
        assert_eq!(Money::from_minor(299).multiply_quantity(0), Money::zero());
    }

    #[test]
    fn test_multiply_saturates() {
        let huge = Money::from_minor(i64::MAX / 2);
        assert_eq!(huge.multiply_quantity(3).minor(), i64::MAX);
    }

    #[test]
    fn test_sum_lines() {
        let total: Money = [100, 250, 650].into_iter().map(Money::from_minor).sum();
        assert_eq!(total.minor(), 1000);
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&Money::from_minor(15000)).unwrap();
        assert_eq!(json, "15000");

        let back: Money = serde_json::from_str("42").unwrap();
        assert_eq!(back.minor(), 42);
    }
}
