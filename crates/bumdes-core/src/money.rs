//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A ledger that drifts by one rupiah per reconciliation is a ledger     │
//! │  nobody trusts at the end of the fiscal year.                          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Rupiah                                           │
//! │    All amounts are whole rupiah (IDR has no circulating sub-unit),     │
//! │    stored as i64. Signed, because ledger deltas can be negative.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bumdes_core::money::Money;
//!
//! let tariff = Money::from_rupiah(250_000); // Rp250.000
//!
//! // Arithmetic operations
//! let two_hours = tariff * 2;                       // Rp500.000
//! let total = two_hours + Money::from_rupiah(50_000); // Rp550.000
//!
//! // NEVER do this:
//! // let bad = Money::from_float(250000.0); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in whole rupiah.
///
/// ## Design Decisions
/// - **i64 (signed)**: Ledger deltas are negative for expenses
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// Tariff.price ──► Rental.total (price × quantity, or flat override)
///       │
///       └──► LedgerEntry.balance_before / balance_after
///                  │
///                  └──► Statement rows, monthly aggregates
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole rupiah.
    ///
    /// ## Example
    /// ```rust
    /// use bumdes_core::money::Money;
    ///
    /// let price = Money::from_rupiah(250_000);
    /// assert_eq!(price.rupiah(), 250_000);
    /// ```
    #[inline]
    pub const fn from_rupiah(rupiah: i64) -> Self {
        Money(rupiah)
    }

    /// Returns the value in whole rupiah.
    #[inline]
    pub const fn rupiah(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    ///
    /// ## Example
    /// ```rust
    /// use bumdes_core::money::Money;
    ///
    /// let delta = Money::from_rupiah(-75_000);
    /// assert_eq!(delta.abs().rupiah(), 75_000);
    /// ```
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity (hours, m³, months, participants).
    ///
    /// ## Example
    /// ```rust
    /// use bumdes_core::money::Money;
    ///
    /// let hourly = Money::from_rupiah(100_000); // futsal field, per hour
    /// let total = hourly.multiply_quantity(3);
    /// assert_eq!(total.rupiah(), 300_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in the Indonesian convention:
/// `Rp` prefix, dot as thousands separator.
///
/// ## Note
/// This is for logs and debugging. The frontend formats for display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.abs().to_string();

        // Group digits in threes from the right: 1250000 -> 1.250.000
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        let offset = digits.len() % 3;
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (i + 3 - offset) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }

        write!(f, "{}Rp{}", sign, grouped)
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Negation (income delta ↔ expense delta).
impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Summation over iterators (report totals).
impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rupiah() {
        let money = Money::from_rupiah(250_000);
        assert_eq!(money.rupiah(), 250_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_rupiah(0)), "Rp0");
        assert_eq!(format!("{}", Money::from_rupiah(500)), "Rp500");
        assert_eq!(format!("{}", Money::from_rupiah(1_500)), "Rp1.500");
        assert_eq!(format!("{}", Money::from_rupiah(250_000)), "Rp250.000");
        assert_eq!(format!("{}", Money::from_rupiah(1_250_000)), "Rp1.250.000");
        assert_eq!(format!("{}", Money::from_rupiah(-75_000)), "-Rp75.000");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_rupiah(100_000);
        let b = Money::from_rupiah(25_000);

        assert_eq!((a + b).rupiah(), 125_000);
        assert_eq!((a - b).rupiah(), 75_000);
        let result: Money = a * 3;
        assert_eq!(result.rupiah(), 300_000);
        assert_eq!((-a).rupiah(), -100_000);
    }

    #[test]
    fn test_multiply_quantity() {
        let hourly = Money::from_rupiah(100_000);
        assert_eq!(hourly.multiply_quantity(3).rupiah(), 300_000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_rupiah(100);
        assert!(positive.is_positive());

        let negative = Money::from_rupiah(-100);
        assert!(negative.is_negative());
    }

    #[test]
    fn test_sum() {
        let total: Money = [100_000, 250_000, -50_000]
            .iter()
            .map(|r| Money::from_rupiah(*r))
            .sum();
        assert_eq!(total.rupiah(), 300_000);
    }
}
