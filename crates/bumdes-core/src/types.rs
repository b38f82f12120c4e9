//! # Domain Types
//!
//! Core domain types for the BUMDes ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌────────────────┐    ┌────────────────┐    ┌────────────────┐        │
//! │  │  BusinessUnit  │    │     Tariff     │    │     Rental     │        │
//! │  │  ────────────  │    │  ────────────  │    │  ────────────  │        │
//! │  │  id (UUID)     │◄───│  unit_id (FK)  │◄───│  tariff_id     │        │
//! │  │  name          │    │  category      │    │  party_name    │        │
//! │  │                │    │  price_rupiah  │    │  quantity      │        │
//! │  │                │    │  uom           │    │  total_rupiah  │        │
//! │  └───────┬────────┘    └────────────────┘    └───────┬────────┘        │
//! │          │                                           │                  │
//! │          │  ┌────────────────┐    ┌─────────────┐    │                  │
//! │          ├──│ InitialBalance │    │   Income    │◄───┘ (1:1)           │
//! │          │  └────────────────┘    └──────┬──────┘                       │
//! │          │  ┌────────────────┐           │                              │
//! │          ├──│    Expense     │───┐       │                              │
//! │          │  └────────────────┘   │       │                              │
//! │          │  ┌─────────────────────▼───────▼──┐                          │
//! │          └──│          LedgerEntry           │  one per financial      │
//! │             │  balance_before / balance_after │  event, exact source   │
//! │             └────────────────────────────────┘  reference              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has a UUID v4 `id` used for relations. Ledger entries
//! additionally carry a monotone `seq` assigned by SQLite, which is the
//! ordering the balance chain is defined over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Business Unit
// =============================================================================

/// One independently managed business line of the cooperative
/// (futsal field, campground, market stalls, water utility, internet).
///
/// Units are reference data: seeded once, never deleted at runtime.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BusinessUnit {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, e.g. "Lapangan Futsal".
    pub name: String,

    /// When the unit was registered.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit of Measure
// =============================================================================

/// What a tariff's quantity counts: hours of field time, cubic meters
/// of water, months of stall rent, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UnitOfMeasure {
    /// Per hour (futsal field rental).
    Hour,
    /// Per cubic meter (water utility).
    CubicMeter,
    /// Per month (stall rent, internet subscription).
    Month,
    /// Per year (stall rent, annual contracts).
    Year,
    /// Flat fee per event (campground bookings).
    Event,
}

// =============================================================================
// Tariff
// =============================================================================

/// A unit's price list entry, looked up by category at transaction time.
///
/// Immutable reference data: categories like "Member per jam" or
/// ">300 peserta" map to a unit price and a unit of measure.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Tariff {
    pub id: String,

    /// Unit this tariff belongs to.
    pub unit_id: String,

    /// Category label the unit-specific forms resolve against.
    pub category: String,

    /// Unit price in whole rupiah.
    pub price_rupiah: i64,

    /// What the quantity counts.
    pub uom: UnitOfMeasure,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Tariff {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_rupiah(self.price_rupiah)
    }
}

// =============================================================================
// Rental
// =============================================================================

/// A rental/usage fact: who used the unit, how much, for what total.
///
/// The amount is computed at creation (quantity × tariff price, or a
/// flat override) and frozen on the row so a later tariff change never
/// rewrites history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Rental {
    pub id: String,

    /// Tariff the amount was computed from.
    pub tariff_id: String,

    /// Name of the renting party.
    pub party_name: String,

    /// Quantity in the tariff's unit of measure.
    pub quantity: i64,

    /// Computed total in whole rupiah.
    pub total_rupiah: i64,

    /// Free-text note shown on statements.
    pub note: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Rental {
    /// Returns the computed total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_rupiah(self.total_rupiah)
    }
}

// =============================================================================
// Income
// =============================================================================

/// Tags a rental as income: the rental's total contributes positively
/// to the unit's balance. At most one per rental.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Income {
    pub id: String,

    /// The rental this income is the counterpart of (unique).
    pub rental_id: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Expense
// =============================================================================

/// A spending fact against a unit, independent of rentals.
/// Contributes negatively to the unit's balance.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Expense {
    pub id: String,

    pub unit_id: String,

    /// Expense category, e.g. "Perawatan lapangan".
    pub category: String,

    /// Free-text note shown on statements.
    pub note: Option<String>,

    /// Amount in whole rupiah (always positive on the row; the ledger
    /// applies it as a negative delta).
    pub amount_rupiah: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Returns the expense amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_rupiah(self.amount_rupiah)
    }
}

// =============================================================================
// Initial Balance
// =============================================================================

/// The baseline balance a unit starts from. One per unit; the first
/// ledger entry of a unit chains off this value.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InitialBalance {
    pub id: String,

    pub unit_id: String,

    /// Current nominal amount in whole rupiah.
    pub amount_rupiah: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl InitialBalance {
    /// Returns the baseline amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_rupiah(self.amount_rupiah)
    }
}

// =============================================================================
// Ledger Kind
// =============================================================================

/// The direction of a ledger entry's balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    /// Balance goes up by the event amount.
    Income,
    /// Balance goes down by the event amount.
    Expense,
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// One snapshot of a unit's balance before and after a single
/// financial event.
///
/// ## Chain Invariant
/// Per unit, ordered by `seq`: each entry's `balance_before` equals the
/// previous entry's `balance_after` (or the unit's InitialBalance for
/// the first entry), and `balance_after − balance_before` equals
/// `+amount` for income, `−amount` for expense.
///
/// ## Exact Source Reference
/// Every entry records the id of the income or expense that caused it
/// (`income_id` XOR `expense_id`), so edits and deletes are exact
/// lookups — never "adjust whatever the most recent entry happens to
/// be".
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerEntry {
    /// Monotone sequence number assigned by SQLite. The balance chain
    /// is defined over this ordering.
    pub seq: i64,

    /// Unique identifier (UUID v4).
    pub id: String,

    pub unit_id: String,

    /// Set on the first entry of a unit: the baseline it chained from.
    pub initial_balance_id: Option<String>,

    /// Source income id when `kind` is Income.
    pub income_id: Option<String>,

    /// Source expense id when `kind` is Expense.
    pub expense_id: Option<String>,

    pub kind: LedgerKind,

    pub balance_before_rupiah: i64,

    pub balance_after_rupiah: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Returns the balance before the event as Money.
    #[inline]
    pub fn balance_before(&self) -> Money {
        Money::from_rupiah(self.balance_before_rupiah)
    }

    /// Returns the balance after the event as Money.
    #[inline]
    pub fn balance_after(&self) -> Money {
        Money::from_rupiah(self.balance_after_rupiah)
    }

    /// Signed balance change recorded by this entry
    /// (positive for income, negative for expense).
    #[inline]
    pub fn delta(&self) -> Money {
        self.balance_after() - self.balance_before()
    }

    /// Unsigned event amount recorded by this entry.
    #[inline]
    pub fn amount(&self) -> Money {
        self.delta().abs()
    }

    /// The id of the income or expense row that caused this entry.
    pub fn source_id(&self) -> Option<&str> {
        match self.kind {
            LedgerKind::Income => self.income_id.as_deref(),
            LedgerKind::Expense => self.expense_id.as_deref(),
        }
    }
}

// =============================================================================
// Period
// =============================================================================

/// A reporting month, displayed `YYYY-MM`.
///
/// All report queries filter on a Period; constructing one validates
/// the month so malformed form input fails before any SQL runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    /// Creates a period, rejecting out-of-range months.
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&month) {
            return Err(ValidationError::OutOfRange {
                field: "month".to_string(),
                min: 1,
                max: 12,
            });
        }
        Ok(Period { year, month })
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: LedgerKind, before: i64, after: i64) -> LedgerEntry {
        LedgerEntry {
            seq: 1,
            id: "e1".to_string(),
            unit_id: "u1".to_string(),
            initial_balance_id: None,
            income_id: matches!(kind, LedgerKind::Income).then(|| "i1".to_string()),
            expense_id: matches!(kind, LedgerKind::Expense).then(|| "x1".to_string()),
            kind,
            balance_before_rupiah: before,
            balance_after_rupiah: after,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_entry_delta_and_amount() {
        let income = entry(LedgerKind::Income, 500_000, 750_000);
        assert_eq!(income.delta().rupiah(), 250_000);
        assert_eq!(income.amount().rupiah(), 250_000);
        assert_eq!(income.source_id(), Some("i1"));

        let expense = entry(LedgerKind::Expense, 500_000, 0);
        assert_eq!(expense.delta().rupiah(), -500_000);
        assert_eq!(expense.amount().rupiah(), 500_000);
        assert_eq!(expense.source_id(), Some("x1"));
    }

    #[test]
    fn test_period() {
        let p = Period::new(2026, 8).unwrap();
        assert_eq!(p.to_string(), "2026-08");

        assert!(Period::new(2026, 0).is_err());
        assert!(Period::new(2026, 13).is_err());
    }

    #[test]
    fn test_tariff_price() {
        let t = Tariff {
            id: "t1".to_string(),
            unit_id: "u1".to_string(),
            category: "Member per jam".to_string(),
            price_rupiah: 100_000,
            uom: UnitOfMeasure::Hour,
            created_at: Utc::now(),
        };
        assert_eq!(t.price().multiply_quantity(2).rupiah(), 200_000);
    }
}
