//! # Report Assembly
//!
//! Pure formatting of ledger history into the rows the reporting pages
//! and exports consume. No mutation happens here: the database side
//! fetches raw records, this module shapes them.
//!
//! ## Report Surfaces
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Per-unit monthly statement     StatementRecord ─► StatementLine       │
//! │  (most-recent-first, running     description, signed delta,            │
//! │   balance per row)               running balance                       │
//! │                                                                         │
//! │  Transparency report            MonthlyAggregate                       │
//! │  (village-wide, per month)       Σ income deltas, Σ expense deltas     │
//! │                                                                         │
//! │  Export data set                UnitBreakdown                          │
//! │  (per unit, one period)          totals + closing balance              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::LedgerKind;

// =============================================================================
// Statement
// =============================================================================

/// One ledger entry joined with the note of its source income or
/// expense, as fetched for a unit's monthly statement.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StatementRecord {
    /// Ledger entry id.
    pub id: String,

    /// Chain position (newest rows have the highest seq).
    pub seq: i64,

    pub kind: LedgerKind,

    pub balance_before_rupiah: i64,

    pub balance_after_rupiah: i64,

    /// Linked note: the rental's note for income rows, the expense's
    /// note for expense rows. Absent notes render as "-".
    pub description: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// One display row of a unit's monthly statement.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatementLine {
    pub entry_id: String,

    pub kind: LedgerKind,

    /// Human-readable description; "-" when the source carried no note.
    pub description: String,

    /// Unsigned event amount.
    pub amount_rupiah: i64,

    /// Signed balance change (+income / −expense).
    pub signed_delta_rupiah: i64,

    /// Running balance after this row's event.
    pub balance_rupiah: i64,

    #[ts(as = "String")]
    pub occurred_at: DateTime<Utc>,
}

/// Shapes raw statement records into display rows.
///
/// `records` arrive most-recent-first (the order the statement page
/// shows them); each row's running balance is the balance the ledger
/// recorded after that row's event, so no recomputation is needed —
/// or possible to get wrong.
pub fn assemble_statement(records: Vec<StatementRecord>) -> Vec<StatementLine> {
    records
        .into_iter()
        .map(|r| {
            let delta = Money::from_rupiah(r.balance_after_rupiah - r.balance_before_rupiah);
            StatementLine {
                entry_id: r.id,
                kind: r.kind,
                description: r.description.unwrap_or_else(|| "-".to_string()),
                amount_rupiah: delta.abs().rupiah(),
                signed_delta_rupiah: delta.rupiah(),
                balance_rupiah: r.balance_after_rupiah,
                occurred_at: r.created_at,
            }
        })
        .collect()
}

// =============================================================================
// Monthly Aggregates (transparency report)
// =============================================================================

/// Cross-unit totals for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct MonthlyAggregate {
    /// Month key, `YYYY-MM`.
    pub month: String,

    /// Sum of income deltas across all units.
    pub income_rupiah: i64,

    /// Sum of expense amounts across all units (positive number).
    pub expense_rupiah: i64,
}

impl MonthlyAggregate {
    /// Net movement for the month (income − expense).
    #[inline]
    pub fn net(&self) -> Money {
        Money::from_rupiah(self.income_rupiah - self.expense_rupiah)
    }
}

// =============================================================================
// Per-Unit Breakdown (export data set)
// =============================================================================

/// One unit's totals and closing balance for a reporting period.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct UnitBreakdown {
    pub unit_id: String,

    pub unit_name: String,

    /// Income total within the period.
    pub income_rupiah: i64,

    /// Expense total within the period (positive number).
    pub expense_rupiah: i64,

    /// Balance at the end of the period: the latest entry's
    /// balance-after at or before the period, else the InitialBalance.
    pub closing_balance_rupiah: i64,
}

impl UnitBreakdown {
    /// Net movement for the unit in the period.
    #[inline]
    pub fn net(&self) -> Money {
        Money::from_rupiah(self.income_rupiah - self.expense_rupiah)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        seq: i64,
        kind: LedgerKind,
        before: i64,
        after: i64,
        description: Option<&str>,
    ) -> StatementRecord {
        StatementRecord {
            id: format!("entry-{seq}"),
            seq,
            kind,
            balance_before_rupiah: before,
            balance_after_rupiah: after,
            description: description.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_assemble_statement() {
        // Most-recent-first, the way the statement query returns them
        let records = vec![
            record(2, LedgerKind::Expense, 750_000, 650_000, None),
            record(1, LedgerKind::Income, 500_000, 750_000, Some("Sewa turnamen")),
        ];

        let lines = assemble_statement(records);
        assert_eq!(lines.len(), 2);

        assert_eq!(lines[0].description, "-");
        assert_eq!(lines[0].amount_rupiah, 100_000);
        assert_eq!(lines[0].signed_delta_rupiah, -100_000);
        assert_eq!(lines[0].balance_rupiah, 650_000);

        assert_eq!(lines[1].description, "Sewa turnamen");
        assert_eq!(lines[1].signed_delta_rupiah, 250_000);
        assert_eq!(lines[1].balance_rupiah, 750_000);
    }

    #[test]
    fn test_assemble_statement_empty() {
        assert!(assemble_statement(Vec::new()).is_empty());
    }

    #[test]
    fn test_monthly_aggregate_net() {
        let agg = MonthlyAggregate {
            month: "2026-08".to_string(),
            income_rupiah: 1_250_000,
            expense_rupiah: 400_000,
        };
        assert_eq!(agg.net().rupiah(), 850_000);
    }

    #[test]
    fn test_unit_breakdown_net() {
        let row = UnitBreakdown {
            unit_id: "u1".to_string(),
            unit_name: "Lapangan Futsal".to_string(),
            income_rupiah: 300_000,
            expense_rupiah: 500_000,
            closing_balance_rupiah: 300_000,
        };
        assert_eq!(row.net().rupiah(), -200_000);
    }
}
