//! # Report Queries
//!
//! Read-only queries behind the monthly statement, the yearly
//! transparency summary, and the per-unit export data set. All shaping
//! beyond SQL aggregation lives in `bumdes_core::report`.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bumdes_core::report::{
    assemble_statement, MonthlyAggregate, StatementLine, StatementRecord, UnitBreakdown,
};
use bumdes_core::Period;

/// Repository for report assembly.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Monthly statement for one unit, newest entry first.
    ///
    /// Each line joins the ledger entry with the note of the income or
    /// expense that caused it; missing notes render as "-".
    pub async fn statement(&self, unit_id: &str, period: Period) -> DbResult<Vec<StatementLine>> {
        debug!(unit_id = %unit_id, period = %period, "Assembling statement");

        let records: Vec<StatementRecord> = sqlx::query_as(
            r#"
            SELECT
                le.id,
                le.seq,
                le.kind,
                le.balance_before_rupiah,
                le.balance_after_rupiah,
                COALESCE(r.note, r.party_name, e.note, e.category) AS description,
                le.created_at
            FROM ledger_entries le
            LEFT JOIN incomes i ON i.id = le.income_id
            LEFT JOIN rentals r ON r.id = i.rental_id
            LEFT JOIN expenses e ON e.id = le.expense_id
            WHERE le.unit_id = ?1
              AND strftime('%Y-%m', le.created_at) = ?2
            ORDER BY le.seq DESC
            "#,
        )
        .bind(unit_id)
        .bind(period.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(assemble_statement(records))
    }

    /// Income and expense totals per month for one calendar year,
    /// across all units. Months with no movement are omitted.
    pub async fn monthly_summary(&self, year: i32) -> DbResult<Vec<MonthlyAggregate>> {
        debug!(year = year, "Aggregating monthly summary");

        let rows = sqlx::query_as(
            r#"
            SELECT
                strftime('%Y-%m', created_at) AS month,
                COALESCE(SUM(CASE WHEN kind = 'income'
                    THEN balance_after_rupiah - balance_before_rupiah
                    ELSE 0 END), 0) AS income_rupiah,
                COALESCE(SUM(CASE WHEN kind = 'expense'
                    THEN balance_before_rupiah - balance_after_rupiah
                    ELSE 0 END), 0) AS expense_rupiah
            FROM ledger_entries
            WHERE strftime('%Y', created_at) = ?1
            GROUP BY month
            ORDER BY month
            "#,
        )
        .bind(format!("{:04}", year))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Per-unit totals and closing balance for one period.
    ///
    /// Every registered unit appears, movement or not; the closing
    /// balance falls back to the initial balance when no entry exists
    /// at or before the period.
    pub async fn unit_breakdown(&self, period: Period) -> DbResult<Vec<UnitBreakdown>> {
        debug!(period = %period, "Aggregating unit breakdown");

        let rows = sqlx::query_as(
            r#"
            SELECT
                u.id AS unit_id,
                u.name AS unit_name,
                COALESCE((
                    SELECT SUM(le.balance_after_rupiah - le.balance_before_rupiah)
                    FROM ledger_entries le
                    WHERE le.unit_id = u.id
                      AND le.kind = 'income'
                      AND strftime('%Y-%m', le.created_at) = ?1
                ), 0) AS income_rupiah,
                COALESCE((
                    SELECT SUM(le.balance_before_rupiah - le.balance_after_rupiah)
                    FROM ledger_entries le
                    WHERE le.unit_id = u.id
                      AND le.kind = 'expense'
                      AND strftime('%Y-%m', le.created_at) = ?1
                ), 0) AS expense_rupiah,
                COALESCE((
                    SELECT le.balance_after_rupiah
                    FROM ledger_entries le
                    WHERE le.unit_id = u.id
                      AND strftime('%Y-%m', le.created_at) <= ?1
                    ORDER BY le.seq DESC
                    LIMIT 1
                ), (
                    SELECT ib.amount_rupiah
                    FROM initial_balances ib
                    WHERE ib.unit_id = u.id
                ), 0) AS closing_balance_rupiah
            FROM units u
            ORDER BY u.name
            "#,
        )
        .bind(period.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
