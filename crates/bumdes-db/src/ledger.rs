//! # Ledger Service
//!
//! The single place ledger entries are written, adjusted, and removed.
//! Both writers (income and expense) call through here with a typed
//! [`LedgerEvent`], so the reconciliation rules exist once instead of
//! being copy-pasted into every per-unit controller.
//!
//! ## Why Exact Source References
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE "MOST RECENT ENTRY" TRAP                                           │
//! │                                                                         │
//! │  A ledger keyed by "whatever entry is newest" breaks the moment        │
//! │  a second event lands between a record and its edit:                   │
//! │                                                                         │
//! │    record income A      entry 1 (A)                                    │
//! │    record expense B     entry 2 (B)   ← now the "most recent"          │
//! │    edit income A        adjusts entry 2  ❌ wrong entry!               │
//! │                                                                         │
//! │  Here every entry stores the id of the income/expense that caused     │
//! │  it. Edits and deletes are keyed lookups, and every entry AFTER the    │
//! │  touched one is rebased by the same delta so the chain stays a chain.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Discipline
//! The mutating functions take `&mut SqliteConnection` and are only
//! ever called inside the caller's transaction: either everything (the
//! income/expense row AND its ledger entry AND the rebase) commits, or
//! nothing does.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult, LedgerResult};
use bumdes_core::ledger::{signed_delta, verify_chain};
use bumdes_core::{CoreError, InitialBalance, LedgerEntry, LedgerEvent, LedgerKind, Money};

/// Full column list of `ledger_entries`, in struct order.
const SELECT_ENTRY: &str = "SELECT seq, id, unit_id, initial_balance_id, income_id, expense_id, \
     kind, balance_before_rupiah, balance_after_rupiah, created_at FROM ledger_entries";

// =============================================================================
// Transaction-Scoped Mutations
// =============================================================================

/// Appends one ledger entry for a financial event.
///
/// The entry's balance-before is the unit's latest balance-after, or
/// the unit's InitialBalance when no history exists yet (in which case
/// the entry records which baseline it chained from).
///
/// ## Arguments
/// * `source_id` - Id of the income or expense row causing this entry
pub(crate) async fn append_entry(
    conn: &mut SqliteConnection,
    event: &LedgerEvent,
    source_id: &str,
) -> LedgerResult<LedgerEntry> {
    let latest: Option<LedgerEntry> =
        sqlx::query_as(&format!("{SELECT_ENTRY} WHERE unit_id = ?1 ORDER BY seq DESC LIMIT 1"))
            .bind(&event.unit_id)
            .fetch_optional(&mut *conn)
            .await?;

    let (before, initial_balance_id) = match latest {
        Some(entry) => (entry.balance_after(), None),
        None => {
            let baseline = fetch_initial_balance(conn, &event.unit_id).await?;
            (baseline.amount(), Some(baseline.id))
        }
    };

    let after = event.apply(before);
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    debug!(
        unit_id = %event.unit_id,
        kind = ?event.kind,
        amount = %event.amount,
        before = %before,
        after = %after,
        "Appending ledger entry"
    );

    let (income_id, expense_id) = match event.kind {
        LedgerKind::Income => (Some(source_id), None),
        LedgerKind::Expense => (None, Some(source_id)),
    };

    sqlx::query(
        r#"
        INSERT INTO ledger_entries (
            id, unit_id, initial_balance_id, income_id, expense_id,
            kind, balance_before_rupiah, balance_after_rupiah, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&id)
    .bind(&event.unit_id)
    .bind(&initial_balance_id)
    .bind(income_id)
    .bind(expense_id)
    .bind(event.kind)
    .bind(before.rupiah())
    .bind(after.rupiah())
    .bind(now)
    .execute(&mut *conn)
    .await?;

    // Re-read to pick up the SQLite-assigned seq
    let entry: LedgerEntry = sqlx::query_as(&format!("{SELECT_ENTRY} WHERE id = ?1"))
        .bind(&id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(entry)
}

/// Applies a signed delta to the entry caused by `source_id`, then
/// rebases every later entry of the unit by the same delta.
///
/// `delta` is the ledger-space change: for an income edit it is
/// `new − old`; for an expense edit it is `−(new − old)`.
///
/// ## Errors
/// `ReconciliationMismatch` when no entry references the source.
pub(crate) async fn adjust_entry(
    conn: &mut SqliteConnection,
    unit_id: &str,
    kind: LedgerKind,
    source_id: &str,
    delta: Money,
) -> LedgerResult<LedgerEntry> {
    let entry = require_entry(conn, unit_id, kind, source_id).await?;

    if delta.is_zero() {
        return Ok(entry);
    }

    debug!(
        unit_id = %unit_id,
        seq = entry.seq,
        delta = %delta,
        "Adjusting ledger entry and rebasing successors"
    );

    sqlx::query("UPDATE ledger_entries SET balance_after_rupiah = balance_after_rupiah + ?1 WHERE seq = ?2")
        .bind(delta.rupiah())
        .bind(entry.seq)
        .execute(&mut *conn)
        .await?;

    rebase_after(conn, unit_id, entry.seq, delta).await?;

    let entry: LedgerEntry = sqlx::query_as(&format!("{SELECT_ENTRY} WHERE seq = ?1"))
        .bind(entry.seq)
        .fetch_one(&mut *conn)
        .await?;

    Ok(entry)
}

/// Removes the entry caused by `source_id` and rebases every later
/// entry of the unit by the negated delta, as if the event never
/// happened.
///
/// ## Errors
/// `ReconciliationMismatch` when no entry references the source, or
/// when the entry's recorded delta no longer matches the source's
/// amount (a corrupt chain should not be silently shrunk further).
pub(crate) async fn remove_entry(
    conn: &mut SqliteConnection,
    unit_id: &str,
    kind: LedgerKind,
    source_id: &str,
    amount: Money,
) -> LedgerResult<()> {
    let entry = require_entry(conn, unit_id, kind, source_id).await?;

    let expected = signed_delta(kind, amount);
    if entry.delta() != expected {
        return Err(CoreError::ReconciliationMismatch {
            unit_id: unit_id.to_string(),
            detail: format!(
                "entry {} records a delta of {} but its source amounts to {}",
                entry.id,
                entry.delta(),
                expected
            ),
        }
        .into());
    }

    debug!(
        unit_id = %unit_id,
        seq = entry.seq,
        delta = %expected,
        "Removing ledger entry and rebasing successors"
    );

    sqlx::query("DELETE FROM ledger_entries WHERE seq = ?1")
        .bind(entry.seq)
        .execute(&mut *conn)
        .await?;

    rebase_after(conn, unit_id, entry.seq, -expected).await?;

    Ok(())
}

/// Shifts balance-before and balance-after of every entry of the unit
/// strictly after `seq` by `delta`.
async fn rebase_after(
    conn: &mut SqliteConnection,
    unit_id: &str,
    seq: i64,
    delta: Money,
) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE ledger_entries SET
            balance_before_rupiah = balance_before_rupiah + ?1,
            balance_after_rupiah = balance_after_rupiah + ?1
        WHERE unit_id = ?2 AND seq > ?3
        "#,
    )
    .bind(delta.rupiah())
    .bind(unit_id)
    .bind(seq)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Looks up the entry caused by `source_id`, failing with
/// `ReconciliationMismatch` when the ledger carries none.
async fn require_entry(
    conn: &mut SqliteConnection,
    unit_id: &str,
    kind: LedgerKind,
    source_id: &str,
) -> LedgerResult<LedgerEntry> {
    find_by_source(conn, kind, source_id)
        .await?
        .ok_or_else(|| {
            CoreError::ReconciliationMismatch {
                unit_id: unit_id.to_string(),
                detail: format!("no ledger entry for {:?} {}", kind, source_id),
            }
            .into()
        })
}

/// Exact lookup of the entry caused by an income or expense row.
pub(crate) async fn find_by_source(
    conn: &mut SqliteConnection,
    kind: LedgerKind,
    source_id: &str,
) -> DbResult<Option<LedgerEntry>> {
    let sql = match kind {
        LedgerKind::Income => format!("{SELECT_ENTRY} WHERE income_id = ?1"),
        LedgerKind::Expense => format!("{SELECT_ENTRY} WHERE expense_id = ?1"),
    };

    let entry = sqlx::query_as(&sql)
        .bind(source_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(entry)
}

/// Fetches a unit's InitialBalance row.
///
/// Every seeded unit carries one; its absence is a provisioning error,
/// not a normal empty state.
pub(crate) async fn fetch_initial_balance(
    conn: &mut SqliteConnection,
    unit_id: &str,
) -> LedgerResult<InitialBalance> {
    let baseline: Option<InitialBalance> = sqlx::query_as(
        "SELECT id, unit_id, amount_rupiah, created_at, updated_at \
         FROM initial_balances WHERE unit_id = ?1",
    )
    .bind(unit_id)
    .fetch_optional(&mut *conn)
    .await?;

    baseline.ok_or_else(|| DbError::not_found("InitialBalance", unit_id).into())
}

// =============================================================================
// Ledger Repository (read side)
// =============================================================================

/// Read-side queries over the balance history.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// The unit's most recent entry, if any.
    pub async fn latest_for_unit(&self, unit_id: &str) -> DbResult<Option<LedgerEntry>> {
        let entry = sqlx::query_as(&format!(
            "{SELECT_ENTRY} WHERE unit_id = ?1 ORDER BY seq DESC LIMIT 1"
        ))
        .bind(unit_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Full history of a unit, oldest first (chain order).
    pub async fn history_for_unit(&self, unit_id: &str) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as(&format!(
            "{SELECT_ENTRY} WHERE unit_id = ?1 ORDER BY seq ASC"
        ))
        .bind(unit_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// The entry caused by a specific income or expense row.
    pub async fn get_by_source(
        &self,
        kind: LedgerKind,
        source_id: &str,
    ) -> DbResult<Option<LedgerEntry>> {
        let mut conn = self.pool.acquire().await?;
        find_by_source(&mut conn, kind, source_id).await
    }

    /// The unit's current balance: latest entry's balance-after, or
    /// the InitialBalance when no history exists.
    pub async fn current_balance(&self, unit_id: &str) -> LedgerResult<Money> {
        if let Some(entry) = self.latest_for_unit(unit_id).await? {
            return Ok(entry.balance_after());
        }

        let mut conn = self.pool.acquire().await?;
        let baseline = fetch_initial_balance(&mut conn, unit_id).await?;
        Ok(baseline.amount())
    }

    /// Loads a unit's full history and checks the balance-chain
    /// invariant, surfacing the first break found.
    pub async fn verify_unit_chain(&self, unit_id: &str) -> LedgerResult<()> {
        let mut conn = self.pool.acquire().await?;
        let baseline = fetch_initial_balance(&mut conn, unit_id).await?;
        drop(conn);

        let history = self.history_for_unit(unit_id).await?;
        verify_chain(unit_id, baseline.amount(), &history)?;

        Ok(())
    }
}
