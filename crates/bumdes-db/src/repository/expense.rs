//! # Expense Writer
//!
//! Database operations for unit expenses. An expense is the mirror of
//! an income: it subtracts from the unit's running balance, and its
//! edits and deletes flow through the same ledger service so later
//! entries are rebased the same way.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbResult, LedgerResult};
use crate::ledger::{adjust_entry, append_entry, remove_entry};
use bumdes_core::validation::{validate_amount_rupiah, validate_category, validate_note};
use bumdes_core::{CoreError, Expense, LedgerEvent, LedgerKind, Money};

const SELECT_EXPENSE: &str =
    "SELECT id, unit_id, category, note, amount_rupiah, created_at FROM expenses";

/// Repository for expense-side write operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Records an expense against a unit.
    ///
    /// Inserts the Expense row and appends a ledger entry with
    /// delta = −amount, in one transaction. Unlike income there is no
    /// tariff: the operator types the amount directly.
    pub async fn record_expense(
        &self,
        unit_id: &str,
        category: &str,
        note: Option<&str>,
        amount: Money,
    ) -> LedgerResult<Expense> {
        validate_category(category)?;
        validate_note(note)?;
        validate_amount_rupiah(amount.rupiah())?;

        let mut tx = self.pool.begin().await?;

        require_unit(&mut tx, unit_id).await?;

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            unit_id: unit_id.to_string(),
            category: category.trim().to_string(),
            note: note.map(str::to_string),
            amount_rupiah: amount.rupiah(),
            created_at: Utc::now(),
        };

        debug!(unit_id = %unit_id, category = %category, amount = %amount, "Recording expense");

        sqlx::query(
            r#"
            INSERT INTO expenses (id, unit_id, category, note, amount_rupiah, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.unit_id)
        .bind(&expense.category)
        .bind(&expense.note)
        .bind(expense.amount_rupiah)
        .bind(expense.created_at)
        .execute(&mut *tx)
        .await?;

        let event = LedgerEvent::expense(unit_id, amount);
        append_entry(&mut tx, &event, &expense.id).await?;

        tx.commit().await?;

        Ok(expense)
    }

    /// Edits a recorded expense.
    ///
    /// Applies `delta = −(new − old)` to the exact ledger entry this
    /// expense caused and rebases every later entry of the unit.
    pub async fn edit_expense(
        &self,
        expense_id: &str,
        new_category: Option<&str>,
        new_note: Option<&str>,
        new_amount: Money,
    ) -> LedgerResult<Expense> {
        if let Some(category) = new_category {
            validate_category(category)?;
        }
        validate_note(new_note)?;
        validate_amount_rupiah(new_amount.rupiah())?;

        let mut tx = self.pool.begin().await?;

        let mut expense = require_expense(&mut tx, expense_id).await?;
        let old_amount = expense.amount();

        expense.amount_rupiah = new_amount.rupiah();
        if let Some(category) = new_category {
            expense.category = category.trim().to_string();
        }
        if new_note.is_some() {
            expense.note = new_note.map(str::to_string);
        }

        debug!(
            expense_id = %expense_id,
            old = %old_amount,
            new = %new_amount,
            "Editing expense"
        );

        sqlx::query(
            r#"
            UPDATE expenses SET
                category = ?2,
                note = ?3,
                amount_rupiah = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.category)
        .bind(&expense.note)
        .bind(expense.amount_rupiah)
        .execute(&mut *tx)
        .await?;

        // A larger expense lowers the balance further
        let delta = -(new_amount - old_amount);
        adjust_entry(&mut tx, &expense.unit_id, LedgerKind::Expense, expense_id, delta).await?;

        tx.commit().await?;

        Ok(expense)
    }

    /// Deletes an expense and the ledger entry it caused.
    ///
    /// Later entries of the unit are rebased up by the amount, as if
    /// the expense never happened.
    pub async fn delete_expense(&self, expense_id: &str) -> LedgerResult<()> {
        let mut tx = self.pool.begin().await?;

        let expense = require_expense(&mut tx, expense_id).await?;

        debug!(expense_id = %expense_id, amount = %expense.amount(), "Deleting expense");

        remove_entry(
            &mut tx,
            &expense.unit_id,
            LedgerKind::Expense,
            expense_id,
            expense.amount(),
        )
        .await?;

        sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(expense_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Gets an expense by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Expense>> {
        let expense = sqlx::query_as(&format!("{SELECT_EXPENSE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(expense)
    }

    /// Lists expenses for a unit, newest first.
    pub async fn list_for_unit(&self, unit_id: &str) -> DbResult<Vec<Expense>> {
        let expenses =
            sqlx::query_as(&format!("{SELECT_EXPENSE} WHERE unit_id = ?1 ORDER BY created_at DESC"))
                .bind(unit_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(expenses)
    }
}

async fn require_unit(conn: &mut SqliteConnection, unit_id: &str) -> LedgerResult<()> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM units WHERE id = ?1")
        .bind(unit_id)
        .fetch_optional(&mut *conn)
        .await?;

    if exists.is_none() {
        return Err(CoreError::UnitNotFound(unit_id.to_string()).into());
    }
    Ok(())
}

async fn require_expense(conn: &mut SqliteConnection, id: &str) -> LedgerResult<Expense> {
    let expense: Option<Expense> = sqlx::query_as(&format!("{SELECT_EXPENSE} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    expense.ok_or_else(|| CoreError::ExpenseNotFound(id.to_string()).into())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::LedgerError;
    use crate::testutil::{seeded_db, FUTSAL_HOURLY};
    use bumdes_core::{CoreError, LedgerKind, Money};

    #[tokio::test]
    async fn test_record_expense_appends_entry() {
        // 500.000 start, expense of the full balance → zero
        let (db, unit_id) = seeded_db(500_000).await;

        let expense = db
            .expenses()
            .record_expense(&unit_id, "Perawatan lapangan", None, Money::from_rupiah(500_000))
            .await
            .unwrap();
        assert_eq!(expense.amount_rupiah, 500_000);

        let entry = db.ledger().latest_for_unit(&unit_id).await.unwrap().unwrap();
        assert_eq!(entry.balance_before_rupiah, 500_000);
        assert_eq!(entry.balance_after_rupiah, 0);
        assert_eq!(entry.kind, LedgerKind::Expense);

        db.ledger().verify_unit_chain(&unit_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_record_expense_unknown_unit() {
        let (db, _unit_id) = seeded_db(0).await;

        let err = db
            .expenses()
            .record_expense("missing-unit", "Listrik", None, Money::from_rupiah(10_000))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::UnitNotFound(_))));
    }

    #[tokio::test]
    async fn test_record_expense_rejects_non_positive() {
        let (db, unit_id) = seeded_db(500_000).await;

        let err = db
            .expenses()
            .record_expense(&unit_id, "Listrik", None, Money::from_rupiah(0))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_edit_expense_adjusts_entry() {
        let (db, unit_id) = seeded_db(500_000).await;

        let expense = db
            .expenses()
            .record_expense(&unit_id, "Listrik", None, Money::from_rupiah(100_000))
            .await
            .unwrap();

        let edited = db
            .expenses()
            .edit_expense(&expense.id, None, None, Money::from_rupiah(250_000))
            .await
            .unwrap();
        assert_eq!(edited.amount_rupiah, 250_000);

        let entry = db.ledger().latest_for_unit(&unit_id).await.unwrap().unwrap();
        assert_eq!(entry.balance_before_rupiah, 500_000);
        assert_eq!(entry.balance_after_rupiah, 250_000);
        db.ledger().verify_unit_chain(&unit_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_edit_expense_rebases_later_entries() {
        let (db, unit_id) = seeded_db(500_000).await;

        let expense = db
            .expenses()
            .record_expense(&unit_id, "Listrik", None, Money::from_rupiah(100_000))
            .await
            .unwrap();
        db.incomes()
            .record_income(&unit_id, FUTSAL_HOURLY, "Karang Taruna", 1, None, None)
            .await
            .unwrap();

        db.expenses()
            .edit_expense(&expense.id, None, None, Money::from_rupiah(150_000))
            .await
            .unwrap();

        let history = db.ledger().history_for_unit(&unit_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].balance_after_rupiah, 350_000);
        assert_eq!(history[1].balance_before_rupiah, 350_000);
        assert_eq!(history[1].balance_after_rupiah, 600_000);
        db.ledger().verify_unit_chain(&unit_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_expense_restores_balance() {
        let (db, unit_id) = seeded_db(500_000).await;

        let expense = db
            .expenses()
            .record_expense(&unit_id, "Listrik", Some("Tagihan Juli"), Money::from_rupiah(200_000))
            .await
            .unwrap();

        db.expenses().delete_expense(&expense.id).await.unwrap();

        assert_eq!(
            db.ledger().current_balance(&unit_id).await.unwrap(),
            Money::from_rupiah(500_000)
        );
        assert!(db.expenses().get_by_id(&expense.id).await.unwrap().is_none());
        db.ledger().verify_unit_chain(&unit_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_expense_missing_entry() {
        let (db, unit_id) = seeded_db(500_000).await;

        let expense = db
            .expenses()
            .record_expense(&unit_id, "Listrik", None, Money::from_rupiah(100_000))
            .await
            .unwrap();

        // Drop the entry behind the service's back
        sqlx::query("DELETE FROM ledger_entries WHERE expense_id = ?1")
            .bind(&expense.id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.expenses().delete_expense(&expense.id).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::ReconciliationMismatch { .. })
        ));

        // No partial delete
        assert!(db.expenses().get_by_id(&expense.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_expense_mismatch_leaves_rows() {
        let (db, unit_id) = seeded_db(500_000).await;

        let expense = db
            .expenses()
            .record_expense(&unit_id, "Listrik", None, Money::from_rupiah(100_000))
            .await
            .unwrap();

        // Corrupt the chain behind the service's back
        sqlx::query("UPDATE ledger_entries SET balance_after_rupiah = balance_after_rupiah + 1 WHERE expense_id = ?1")
            .bind(&expense.id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.expenses().delete_expense(&expense.id).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::ReconciliationMismatch { .. })
        ));

        // Rolled back: expense row and entry are still there
        assert!(db.expenses().get_by_id(&expense.id).await.unwrap().is_some());
        assert!(db
            .ledger()
            .get_by_source(LedgerKind::Expense, &expense.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_expense_can_drive_balance_negative() {
        // The ledger records reality; overdrafts are visible, not blocked
        let (db, unit_id) = seeded_db(100_000).await;

        db.expenses()
            .record_expense(&unit_id, "Perbaikan pompa", None, Money::from_rupiah(250_000))
            .await
            .unwrap();

        assert_eq!(
            db.ledger().current_balance(&unit_id).await.unwrap(),
            Money::from_rupiah(-150_000)
        );
        db.ledger().verify_unit_chain(&unit_id).await.unwrap();
    }
}
