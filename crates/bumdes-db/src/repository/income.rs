//! # Income Writer
//!
//! Database operations for rentals and their income tags.
//!
//! ## Write Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Income Lifecycle                                   │
//! │                                                                         │
//! │  1. RECORD                                                             │
//! │     └── record_income() → resolve tariff → Rental + Income            │
//! │                           + ledger entry, one transaction              │
//! │                                                                         │
//! │  2. EDIT                                                               │
//! │     └── edit_income() → re-resolve tariff, recompute amount,           │
//! │                         adjust the exact ledger entry, rebase          │
//! │                         every later entry by the same delta            │
//! │                                                                         │
//! │  3. DELETE                                                             │
//! │     └── delete_income() → remove the exact ledger entry, rebase,       │
//! │                           then drop the Income and Rental rows         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A tariff failure, a missing row, or a broken chain anywhere in the
//! middle rolls the whole transaction back: all rows or none.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbResult, LedgerResult};
use crate::ledger::{adjust_entry, append_entry, remove_entry};
use crate::repository::tariff::resolve_tariff;
use bumdes_core::validation::{
    validate_category, validate_note, validate_party_name, validate_quantity,
};
use bumdes_core::{CoreError, Income, LedgerEvent, LedgerKind, Money, Rental, Tariff};

const SELECT_RENTAL: &str =
    "SELECT id, tariff_id, party_name, quantity, total_rupiah, note, created_at FROM rentals";

/// Repository for income-side write operations.
#[derive(Debug, Clone)]
pub struct IncomeRepository {
    pool: SqlitePool,
}

impl IncomeRepository {
    /// Creates a new IncomeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        IncomeRepository { pool }
    }

    /// Records a rental as income.
    ///
    /// ## What This Does (one transaction)
    /// 1. Resolves the unit's tariff by category
    /// 2. Computes the amount: quantity × unit price, or the flat-fee
    ///    override when the form priced the whole event directly
    /// 3. Inserts the Rental and its Income tag
    /// 4. Appends a ledger entry with delta = +amount
    ///
    /// ## Errors
    /// `TariffNotFound` aborts before anything is written; a constraint
    /// failure rolls everything back.
    pub async fn record_income(
        &self,
        unit_id: &str,
        category: &str,
        party_name: &str,
        quantity: i64,
        override_amount: Option<Money>,
        note: Option<&str>,
    ) -> LedgerResult<Rental> {
        validate_category(category)?;
        validate_party_name(party_name)?;
        validate_quantity(quantity)?;
        validate_note(note)?;

        let mut tx = self.pool.begin().await?;

        let tariff = resolve_tariff(&mut tx, unit_id, category).await?;
        let amount = compute_amount(&tariff, quantity, override_amount);
        let now = Utc::now();

        let rental = Rental {
            id: Uuid::new_v4().to_string(),
            tariff_id: tariff.id.clone(),
            party_name: party_name.trim().to_string(),
            quantity,
            total_rupiah: amount.rupiah(),
            note: note.map(str::to_string),
            created_at: now,
        };

        debug!(
            unit_id = %unit_id,
            category = %category,
            quantity = quantity,
            amount = %amount,
            "Recording income"
        );

        sqlx::query(
            r#"
            INSERT INTO rentals (id, tariff_id, party_name, quantity, total_rupiah, note, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&rental.id)
        .bind(&rental.tariff_id)
        .bind(&rental.party_name)
        .bind(rental.quantity)
        .bind(rental.total_rupiah)
        .bind(&rental.note)
        .bind(rental.created_at)
        .execute(&mut *tx)
        .await?;

        let income_id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO incomes (id, rental_id, created_at) VALUES (?1, ?2, ?3)")
            .bind(&income_id)
            .bind(&rental.id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let event = LedgerEvent::income(unit_id, amount);
        append_entry(&mut tx, &event, &income_id).await?;

        tx.commit().await?;

        Ok(rental)
    }

    /// Edits a recorded income.
    ///
    /// Re-resolves the tariff (the category may have changed),
    /// recomputes the amount, and applies `delta = new − old` to the
    /// exact ledger entry this income caused — rebasing every later
    /// entry of the unit by the same delta.
    ///
    /// ## Errors
    /// `RentalNotFound` for an unknown id; `TariffNotFound` when the
    /// new category doesn't resolve; either way nothing is changed.
    pub async fn edit_income(
        &self,
        rental_id: &str,
        new_quantity: i64,
        new_category: Option<&str>,
        new_party_name: Option<&str>,
        override_amount: Option<Money>,
    ) -> LedgerResult<Rental> {
        validate_quantity(new_quantity)?;
        if let Some(category) = new_category {
            validate_category(category)?;
        }
        if let Some(party) = new_party_name {
            validate_party_name(party)?;
        }

        let mut tx = self.pool.begin().await?;

        let mut rental = require_rental(&mut tx, rental_id).await?;
        let old_tariff = fetch_tariff(&mut tx, &rental.tariff_id).await?;
        let unit_id = old_tariff.unit_id.clone();

        let income = require_income(&mut tx, rental_id, &unit_id).await?;

        let category = new_category.unwrap_or(&old_tariff.category);
        let tariff = resolve_tariff(&mut tx, &unit_id, category).await?;

        let old_amount = rental.total();
        let new_amount = compute_amount(&tariff, new_quantity, override_amount);
        let delta = new_amount - old_amount;

        rental.tariff_id = tariff.id.clone();
        rental.quantity = new_quantity;
        rental.total_rupiah = new_amount.rupiah();
        if let Some(party) = new_party_name {
            rental.party_name = party.trim().to_string();
        }

        debug!(
            rental_id = %rental_id,
            old = %old_amount,
            new = %new_amount,
            delta = %delta,
            "Editing income"
        );

        sqlx::query(
            r#"
            UPDATE rentals SET
                tariff_id = ?2,
                party_name = ?3,
                quantity = ?4,
                total_rupiah = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&rental.id)
        .bind(&rental.tariff_id)
        .bind(&rental.party_name)
        .bind(rental.quantity)
        .bind(rental.total_rupiah)
        .execute(&mut *tx)
        .await?;

        adjust_entry(&mut tx, &unit_id, LedgerKind::Income, &income.id, delta).await?;

        tx.commit().await?;

        Ok(rental)
    }

    /// Deletes an income, its rental, and the ledger entry it caused.
    ///
    /// The later entries of the unit are rebased down by the income's
    /// amount, as if the event never happened.
    pub async fn delete_income(&self, rental_id: &str) -> LedgerResult<()> {
        let mut tx = self.pool.begin().await?;

        let rental = require_rental(&mut tx, rental_id).await?;
        let tariff = fetch_tariff(&mut tx, &rental.tariff_id).await?;
        let income = require_income(&mut tx, rental_id, &tariff.unit_id).await?;

        debug!(rental_id = %rental_id, amount = %rental.total(), "Deleting income");

        remove_entry(
            &mut tx,
            &tariff.unit_id,
            LedgerKind::Income,
            &income.id,
            rental.total(),
        )
        .await?;

        sqlx::query("DELETE FROM incomes WHERE id = ?1")
            .bind(&income.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM rentals WHERE id = ?1")
            .bind(rental_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Gets a rental by ID.
    pub async fn get_rental(&self, id: &str) -> DbResult<Option<Rental>> {
        let rental = sqlx::query_as(&format!("{SELECT_RENTAL} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rental)
    }

    /// Gets the income tag of a rental, if any.
    pub async fn get_income(&self, rental_id: &str) -> DbResult<Option<Income>> {
        let income =
            sqlx::query_as("SELECT id, rental_id, created_at FROM incomes WHERE rental_id = ?1")
                .bind(rental_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(income)
    }
}

/// Quantity × unit price, or the flat-fee override when the form
/// priced the whole event directly (campground bookings).
fn compute_amount(tariff: &Tariff, quantity: i64, override_amount: Option<Money>) -> Money {
    override_amount.unwrap_or_else(|| tariff.price().multiply_quantity(quantity))
}

async fn require_rental(conn: &mut SqliteConnection, id: &str) -> LedgerResult<Rental> {
    let rental: Option<Rental> = sqlx::query_as(&format!("{SELECT_RENTAL} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    rental.ok_or_else(|| CoreError::RentalNotFound(id.to_string()).into())
}

async fn require_income(
    conn: &mut SqliteConnection,
    rental_id: &str,
    unit_id: &str,
) -> LedgerResult<Income> {
    let income: Option<Income> =
        sqlx::query_as("SELECT id, rental_id, created_at FROM incomes WHERE rental_id = ?1")
            .bind(rental_id)
            .fetch_optional(&mut *conn)
            .await?;

    // A rental without its income tag means the original write was
    // torn; refuse to guess.
    income.ok_or_else(|| {
        CoreError::ReconciliationMismatch {
            unit_id: unit_id.to_string(),
            detail: format!("rental {} carries no income tag", rental_id),
        }
        .into()
    })
}

async fn fetch_tariff(conn: &mut SqliteConnection, tariff_id: &str) -> LedgerResult<Tariff> {
    let tariff: Option<Tariff> = sqlx::query_as(
        "SELECT id, unit_id, category, price_rupiah, uom, created_at FROM tariffs WHERE id = ?1",
    )
    .bind(tariff_id)
    .fetch_optional(&mut *conn)
    .await?;

    tariff.ok_or_else(|| crate::error::DbError::not_found("Tariff", tariff_id).into())
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
    async fn test_record_income_appends_entry() {
        // Unit starts at 500.000; one hour at 250.000
        let (db, unit_id) = seeded_db(500_000).await;

        let rental = db
            .incomes()
            .record_income(&unit_id, FUTSAL_HOURLY, "Karang Taruna", 1, None, None)
            .await
            .unwrap();
        assert_eq!(rental.total_rupiah, 250_000);

        let entry = db.ledger().latest_for_unit(&unit_id).await.unwrap().unwrap();
        assert_eq!(entry.balance_before_rupiah, 500_000);
        assert_eq!(entry.balance_after_rupiah, 750_000);
        assert_eq!(entry.kind, LedgerKind::Income);
        assert!(entry.initial_balance_id.is_some());

        db.ledger().verify_unit_chain(&unit_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_record_income_flat_override() {
        let (db, unit_id) = seeded_db(0).await;

        let rental = db
            .incomes()
            .record_income(
                &unit_id,
                FUTSAL_HOURLY,
                "SMP Negeri 2",
                3,
                Some(Money::from_rupiah(600_000)),
                Some("Paket turnamen"),
            )
            .await
            .unwrap();

        // Override wins over quantity × price
        assert_eq!(rental.total_rupiah, 600_000);
        assert_eq!(
            db.ledger().current_balance(&unit_id).await.unwrap(),
            Money::from_rupiah(600_000)
        );
    }

    #[tokio::test]
    async fn test_record_income_unknown_tariff_writes_nothing() {
        let (db, unit_id) = seeded_db(500_000).await;

        let err = db
            .incomes()
            .record_income(&unit_id, "Turnamen", "PT Maju", 1, None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::TariffNotFound { .. })
        ));

        let rentals: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rentals")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rentals, 0);
        assert!(db.ledger().latest_for_unit(&unit_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_edit_income_adjusts_entry() {
        let (db, unit_id) = seeded_db(500_000).await;

        let rental = db
            .incomes()
            .record_income(&unit_id, FUTSAL_HOURLY, "Karang Taruna", 1, None, None)
            .await
            .unwrap();

        // Quantity 1 → 2 doubles the amount
        let edited = db
            .incomes()
            .edit_income(&rental.id, 2, None, None, None)
            .await
            .unwrap();
        assert_eq!(edited.total_rupiah, 500_000);

        let entry = db.ledger().latest_for_unit(&unit_id).await.unwrap().unwrap();
        assert_eq!(entry.balance_before_rupiah, 500_000);
        assert_eq!(entry.balance_after_rupiah, 1_000_000);

        db.ledger().verify_unit_chain(&unit_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_edit_income_roundtrip_restores_balance() {
        let (db, unit_id) = seeded_db(500_000).await;

        let rental = db
            .incomes()
            .record_income(&unit_id, FUTSAL_HOURLY, "Karang Taruna", 1, None, None)
            .await
            .unwrap();
        let before = db.ledger().current_balance(&unit_id).await.unwrap();

        db.incomes()
            .edit_income(&rental.id, 4, None, None, None)
            .await
            .unwrap();
        db.incomes()
            .edit_income(&rental.id, 1, None, None, None)
            .await
            .unwrap();

        assert_eq!(db.ledger().current_balance(&unit_id).await.unwrap(), before);
        db.ledger().verify_unit_chain(&unit_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_edit_income_rebases_later_entries() {
        let (db, unit_id) = seeded_db(500_000).await;

        let rental = db
            .incomes()
            .record_income(&unit_id, FUTSAL_HOURLY, "Karang Taruna", 1, None, None)
            .await
            .unwrap();
        // A later event lands on the same unit's ledger
        db.expenses()
            .record_expense(&unit_id, "Perawatan lapangan", None, Money::from_rupiah(100_000))
            .await
            .unwrap();

        // Editing the FIRST event must shift the later entry too
        db.incomes()
            .edit_income(&rental.id, 2, None, None, None)
            .await
            .unwrap();

        let history = db.ledger().history_for_unit(&unit_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].balance_after_rupiah, 1_000_000);
        assert_eq!(history[1].balance_before_rupiah, 1_000_000);
        assert_eq!(history[1].balance_after_rupiah, 900_000);

        db.ledger().verify_unit_chain(&unit_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_edit_income_unknown_category_rolls_back() {
        let (db, unit_id) = seeded_db(500_000).await;

        let rental = db
            .incomes()
            .record_income(&unit_id, FUTSAL_HOURLY, "Karang Taruna", 1, None, None)
            .await
            .unwrap();

        let err = db
            .incomes()
            .edit_income(&rental.id, 2, Some("Kategori hantu"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::TariffNotFound { .. })
        ));

        // Nothing changed
        let unchanged = db.incomes().get_rental(&rental.id).await.unwrap().unwrap();
        assert_eq!(unchanged.quantity, 1);
        assert_eq!(unchanged.total_rupiah, 250_000);
        db.ledger().verify_unit_chain(&unit_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_edit_unknown_rental() {
        let (db, _unit_id) = seeded_db(500_000).await;

        let err = db
            .incomes()
            .edit_income("missing-id", 2, None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::RentalNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_income_restores_balance() {
        let (db, unit_id) = seeded_db(500_000).await;

        let rental = db
            .incomes()
            .record_income(&unit_id, FUTSAL_HOURLY, "Karang Taruna", 1, None, None)
            .await
            .unwrap();

        db.incomes().delete_income(&rental.id).await.unwrap();

        assert_eq!(
            db.ledger().current_balance(&unit_id).await.unwrap(),
            Money::from_rupiah(500_000)
        );
        assert!(db.incomes().get_rental(&rental.id).await.unwrap().is_none());
        assert!(db.incomes().get_income(&rental.id).await.unwrap().is_none());
        db.ledger().verify_unit_chain(&unit_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_income_rebases_later_entries() {
        let (db, unit_id) = seeded_db(500_000).await;

        let rental = db
            .incomes()
            .record_income(&unit_id, FUTSAL_HOURLY, "Karang Taruna", 1, None, None)
            .await
            .unwrap();
        db.expenses()
            .record_expense(&unit_id, "Listrik", None, Money::from_rupiah(50_000))
            .await
            .unwrap();

        db.incomes().delete_income(&rental.id).await.unwrap();

        let history = db.ledger().history_for_unit(&unit_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].balance_before_rupiah, 500_000);
        assert_eq!(history[0].balance_after_rupiah, 450_000);
        db.ledger().verify_unit_chain(&unit_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_mixed_sequence_sums_to_final_balance() {
        // Final balance = initial + Σ income − Σ expense, whatever the order
        let (db, unit_id) = seeded_db(1_000_000).await;

        db.incomes()
            .record_income(&unit_id, FUTSAL_HOURLY, "A", 2, None, None)
            .await
            .unwrap(); // +500.000
        db.expenses()
            .record_expense(&unit_id, "Listrik", None, Money::from_rupiah(150_000))
            .await
            .unwrap(); // −150.000
        db.incomes()
            .record_income(&unit_id, FUTSAL_HOURLY, "B", 1, None, None)
            .await
            .unwrap(); // +250.000
        db.expenses()
            .record_expense(&unit_id, "Perawatan", None, Money::from_rupiah(400_000))
            .await
            .unwrap(); // −400.000

        assert_eq!(
            db.ledger().current_balance(&unit_id).await.unwrap(),
            Money::from_rupiah(1_200_000)
        );
        db.ledger().verify_unit_chain(&unit_id).await.unwrap();
    }
}
