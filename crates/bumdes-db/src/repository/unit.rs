//! # Unit Registry Repository
//!
//! Database operations for business units and their initial balances.
//!
//! Units are reference data: the five business lines (futsal field,
//! campground, market stalls, water utility, village internet) are
//! provisioned once by the `seed` binary and never deleted at runtime.
//! Each unit carries exactly one InitialBalance — the baseline its
//! ledger chain starts from.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bumdes_core::{BusinessUnit, InitialBalance, Money};

/// Repository for unit registry operations.
#[derive(Debug, Clone)]
pub struct UnitRepository {
    pool: SqlitePool,
}

impl UnitRepository {
    /// Creates a new UnitRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UnitRepository { pool }
    }

    /// Registers a new business unit.
    pub async fn insert(&self, name: &str) -> DbResult<BusinessUnit> {
        let unit = BusinessUnit {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        debug!(id = %unit.id, name = %unit.name, "Registering business unit");

        sqlx::query("INSERT INTO units (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&unit.id)
            .bind(&unit.name)
            .bind(unit.created_at)
            .execute(&self.pool)
            .await?;

        Ok(unit)
    }

    /// Gets a unit by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<BusinessUnit>> {
        let unit = sqlx::query_as("SELECT id, name, created_at FROM units WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(unit)
    }

    /// Lists all units, alphabetically.
    pub async fn list(&self) -> DbResult<Vec<BusinessUnit>> {
        let units = sqlx::query_as("SELECT id, name, created_at FROM units ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(units)
    }

    /// Counts registered units.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM units")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Gets a unit's InitialBalance.
    pub async fn get_initial_balance(&self, unit_id: &str) -> DbResult<Option<InitialBalance>> {
        let baseline = sqlx::query_as(
            "SELECT id, unit_id, amount_rupiah, created_at, updated_at \
             FROM initial_balances WHERE unit_id = ?1",
        )
        .bind(unit_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(baseline)
    }

    /// Sets a unit's InitialBalance, inserting the row on first use.
    ///
    /// ## One Per Unit
    /// The `unit_id` UNIQUE constraint makes this an upsert: the
    /// baseline's nominal amount can be corrected, but a unit never
    /// grows a second baseline.
    pub async fn set_initial_balance(
        &self,
        unit_id: &str,
        amount: Money,
    ) -> DbResult<InitialBalance> {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        debug!(unit_id = %unit_id, amount = %amount, "Setting initial balance");

        sqlx::query(
            r#"
            INSERT INTO initial_balances (id, unit_id, amount_rupiah, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT (unit_id) DO UPDATE SET
                amount_rupiah = excluded.amount_rupiah,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(unit_id)
        .bind(amount.rupiah())
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_initial_balance(unit_id)
            .await?
            .ok_or_else(|| DbError::not_found("InitialBalance", unit_id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
