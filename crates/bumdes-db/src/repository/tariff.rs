//! # Tariff Repository
//!
//! Database operations for per-unit price lists.
//!
//! ## Resolution Contract
//! Given a unit id and a category label (possibly derived by the form,
//! e.g. ">300 peserta" vs "≤300 peserta"), return the matching tariff —
//! or fail with `TariffNotFound` before anything is written. Resolution
//! happens at record time AND at edit time, because an edit may change
//! the category.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbResult, LedgerResult};
use bumdes_core::{CoreError, Money, Tariff, UnitOfMeasure};

const SELECT_TARIFF: &str =
    "SELECT id, unit_id, category, price_rupiah, uom, created_at FROM tariffs";

/// Resolves a tariff inside an open transaction.
///
/// Write operations resolve through this so the lookup shares the
/// writer's transaction and connection.
pub(crate) async fn resolve_tariff(
    conn: &mut SqliteConnection,
    unit_id: &str,
    category: &str,
) -> LedgerResult<Tariff> {
    let tariff: Option<Tariff> =
        sqlx::query_as(&format!("{SELECT_TARIFF} WHERE unit_id = ?1 AND category = ?2"))
            .bind(unit_id)
            .bind(category)
            .fetch_optional(&mut *conn)
            .await?;

    tariff.ok_or_else(|| {
        CoreError::TariffNotFound {
            unit_id: unit_id.to_string(),
            category: category.to_string(),
        }
        .into()
    })
}

/// Repository for tariff table operations.
#[derive(Debug, Clone)]
pub struct TariffRepository {
    pool: SqlitePool,
}

impl TariffRepository {
    /// Creates a new TariffRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TariffRepository { pool }
    }

    /// Adds a price list entry for a unit.
    pub async fn insert(
        &self,
        unit_id: &str,
        category: &str,
        price: Money,
        uom: UnitOfMeasure,
    ) -> DbResult<Tariff> {
        let tariff = Tariff {
            id: Uuid::new_v4().to_string(),
            unit_id: unit_id.to_string(),
            category: category.to_string(),
            price_rupiah: price.rupiah(),
            uom,
            created_at: Utc::now(),
        };

        debug!(unit_id = %unit_id, category = %category, price = %price, "Adding tariff");

        sqlx::query(
            r#"
            INSERT INTO tariffs (id, unit_id, category, price_rupiah, uom, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&tariff.id)
        .bind(&tariff.unit_id)
        .bind(&tariff.category)
        .bind(tariff.price_rupiah)
        .bind(tariff.uom)
        .bind(tariff.created_at)
        .execute(&self.pool)
        .await?;

        Ok(tariff)
    }

    /// Resolves a unit's tariff by category label.
    ///
    /// ## Errors
    /// `CoreError::TariffNotFound` when the unit's price list carries
    /// no such category.
    pub async fn resolve(&self, unit_id: &str, category: &str) -> LedgerResult<Tariff> {
        let mut conn = self.pool.acquire().await?;
        resolve_tariff(&mut conn, unit_id, category).await
    }

    /// Gets a tariff by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Tariff>> {
        let tariff = sqlx::query_as(&format!("{SELECT_TARIFF} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tariff)
    }

    /// Lists a unit's full price list, alphabetically by category.
    pub async fn list_for_unit(&self, unit_id: &str) -> DbResult<Vec<Tariff>> {
        let tariffs = sqlx::query_as(&format!(
            "{SELECT_TARIFF} WHERE unit_id = ?1 ORDER BY category"
        ))
        .bind(unit_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tariffs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::LedgerError;
    use crate::pool::{Database, DbConfig};
    use bumdes_core::{CoreError, Money, UnitOfMeasure};

    #[tokio::test]
    async fn test_resolve_tariff() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let unit = db.units().insert("Lapangan Futsal").await.unwrap();

        db.tariffs()
            .insert(
                &unit.id,
                "Member per jam",
                Money::from_rupiah(100_000),
                UnitOfMeasure::Hour,
            )
            .await
            .unwrap();

        let tariff = db
            .tariffs()
            .resolve(&unit.id, "Member per jam")
            .await
            .unwrap();
        assert_eq!(tariff.price_rupiah, 100_000);
        assert_eq!(tariff.uom, UnitOfMeasure::Hour);
    }

    #[tokio::test]
    async fn test_resolve_unknown_category() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let unit = db.units().insert("Lapangan Futsal").await.unwrap();

        let err = db.tariffs().resolve(&unit.id, "Turnamen").await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::TariffNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_category_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let unit = db.units().insert("Kios Pasar Desa").await.unwrap();

        db.tariffs()
            .insert(
                &unit.id,
                "Sewa bulanan",
                Money::from_rupiah(150_000),
                UnitOfMeasure::Month,
            )
            .await
            .unwrap();

        let err = db
            .tariffs()
            .insert(
                &unit.id,
                "Sewa bulanan",
                Money::from_rupiah(175_000),
                UnitOfMeasure::Month,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::DbError::UniqueViolation { .. }));
    }
}
