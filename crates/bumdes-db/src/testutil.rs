//! Shared fixtures for the crate's tests.

use crate::pool::{Database, DbConfig};
use bumdes_core::{Money, UnitOfMeasure};

/// Tariff category seeded by [`seeded_db`]: Rp250.000 per hour.
pub(crate) const FUTSAL_HOURLY: &str = "Sewa per jam";

/// In-memory database with one futsal unit, its initial balance, and
/// one hourly tariff. Returns the database and the unit's id.
pub(crate) async fn seeded_db(initial_rupiah: i64) -> (Database, String) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let unit = db.units().insert("Lapangan Futsal").await.unwrap();
    db.units()
        .set_initial_balance(&unit.id, Money::from_rupiah(initial_rupiah))
        .await
        .unwrap();
    db.tariffs()
        .insert(
            &unit.id,
            FUTSAL_HOURLY,
            Money::from_rupiah(250_000),
            UnitOfMeasure::Hour,
        )
        .await
        .unwrap();

    (db, unit.id)
}
