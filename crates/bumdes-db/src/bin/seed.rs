//! # Unit Provisioner
//!
//! Registers the five business units with their tariff tables and
//! initial balances for a fresh deployment.
//!
//! ## Usage
//! ```bash
//! # Default database path
//! cargo run -p bumdes-db --bin seed
//!
//! # Specify database path
//! cargo run -p bumdes-db --bin seed -- --db ./data/bumdes.db
//! ```
//!
//! ## Provisioned Units
//! - Lapangan Futsal: hourly field rental (member / non-member rates)
//! - Bumi Perkemahan: flat event fee by participant count
//! - Kios Pasar Desa: monthly and yearly stall leases
//! - Pengelolaan Air Bersih: metered water per m³
//! - Internet Desa: monthly hotspot subscription

use std::env;

use bumdes_core::{Money, UnitOfMeasure};
use bumdes_db::{Database, DbConfig};

/// One unit with its opening balance and price list.
struct UnitSeed {
    name: &'static str,
    initial_rupiah: i64,
    tariffs: &'static [(&'static str, i64, UnitOfMeasure)],
}

const UNITS: &[UnitSeed] = &[
    UnitSeed {
        name: "Lapangan Futsal",
        initial_rupiah: 500_000,
        tariffs: &[
            ("Member per jam", 225_000, UnitOfMeasure::Hour),
            ("Non-member per jam", 250_000, UnitOfMeasure::Hour),
        ],
    },
    UnitSeed {
        name: "Bumi Perkemahan",
        initial_rupiah: 750_000,
        tariffs: &[
            ("≤300 peserta", 1_500_000, UnitOfMeasure::Event),
            (">300 peserta", 2_500_000, UnitOfMeasure::Event),
        ],
    },
    UnitSeed {
        name: "Kios Pasar Desa",
        initial_rupiah: 1_000_000,
        tariffs: &[
            ("Sewa bulanan", 150_000, UnitOfMeasure::Month),
            ("Sewa tahunan", 1_500_000, UnitOfMeasure::Year),
        ],
    },
    UnitSeed {
        name: "Pengelolaan Air Bersih",
        initial_rupiah: 2_000_000,
        tariffs: &[("Pemakaian per m³", 2_500, UnitOfMeasure::CubicMeter)],
    },
    UnitSeed {
        name: "Internet Desa",
        initial_rupiah: 300_000,
        tariffs: &[("Langganan bulanan", 50_000, UnitOfMeasure::Month)],
    },
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./bumdes_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("BUMDes Ledger Unit Provisioner");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./bumdes_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 BUMDes Ledger Unit Provisioner");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing units
    let existing = db.units().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} units", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Provisioning units...");

    for seed in UNITS {
        let unit = db.units().insert(seed.name).await?;
        db.units()
            .set_initial_balance(&unit.id, Money::from_rupiah(seed.initial_rupiah))
            .await?;

        for (category, price, uom) in seed.tariffs {
            db.tariffs()
                .insert(&unit.id, category, Money::from_rupiah(*price), *uom)
                .await?;
        }

        println!(
            "  ✓ {} — saldo awal {}, {} tarif",
            seed.name,
            Money::from_rupiah(seed.initial_rupiah),
            seed.tariffs.len()
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
