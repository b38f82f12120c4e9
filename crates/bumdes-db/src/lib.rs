//! # BUMDes Ledger Database Layer
//!
//! SQLite persistence for the village enterprise ledger: connection
//! pooling, migrations, and repositories for units, tariffs, incomes,
//! expenses, the balance chain, and reports.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Database                             │
//! │                    (SqlitePool handle)                      │
//! ├─────────────┬──────────────┬──────────────┬─────────────────┤
//! │  units()    │  tariffs()   │  incomes()   │  expenses()     │
//! │  registry + │  price list  │  rental +    │  spending       │
//! │  initial    │  per unit    │  income tag  │  per unit       │
//! │  balances   │              │  writer      │  writer         │
//! ├─────────────┴──────────────┼──────────────┴─────────────────┤
//! │         ledger()           │           reports()            │
//! │  balance chain queries +   │  statements, monthly summary,  │
//! │  chain verification        │  per-unit breakdown            │
//! └────────────────────────────┴────────────────────────────────┘
//! ```
//!
//! Every income and expense write goes through the single ledger
//! service in [`ledger`], inside the writer's own transaction, so a
//! unit's balance chain never tears.

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export main types for convenience
pub use error::{DbError, DbResult, LedgerError, LedgerResult};
pub use ledger::LedgerRepository;
pub use pool::{Database, DbConfig};
pub use repository::expense::ExpenseRepository;
pub use repository::income::IncomeRepository;
pub use repository::report::ReportRepository;
pub use repository::tariff::TariffRepository;
pub use repository::unit::UnitRepository;
