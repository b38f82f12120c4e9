//! # Repository Layer
//!
//! One repository per aggregate, each holding a cheap clone of the
//! shared `SqlitePool`. Writers that touch the ledger (income,
//! expense) open a transaction and go through `crate::ledger` so the
//! balance chain is maintained in one place.

pub mod expense;
pub mod income;
pub mod report;
pub mod tariff;
pub mod unit;
