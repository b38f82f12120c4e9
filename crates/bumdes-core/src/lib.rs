//! # bumdes-core: Pure Business Logic for the BUMDes Ledger
//!
//! This crate is the **heart** of the BUMDes record-keeping system. It
//! contains all business logic as pure functions with zero I/O
//! dependencies — most importantly the ledger reconciliation rules,
//! which previously lived duplicated (and drifting) across a dozen
//! near-identical per-unit controllers.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      BUMDes Ledger Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Frontend (Inertia/React)                       │   │
//! │  │    Unit forms ──► Statement pages ──► Transparency report      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bumdes-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  ledger   │  │  report   │  │   │
//! │  │   │  Tariff   │  │   Money   │  │  events   │  │ statement │  │   │
//! │  │   │  Rental   │  │  rupiah   │  │  chain    │  │ aggregate │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   bumdes-db (Database Layer)                    │   │
//! │  │             SQLite queries, migrations, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (BusinessUnit, Tariff, Rental, LedgerEntry, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`ledger`] - Reconciliation math and balance-chain verification
//! - [`report`] - Statement / aggregate assembly
//! - [`error`] - Domain error types
//! - [`validation`] - Form-input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are whole rupiah (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use bumdes_core::ledger::LedgerEvent;
//! use bumdes_core::money::Money;
//!
//! // A futsal booking: 1 hour at Rp250.000
//! let event = LedgerEvent::income("futsal", Money::from_rupiah(250_000));
//!
//! // Unit currently sits at Rp500.000
//! let after = event.apply(Money::from_rupiah(500_000));
//! assert_eq!(after, Money::from_rupiah(750_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use bumdes_core::Money` instead of
// `use bumdes_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::LedgerEvent;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity accepted on a single rental form
///
/// ## Business Reason
/// The largest legitimate quantity in any unit is a campground booking
/// by participant count; anything past this is a typo (e.g. a phone
/// number pasted into the quantity field).
pub const MAX_QUANTITY: i64 = 10_000;

/// Maximum length of a party name
pub const MAX_PARTY_NAME_LEN: usize = 120;

/// Maximum length of a tariff or expense category label
pub const MAX_CATEGORY_LEN: usize = 80;

/// Maximum length of a free-text note
///
/// ## Business Reason
/// Notes are printed verbatim on monthly statements; unbounded notes
/// break the report layout.
pub const MAX_NOTE_LEN: usize = 500;
