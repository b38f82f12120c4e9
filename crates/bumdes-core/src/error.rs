//! # Error Types
//!
//! Domain-specific error types for bumdes-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bumdes-core errors (this file)                                        │
//! │  ├── CoreError        - Domain lookup / reconciliation failures        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bumdes-db errors (separate crate)                                     │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── LedgerError      - Core ∪ Db, returned by write operations        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError → flash message       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (unit id, category, etc.)
//! 3. Errors are enum variants, never String
//! 4. Every failed write rolls back its whole transaction

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent domain lookup failures and balance-chain violations.
/// The presentation layer translates them to flash messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No tariff row matches the (unit, category) pair.
    ///
    /// ## When This Occurs
    /// - A form posts a category the unit's price list doesn't carry
    /// - An edit changes the category to one that was since removed
    ///
    /// Nothing is written when tariff resolution fails: no rental,
    /// no income, no ledger entry.
    #[error("No tariff for unit {unit_id} with category '{category}'")]
    TariffNotFound { unit_id: String, category: String },

    /// Rental (the income-side transaction record) cannot be found.
    #[error("Rental not found: {0}")]
    RentalNotFound(String),

    /// Expense record cannot be found.
    #[error("Expense not found: {0}")]
    ExpenseNotFound(String),

    /// Business unit cannot be found.
    #[error("Business unit not found: {0}")]
    UnitNotFound(String),

    /// The ledger does not carry a usable entry for a financial event,
    /// or the balance chain is broken.
    ///
    /// ## When This Occurs
    /// - Deleting an expense whose ledger entry is missing
    /// - An entry's recorded delta no longer matches its source amount
    /// - `verify_chain` finds a before/after discontinuity
    ///
    /// The enclosing transaction is rolled back; no partial deletes.
    #[error("Ledger reconciliation failed for unit {unit_id}: {detail}")]
    ReconciliationMismatch { unit_id: String, detail: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when form input doesn't meet requirements and are
/// surfaced inline per field. Used before any business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::TariffNotFound {
            unit_id: "futsal".to_string(),
            category: "Turnamen".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No tariff for unit futsal with category 'Turnamen'"
        );

        let err = CoreError::ReconciliationMismatch {
            unit_id: "futsal".to_string(),
            detail: "no ledger entry for expense abc".to_string(),
        };
        assert!(err.to_string().contains("reconciliation failed"));
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "party_name".to_string(),
        };
        assert_eq!(err.to_string(), "party_name is required");

        let err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        assert_eq!(err.to_string(), "amount must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "category".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
