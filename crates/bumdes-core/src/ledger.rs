//! # Ledger Reconciliation Math
//!
//! The pure half of the Ledger Consistency Component: given a balance
//! and a typed financial event, where does the balance go — and given a
//! recorded history, is the chain still intact?
//!
//! ## The Balance Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 One Unit's Balance History                              │
//! │                                                                         │
//! │  InitialBalance: 500.000                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Entry 1 (income, +250.000)   before: 500.000  after: 750.000          │
//! │       │                                              │                  │
//! │       │            before of next == after of prev ──┘                  │
//! │       ▼                                                                 │
//! │  Entry 2 (expense, −100.000)  before: 750.000  after: 650.000          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Entry 3 (income, +50.000)    before: 650.000  after: 700.000          │
//! │                                                                         │
//! │  Editing Entry 1 shifts every later entry by the same delta;           │
//! │  deleting it shifts them by the negated delta. That rebase is what     │
//! │  keeps this chain a chain.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is a pure function over in-memory values. The
//! database side (`bumdes-db::ledger`) turns these into SQL inside a
//! transaction.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{LedgerEntry, LedgerKind};

// =============================================================================
// Ledger Event
// =============================================================================

/// A typed financial event against one unit's ledger.
///
/// Both writers (income and expense) speak this interface, so the
/// reconciliation rules exist exactly once instead of being duplicated
/// per business unit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerEvent {
    /// Unit whose balance this event moves.
    pub unit_id: String,

    /// Direction of the balance change.
    pub kind: LedgerKind,

    /// Unsigned event amount.
    pub amount: Money,
}

impl LedgerEvent {
    /// An income event: balance goes up by `amount`.
    pub fn income(unit_id: impl Into<String>, amount: Money) -> Self {
        LedgerEvent {
            unit_id: unit_id.into(),
            kind: LedgerKind::Income,
            amount,
        }
    }

    /// An expense event: balance goes down by `amount`.
    pub fn expense(unit_id: impl Into<String>, amount: Money) -> Self {
        LedgerEvent {
            unit_id: unit_id.into(),
            kind: LedgerKind::Expense,
            amount,
        }
    }

    /// The signed balance change this event causes.
    #[inline]
    pub fn signed_delta(&self) -> Money {
        signed_delta(self.kind, self.amount)
    }

    /// The balance after applying this event to `before`.
    #[inline]
    pub fn apply(&self, before: Money) -> Money {
        before + self.signed_delta()
    }
}

/// Signed delta for a kind/amount pair: `+amount` for income,
/// `−amount` for expense.
#[inline]
pub fn signed_delta(kind: LedgerKind, amount: Money) -> Money {
    match kind {
        LedgerKind::Income => amount,
        LedgerKind::Expense => -amount,
    }
}

// =============================================================================
// Chain Verification
// =============================================================================

/// Verifies the balance-chain invariant over a unit's full history.
///
/// ## Checks
/// 1. The first entry's balance-before equals the initial balance.
/// 2. Every later entry's balance-before equals the previous entry's
///    balance-after.
/// 3. Every entry's delta has the sign its kind demands (income never
///    decreases the balance, expense never increases it).
///
/// ## Arguments
/// * `unit_id` - For error context only
/// * `initial` - The unit's InitialBalance amount
/// * `entries` - Full history, oldest first (ordered by `seq`)
///
/// ## Errors
/// `CoreError::ReconciliationMismatch` naming the first break found.
pub fn verify_chain(unit_id: &str, initial: Money, entries: &[LedgerEntry]) -> CoreResult<()> {
    let mut expected = initial;

    for entry in entries {
        if entry.balance_before() != expected {
            return Err(CoreError::ReconciliationMismatch {
                unit_id: unit_id.to_string(),
                detail: format!(
                    "entry {} (seq {}) starts at {} but the chain expects {}",
                    entry.id,
                    entry.seq,
                    entry.balance_before(),
                    expected
                ),
            });
        }

        let delta = entry.delta();
        let sign_ok = match entry.kind {
            LedgerKind::Income => !delta.is_negative(),
            LedgerKind::Expense => !delta.is_positive(),
        };
        if !sign_ok {
            return Err(CoreError::ReconciliationMismatch {
                unit_id: unit_id.to_string(),
                detail: format!(
                    "entry {} (seq {}) is {:?} but records a delta of {}",
                    entry.id, entry.seq, entry.kind, delta
                ),
            });
        }

        expected = entry.balance_after();
    }

    Ok(())
}

/// The closing balance implied by a history: the last entry's
/// balance-after, or the initial balance when the history is empty.
pub fn closing_balance(initial: Money, entries: &[LedgerEntry]) -> Money {
    entries
        .last()
        .map(LedgerEntry::balance_after)
        .unwrap_or(initial)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rp(v: i64) -> Money {
        Money::from_rupiah(v)
    }

    fn entry(seq: i64, kind: LedgerKind, before: i64, after: i64) -> LedgerEntry {
        LedgerEntry {
            seq,
            id: format!("entry-{seq}"),
            unit_id: "futsal".to_string(),
            initial_balance_id: (seq == 1).then(|| "ib-1".to_string()),
            income_id: matches!(kind, LedgerKind::Income).then(|| format!("inc-{seq}")),
            expense_id: matches!(kind, LedgerKind::Expense).then(|| format!("exp-{seq}")),
            kind,
            balance_before_rupiah: before,
            balance_after_rupiah: after,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_event_deltas() {
        let income = LedgerEvent::income("futsal", rp(250_000));
        assert_eq!(income.signed_delta(), rp(250_000));
        assert_eq!(income.apply(rp(500_000)), rp(750_000));

        let expense = LedgerEvent::expense("futsal", rp(500_000));
        assert_eq!(expense.signed_delta(), rp(-500_000));
        assert_eq!(expense.apply(rp(500_000)), rp(0));
    }

    #[test]
    fn test_verify_chain_ok() {
        let entries = vec![
            entry(1, LedgerKind::Income, 500_000, 750_000),
            entry(2, LedgerKind::Expense, 750_000, 650_000),
            entry(3, LedgerKind::Income, 650_000, 700_000),
        ];
        assert!(verify_chain("futsal", rp(500_000), &entries).is_ok());
        assert_eq!(closing_balance(rp(500_000), &entries), rp(700_000));
    }

    #[test]
    fn test_verify_chain_empty_history() {
        assert!(verify_chain("futsal", rp(500_000), &[]).is_ok());
        assert_eq!(closing_balance(rp(500_000), &[]), rp(500_000));
    }

    #[test]
    fn test_verify_chain_detects_wrong_baseline() {
        let entries = vec![entry(1, LedgerKind::Income, 400_000, 650_000)];
        let err = verify_chain("futsal", rp(500_000), &entries).unwrap_err();
        assert!(matches!(err, CoreError::ReconciliationMismatch { .. }));
    }

    #[test]
    fn test_verify_chain_detects_break_between_entries() {
        let entries = vec![
            entry(1, LedgerKind::Income, 500_000, 750_000),
            // Stale: was not rebased after an upstream edit
            entry(2, LedgerKind::Expense, 700_000, 600_000),
        ];
        let err = verify_chain("futsal", rp(500_000), &entries).unwrap_err();
        match err {
            CoreError::ReconciliationMismatch { detail, .. } => {
                assert!(detail.contains("seq 2"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_verify_chain_detects_wrong_sign() {
        // An "income" that lowered the balance
        let entries = vec![entry(1, LedgerKind::Income, 500_000, 450_000)];
        assert!(verify_chain("futsal", rp(500_000), &entries).is_err());
    }
}
