//! Effect traits consumed by the ledger.
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `cosign-ledger::handlers` (in-process), `cosign-testkit` (deterministic)
//! - **Usage**: `DocumentLedger` reads the clock on every mutation and moves
//!   escrowed funds through settlement
//!
//! Both traits are synchronous. Ledger calls never suspend, so a handler that
//! talks to a remote backend must complete (or fail) within the call.

use crate::amount::Amount;
use crate::errors::SettlementError;
use crate::identifiers::AccountId;
use crate::time::Timestamp;

/// Source of ledger time.
pub trait ClockEffects: Send + Sync {
    /// Current ledger time.
    fn now(&self) -> Timestamp;
}

/// Moves funds between caller accounts and the ledger's escrow.
///
/// The ledger calls `debit` when an invite attaches funds and `credit` when a
/// signing releases them. Each call must either move exactly `amount` or fail
/// without moving anything; the ledger commits its own state only after the
/// handler reports success. Handlers are never called with a zero amount.
pub trait SettlementEffects: Send + Sync {
    /// Pull `amount` from `from` into escrow.
    fn debit(&self, from: &AccountId, amount: Amount) -> Result<(), SettlementError>;

    /// Release `amount` from escrow to `to`.
    fn credit(&self, to: &AccountId, amount: Amount) -> Result<(), SettlementError>;
}
