//! Settlement with injected failures.

use cosign_core::{AccountId, Amount, SettlementEffects, SettlementError};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Faults {
    debits: usize,
    credits: usize,
}

/// Wraps a settlement handler and fails the next N debits or credits.
///
/// Failed calls never reach the inner handler, so balances are untouched.
pub struct FlakySettlement {
    inner: Arc<dyn SettlementEffects>,
    faults: Mutex<Faults>,
    calls: Mutex<Vec<(&'static str, AccountId, Amount)>>,
}

impl FlakySettlement {
    /// Wrap `inner` with no faults armed.
    pub fn new(inner: Arc<dyn SettlementEffects>) -> Self {
        Self {
            inner,
            faults: Mutex::new(Faults::default()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail the next `count` debits with `Unavailable`.
    pub fn fail_next_debits(&self, count: usize) {
        self.faults.lock().debits = count;
    }

    /// Fail the next `count` credits with `Unavailable`.
    pub fn fail_next_credits(&self, count: usize) {
        self.faults.lock().credits = count;
    }

    /// Successful transfers so far, as `(direction, account, amount)`.
    pub fn calls(&self) -> Vec<(&'static str, AccountId, Amount)> {
        self.calls.lock().clone()
    }

    fn take_fault(counter: &mut usize) -> bool {
        if *counter > 0 {
            *counter -= 1;
            true
        } else {
            false
        }
    }
}

impl SettlementEffects for FlakySettlement {
    fn debit(&self, from: &AccountId, amount: Amount) -> Result<(), SettlementError> {
        if Self::take_fault(&mut self.faults.lock().debits) {
            return Err(SettlementError::unavailable("injected debit failure"));
        }
        self.inner.debit(from, amount)?;
        self.calls.lock().push(("debit", *from, amount));
        Ok(())
    }

    fn credit(&self, to: &AccountId, amount: Amount) -> Result<(), SettlementError> {
        if Self::take_fault(&mut self.faults.lock().credits) {
            return Err(SettlementError::unavailable("injected credit failure"));
        }
        self.inner.credit(to, amount)?;
        self.calls.lock().push(("credit", *to, amount));
        Ok(())
    }
}

impl std::fmt::Debug for FlakySettlement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlakySettlement")
            .field("faults", &*self.faults.lock())
            .finish_non_exhaustive()
    }
}
