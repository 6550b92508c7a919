//! In-memory account book.
//!
//! Tracks a balance per account plus the funds in escrow custody. A debit
//! moves funds from an account into custody; a credit moves them back out.
//! Every transfer happens under one lock, so the total across accounts and
//! custody only changes through `fund`.

use cosign_core::{AccountId, Amount, SettlementEffects, SettlementError};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Book {
    balances: HashMap<AccountId, Amount>,
    custody: Amount,
}

/// Settlement handler backed by an in-memory balance table.
#[derive(Debug, Default)]
pub struct InMemoryBank {
    book: Mutex<Book>,
}

impl InMemoryBank {
    /// Create a bank with no balances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `account`, returning the new balance.
    ///
    /// Saturates at `u128::MAX`.
    pub fn fund(&self, account: AccountId, amount: Amount) -> Amount {
        let mut book = self.book.lock();
        let balance = book.balances.entry(account).or_default();
        *balance = balance
            .checked_add(amount)
            .unwrap_or(Amount::new(u128::MAX));
        *balance
    }

    /// Current balance of `account`.
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.book
            .lock()
            .balances
            .get(account)
            .copied()
            .unwrap_or_default()
    }

    /// Funds currently in escrow custody across all documents.
    pub fn custody(&self) -> Amount {
        self.book.lock().custody
    }

    /// Sum of every account balance plus custody.
    pub fn total_supply(&self) -> Amount {
        let book = self.book.lock();
        book.balances
            .values()
            .copied()
            .sum::<Amount>()
            .checked_add(book.custody)
            .unwrap_or(Amount::new(u128::MAX))
    }
}

impl SettlementEffects for InMemoryBank {
    fn debit(&self, from: &AccountId, amount: Amount) -> Result<(), SettlementError> {
        let mut book = self.book.lock();
        let available = book.balances.get(from).copied().unwrap_or_default();
        let remaining = available
            .checked_sub(amount)
            .ok_or(SettlementError::InsufficientFunds {
                account: *from,
                available,
                requested: amount,
            })?;
        let custody = book
            .custody
            .checked_add(amount)
            .ok_or_else(|| SettlementError::unavailable("escrow custody would overflow"))?;

        book.balances.insert(*from, remaining);
        book.custody = custody;
        tracing::trace!(account = %from, %amount, "debited into custody");
        Ok(())
    }

    fn credit(&self, to: &AccountId, amount: Amount) -> Result<(), SettlementError> {
        let mut book = self.book.lock();
        let custody = book
            .custody
            .checked_sub(amount)
            .ok_or(SettlementError::CustodyShortfall {
                available: book.custody,
                requested: amount,
            })?;
        let current = book.balances.get(to).copied().unwrap_or_default();
        let balance = current
            .checked_add(amount)
            .ok_or(SettlementError::BalanceOverflow {
                account: *to,
                amount,
            })?;

        book.balances.insert(*to, balance);
        book.custody = custody;
        tracing::trace!(account = %to, %amount, "credited from custody");
        Ok(())
    }
}
