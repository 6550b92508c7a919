//! Escrow engine.
//!
//! Funds attached to an invite are pulled through the settlement effect and
//! counted in the document's `held` balance; signing releases the signatory's
//! share exactly once. Every method here either moves funds and returns a plan
//! the caller must commit, or fails without moving anything. Committing a plan
//! cannot fail, so a successful transfer is never left without its state change.
//!
//! Invariant: `record.held == record.outstanding()` after every operation.

use crate::store::DocumentRecord;
use crate::types::Signatory;
use cosign_core::{AccountId, Amount, LedgerError, Result, SettlementEffects, Timestamp};
use std::sync::Arc;

/// A deposit whose funds have already been collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "collected funds must be committed to the record"]
pub struct Deposit {
    /// Amount collected from the caller
    pub amount: Amount,
    /// Document escrow balance once committed
    pub held_after: Amount,
}

/// A payout whose funds have already been transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "released funds must be committed to the record"]
pub struct Payout {
    /// Signatory index the payout belongs to
    pub index: usize,
    /// Amount transferred to the signer (possibly zero)
    pub amount: Amount,
    /// Document escrow balance once committed
    pub held_after: Amount,
}

/// Holds invite deposits and releases them on signing.
#[derive(Clone)]
pub struct EscrowEngine {
    settlement: Arc<dyn SettlementEffects>,
}

impl EscrowEngine {
    /// Create an engine that moves funds through `settlement`.
    pub fn new(settlement: Arc<dyn SettlementEffects>) -> Self {
        Self { settlement }
    }

    /// Collect `amount` from `from` for a new signatory on `record`.
    ///
    /// The overflow check runs before any funds move. Zero-amount invites
    /// never touch the settlement handler.
    pub fn collect(
        &self,
        record: &DocumentRecord,
        from: &AccountId,
        amount: Amount,
    ) -> Result<Deposit> {
        let held_after = record
            .held
            .checked_add(amount)
            .ok_or_else(|| LedgerError::EscrowOverflow {
                hash: record.document.hash.clone(),
                amount,
            })?;

        if !amount.is_zero() {
            self.settlement.debit(from, amount).map_err(|err| {
                tracing::warn!(
                    document = %record.document.hash,
                    caller = %from,
                    %amount,
                    error = %err,
                    "escrow deposit failed"
                );
                LedgerError::Settlement(err)
            })?;
        }

        Ok(Deposit { amount, held_after })
    }

    /// Release the escrow owed to the signatory at `index`.
    ///
    /// Transfers exactly `amount_due` to the signatory's address when it is
    /// non-zero. Fails with `InvariantViolation` rather than transferring if
    /// the record's balance could not cover the payout.
    pub fn release(&self, record: &DocumentRecord, index: usize) -> Result<Payout> {
        let hash = &record.document.hash;
        let signatory = record.signatories.get(index).ok_or_else(|| {
            LedgerError::invariant_violation(hash, format!("no signatory at index {index}"))
        })?;
        if signatory.paid {
            return Err(LedgerError::invariant_violation(
                hash,
                format!("signatory {} was already paid", signatory.address),
            ));
        }

        let amount = signatory.amount_due;
        let held_after = record.held.checked_sub(amount).ok_or_else(|| {
            LedgerError::invariant_violation(
                hash,
                format!("escrow holds {} but {} is owed", record.held, amount),
            )
        })?;

        if !amount.is_zero() {
            self.settlement
                .credit(&signatory.address, amount)
                .map_err(|err| {
                    tracing::warn!(
                        document = %hash,
                        signer = %signatory.address,
                        %amount,
                        error = %err,
                        "escrow release failed"
                    );
                    LedgerError::Settlement(err)
                })?;
        }

        Ok(Payout {
            index,
            amount,
            held_after,
        })
    }
}

impl Deposit {
    /// Record the collected funds and append the new signatory.
    pub(crate) fn commit(self, record: &mut DocumentRecord, signatory: Signatory) {
        debug_assert_eq!(signatory.amount_due, self.amount);
        record.signatories.push(signatory);
        record.signatures.push(crate::types::SignatureSlot::Unsigned);
        record.held = self.held_after;
    }
}

impl Payout {
    /// Mark the signatory paid and signed at `at`.
    pub(crate) fn commit(self, record: &mut DocumentRecord, at: Timestamp) {
        if let Some(signatory) = record.signatories.get_mut(self.index) {
            signatory.amount_due = Amount::ZERO;
            signatory.paid = true;
            signatory.signed_at = Some(at);
        }
        record.held = self.held_after;
    }
}

impl std::fmt::Debug for EscrowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscrowEngine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Document, InviteSignatory, SignatureSlot};
    use cosign_core::{DocumentHash, HashAlgorithm, SettlementError};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSettlement {
        calls: Mutex<Vec<(&'static str, AccountId, Amount)>>,
        fail: bool,
    }

    impl SettlementEffects for RecordingSettlement {
        fn debit(&self, from: &AccountId, amount: Amount) -> std::result::Result<(), SettlementError> {
            if self.fail {
                return Err(SettlementError::unavailable("offline"));
            }
            self.calls.lock().push(("debit", *from, amount));
            Ok(())
        }

        fn credit(&self, to: &AccountId, amount: Amount) -> std::result::Result<(), SettlementError> {
            if self.fail {
                return Err(SettlementError::unavailable("offline"));
            }
            self.calls.lock().push(("credit", *to, amount));
            Ok(())
        }
    }

    fn account(seed: u8) -> AccountId {
        AccountId::from_bytes([seed; 20])
    }

    fn record() -> DocumentRecord {
        DocumentRecord::new(Document {
            hash: DocumentHash::from_bytes(b"xyz".to_vec()).unwrap(),
            name: "xyz".to_string(),
            description: String::new(),
            owner: account(1),
            algorithm: HashAlgorithm::Sha256,
            created_at: Timestamp::EPOCH,
        })
    }

    fn invite(seed: u8, amount: u128) -> Signatory {
        let request = InviteSignatory::new(record().document.hash, account(seed), "s", "")
            .with_escrow(Amount::new(amount));
        Signatory::invited(&request)
    }

    #[test]
    fn deposit_then_release_conserves_funds() {
        let settlement = Arc::new(RecordingSettlement::default());
        let engine = EscrowEngine::new(settlement.clone());
        let mut record = record();

        let deposit = engine.collect(&record, &account(1), Amount::new(5)).unwrap();
        deposit.commit(&mut record, invite(2, 5));
        assert_eq!(record.held, Amount::new(5));
        assert!(record.check_invariants().is_ok());

        let payout = engine.release(&record, 0).unwrap();
        assert_eq!(payout.amount, Amount::new(5));
        record.signatures[0] = SignatureSlot::Signed(account(2));
        payout.commit(&mut record, Timestamp::from_millis(10));

        assert_eq!(record.held, Amount::ZERO);
        assert!(record.signatories[0].paid);
        assert!(record.check_invariants().is_ok());
        assert_eq!(
            *settlement.calls.lock(),
            vec![
                ("debit", account(1), Amount::new(5)),
                ("credit", account(2), Amount::new(5)),
            ]
        );
    }

    #[test]
    fn zero_amounts_skip_settlement() {
        let settlement = Arc::new(RecordingSettlement::default());
        let engine = EscrowEngine::new(settlement.clone());
        let mut record = record();

        engine
            .collect(&record, &account(1), Amount::ZERO)
            .unwrap()
            .commit(&mut record, invite(2, 0));
        let payout = engine.release(&record, 0).unwrap();
        assert!(payout.amount.is_zero());
        assert!(settlement.calls.lock().is_empty());
    }

    #[test]
    fn settlement_failure_moves_nothing() {
        let engine = EscrowEngine::new(Arc::new(RecordingSettlement {
            fail: true,
            ..Default::default()
        }));
        let record = record();
        let err = engine.collect(&record, &account(1), Amount::new(3)).unwrap_err();
        assert!(matches!(err, LedgerError::Settlement(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn overflow_is_rejected_before_debit() {
        let settlement = Arc::new(RecordingSettlement::default());
        let engine = EscrowEngine::new(settlement.clone());
        let mut record = record();
        record.held = Amount::new(u128::MAX);

        let err = engine.collect(&record, &account(1), Amount::new(1)).unwrap_err();
        assert!(matches!(err, LedgerError::EscrowOverflow { .. }));
        assert!(settlement.calls.lock().is_empty());
    }

    #[test]
    fn release_refuses_paid_signatory() {
        let engine = EscrowEngine::new(Arc::new(RecordingSettlement::default()));
        let mut record = record();
        let mut signatory = invite(2, 0);
        signatory.paid = true;
        record.signatories.push(signatory);
        record.signatures.push(SignatureSlot::Unsigned);

        assert!(matches!(
            engine.release(&record, 0),
            Err(LedgerError::InvariantViolation { .. })
        ));
    }
}
