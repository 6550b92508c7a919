//! Ready-made ledger with controllable effects.

use crate::strategies::LedgerOp;
use crate::{test_hash, FlakySettlement, ManualClock};
use cosign_core::{AccountId, Amount, DocumentHash, HashAlgorithm, LedgerConfig, Result};
use cosign_ledger::{
    DocumentLedger, InMemoryBank, InviteSignatory, LedgerSnapshot, RegisterDocument,
};
use std::sync::Arc;

/// Start time of every fixture clock.
pub const FIXTURE_EPOCH_MS: u64 = 1_700_000_000_000;

/// A ledger wired to a manual clock and a fault-injecting bank.
pub struct LedgerFixture {
    /// The ledger under test
    pub ledger: DocumentLedger,
    /// Clock the ledger reads
    pub clock: Arc<ManualClock>,
    /// Account book behind the settlement wrapper
    pub bank: Arc<InMemoryBank>,
    /// Settlement handler the ledger calls
    pub settlement: Arc<FlakySettlement>,
}

impl LedgerFixture {
    /// Fixture with the default configuration.
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// Fixture with a custom configuration.
    pub fn with_config(config: LedgerConfig) -> Self {
        crate::init_tracing();
        let clock = Arc::new(ManualClock::starting_at(FIXTURE_EPOCH_MS));
        let bank = Arc::new(InMemoryBank::new());
        let settlement = Arc::new(FlakySettlement::new(bank.clone()));
        let ledger = DocumentLedger::new(config, clock.clone(), settlement.clone());
        Self {
            ledger,
            clock,
            bank,
            settlement,
        }
    }

    /// Rebuild a ledger over the same clock and bank from `snapshot`.
    pub fn restore(&self, snapshot: LedgerSnapshot) -> DocumentLedger {
        DocumentLedger::restore(
            self.ledger.config().clone(),
            self.clock.clone(),
            self.settlement.clone(),
            snapshot,
        )
        .expect("snapshot restores")
    }

    /// Give `account` funds to escrow.
    pub fn fund(&self, account: AccountId, amount: u128) {
        self.bank.fund(account, Amount::new(amount));
    }

    /// Balance of `account` in the bank.
    pub fn balance(&self, account: &AccountId) -> u128 {
        self.bank.balance_of(account).value()
    }

    /// Register a document named after `label`, hashed as its UTF-8 bytes.
    pub fn register(&self, owner: AccountId, label: &str) -> DocumentHash {
        let hash = test_hash(label);
        self.ledger
            .register_document(
                owner,
                RegisterDocument::new(hash.clone(), label, "", HashAlgorithm::Sha256),
            )
            .expect("registration succeeds");
        hash
    }

    /// Invite `signer` with `escrow` attached.
    pub fn invite(&self, owner: AccountId, hash: &DocumentHash, signer: AccountId, escrow: u128) {
        self.ledger
            .invite_signatory(
                owner,
                InviteSignatory::new(hash.clone(), signer, format!("signer {signer}"), "")
                    .with_escrow(Amount::new(escrow)),
            )
            .expect("invite succeeds");
    }

    /// Sign `hash` as `signer`, returning the released amount.
    pub fn sign(&self, signer: AccountId, hash: &DocumentHash) -> u128 {
        self.ledger
            .sign_document(signer, hash)
            .expect("signing succeeds")
            .value
            .paid_out
            .value()
    }

    /// Run one generated call against the ledger, advancing the clock first.
    pub fn apply(&self, op: &LedgerOp) -> Result<()> {
        self.clock.advance(1);
        match op {
            LedgerOp::Register { owner, hash } => self
                .ledger
                .register_document(
                    *owner,
                    RegisterDocument::new(hash.clone(), "generated", "", HashAlgorithm::Sha256),
                )
                .map(|_| ()),
            LedgerOp::Invite {
                caller,
                hash,
                signer,
                escrow,
            } => self
                .ledger
                .invite_signatory(
                    *caller,
                    InviteSignatory::new(hash.clone(), *signer, "generated", "")
                        .with_escrow(Amount::new(*escrow)),
                )
                .map(|_| ()),
            LedgerOp::Sign { caller, hash } => {
                self.ledger.sign_document(*caller, hash).map(|_| ())
            }
        }
    }
}

impl Default for LedgerFixture {
    fn default() -> Self {
        Self::new()
    }
}
