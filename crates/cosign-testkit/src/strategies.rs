//! Property test strategies for ledger operations
//!
//! Accounts and documents are drawn from small pools so generated sequences
//! hit the interesting collisions: duplicate registrations, repeat invites,
//! signing twice, strangers signing.

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use crate::{test_account, test_hash};
use cosign_core::{AccountId, DocumentHash};

/// Number of distinct accounts generated.
pub const ACCOUNT_POOL: u8 = 5;

/// Number of distinct documents generated.
pub const DOCUMENT_POOL: u8 = 3;

/// One ledger call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOp {
    /// `register_document`
    Register {
        /// Caller
        owner: AccountId,
        /// Target
        hash: DocumentHash,
    },
    /// `invite_signatory`
    Invite {
        /// Caller
        caller: AccountId,
        /// Target
        hash: DocumentHash,
        /// Invitee
        signer: AccountId,
        /// Escrow attached
        escrow: u128,
    },
    /// `sign_document`
    Sign {
        /// Caller
        caller: AccountId,
        /// Target
        hash: DocumentHash,
    },
}

/// Strategy for accounts from the shared pool.
pub fn arb_account() -> impl Strategy<Value = AccountId> {
    (1..=ACCOUNT_POOL).prop_map(test_account)
}

/// Strategy for document hashes from the shared pool.
pub fn arb_hash() -> impl Strategy<Value = DocumentHash> {
    (0..DOCUMENT_POOL).prop_map(|index| test_hash(&format!("doc-{index}")))
}

/// Strategy for escrow amounts, zero a quarter of the time.
pub fn arb_escrow() -> impl Strategy<Value = u128> {
    prop_oneof![1 => Just(0u128), 3 => 1u128..50]
}

/// Strategy for a single ledger call.
pub fn arb_op() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        1 => (arb_account(), arb_hash()).prop_map(|(owner, hash)| LedgerOp::Register { owner, hash }),
        3 => (arb_account(), arb_hash(), arb_account(), arb_escrow()).prop_map(
            |(caller, hash, signer, escrow)| LedgerOp::Invite {
                caller,
                hash,
                signer,
                escrow,
            }
        ),
        3 => (arb_account(), arb_hash()).prop_map(|(caller, hash)| LedgerOp::Sign { caller, hash }),
    ]
}

/// Strategy for a sequence of up to `max_len` ledger calls.
pub fn arb_ops(max_len: usize) -> impl Strategy<Value = Vec<LedgerOp>> {
    prop::collection::vec(arb_op(), 0..max_len)
}
