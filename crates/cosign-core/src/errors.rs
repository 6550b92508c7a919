//! Unified error types for ledger operations.
//!
//! Every precondition failure maps to exactly one `LedgerError` variant so the
//! calling layer can render a precise message. All variants are scoped to the
//! single call that produced them; none is fatal to the process.

use crate::amount::Amount;
use crate::identifiers::{AccountId, DocumentHash};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by ledger operations and read accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A document with this hash is already registered.
    #[error("document {hash} is already registered")]
    DuplicateHash {
        /// The conflicting hash
        hash: DocumentHash,
    },

    /// No document is registered under this hash.
    #[error("document {hash} not found")]
    DocumentNotFound {
        /// The unknown hash
        hash: DocumentHash,
    },

    /// Only the document owner may invite signatories.
    #[error("{caller} is not the owner of document {hash}")]
    NotOwner {
        /// Document being modified
        hash: DocumentHash,
        /// Account that attempted the invite
        caller: AccountId,
    },

    /// The address is already a signatory of the document.
    #[error("{address} is already a signatory of document {hash}")]
    DuplicateSignatory {
        /// Document being modified
        hash: DocumentHash,
        /// Address that was invited twice
        address: AccountId,
    },

    /// The caller was never invited to sign the document.
    #[error("{caller} is not an authorized signer of document {hash}")]
    NotAuthorizedSigner {
        /// Document being signed
        hash: DocumentHash,
        /// Account that attempted to sign
        caller: AccountId,
    },

    /// The caller has already signed the document.
    #[error("{caller} has already signed document {hash}")]
    AlreadySigned {
        /// Document being signed
        hash: DocumentHash,
        /// Account that attempted to sign again
        caller: AccountId,
    },

    /// The address is not a signatory of the document.
    #[error("{address} is not a signatory of document {hash}")]
    SignatoryNotFound {
        /// Document queried
        hash: DocumentHash,
        /// Address queried
        address: AccountId,
    },

    /// The document already has the configured maximum number of signatories.
    #[error("document {hash} already has {max} signatories")]
    SignatoryLimitReached {
        /// Document being modified
        hash: DocumentHash,
        /// Configured maximum
        max: usize,
    },

    /// Accepting the deposit would overflow the document's escrow balance.
    #[error("escrow for document {hash} cannot accept {amount}: balance would overflow")]
    EscrowOverflow {
        /// Document being modified
        hash: DocumentHash,
        /// Rejected deposit
        amount: Amount,
    },

    /// Input rejected at the boundary before reaching the ledger state.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// A stored record no longer satisfies the ledger invariants.
    #[error("document {hash} violates a ledger invariant: {reason}")]
    InvariantViolation {
        /// Affected document
        hash: DocumentHash,
        /// Which invariant failed
        reason: String,
    },

    /// Moving funds through the settlement effect failed.
    #[error("settlement failed: {0}")]
    Settlement(#[from] SettlementError),
}

impl LedgerError {
    /// Create a duplicate hash error.
    pub fn duplicate_hash(hash: &DocumentHash) -> Self {
        Self::DuplicateHash { hash: hash.clone() }
    }

    /// Create a document not found error.
    pub fn document_not_found(hash: &DocumentHash) -> Self {
        Self::DocumentNotFound { hash: hash.clone() }
    }

    /// Create an invariant violation error.
    pub fn invariant_violation(hash: &DocumentHash, reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            hash: hash.clone(),
            reason: reason.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Whether retrying the same call could succeed.
    ///
    /// Conflict and authorization errors reflect real ledger state and never
    /// change on retry. Only a settlement failure may be transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Settlement(err) => err.is_transient(),
            _ => false,
        }
    }
}

/// Failures reported by a settlement effect handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum SettlementError {
    /// The debited account does not hold enough funds.
    #[error("account {account} holds {available}, needs {requested}")]
    InsufficientFunds {
        /// Account being debited
        account: AccountId,
        /// Balance at the time of the debit
        available: Amount,
        /// Amount requested
        requested: Amount,
    },

    /// Crediting would overflow the recipient's balance.
    #[error("crediting {amount} to {account} would overflow its balance")]
    BalanceOverflow {
        /// Account being credited
        account: AccountId,
        /// Amount being credited
        amount: Amount,
    },

    /// Escrow custody holds less than the release requires.
    #[error("escrow custody holds {available}, release needs {requested}")]
    CustodyShortfall {
        /// Funds in custody
        available: Amount,
        /// Amount being released
        requested: Amount,
    },

    /// The settlement backend could not be reached.
    #[error("settlement backend unavailable: {reason}")]
    Unavailable {
        /// Backend-specific reason
        reason: String,
    },
}

impl SettlementError {
    /// Create an unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Whether the failure may clear on its own.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Errors parsing boundary values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The value was empty.
    #[error("{kind} must not be empty")]
    Empty {
        /// What was being parsed
        kind: &'static str,
    },

    /// The value was not valid hex.
    #[error("{kind} is not valid hex: {reason}")]
    InvalidHex {
        /// What was being parsed
        kind: &'static str,
        /// Decoder message
        reason: String,
    },

    /// The value had the wrong number of bytes.
    #[error("{kind} must be {expected} bytes, got {actual}")]
    InvalidLength {
        /// What was being parsed
        kind: &'static str,
        /// Required length
        expected: usize,
        /// Observed length
        actual: usize,
    },
}

/// Standard result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
