//! Ledger records and operation requests.

use cosign_core::{AccountId, Amount, DocumentHash, HashAlgorithm, LedgerError, LimitConfig};
use cosign_core::{Result, Timestamp};
use serde::{Deserialize, Serialize};

/// A registered document.
///
/// Created once by `register_document` and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Content fingerprint, the primary key
    pub hash: DocumentHash,
    /// Human readable name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Account that registered the document
    pub owner: AccountId,
    /// Hash function the registrant used
    pub algorithm: HashAlgorithm,
    /// Ledger time of registration
    pub created_at: Timestamp,
}

/// A counterparty authorized to sign a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signatory {
    /// Identity permitted to sign
    pub address: AccountId,
    /// Counterparty name
    pub full_name: String,
    /// Counterparty description
    pub description: String,
    /// Funds escrowed for this signatory; zero once paid
    pub amount_due: Amount,
    /// Set on signing, never cleared
    pub paid: bool,
    /// Ledger time of signing
    pub signed_at: Option<Timestamp>,
}

impl Signatory {
    /// A freshly invited signatory.
    pub(crate) fn invited(request: &InviteSignatory) -> Self {
        Self {
            address: request.address,
            full_name: request.full_name.clone(),
            description: request.description.clone(),
            amount_due: request.escrow,
            paid: false,
            signed_at: None,
        }
    }

    /// Whether this signatory has signed.
    pub fn has_signed(&self) -> bool {
        self.signed_at.is_some()
    }
}

/// One position in a document's signature sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureSlot {
    /// Not yet filled
    Unsigned,
    /// Filled by this signer; never changes afterwards
    Signed(AccountId),
}

impl SignatureSlot {
    /// The signer, if the slot is filled.
    pub fn signer(&self) -> Option<&AccountId> {
        match self {
            Self::Unsigned => None,
            Self::Signed(signer) => Some(signer),
        }
    }

    /// Whether the slot is filled.
    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Signed(_))
    }
}

/// Request to register a new document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDocument {
    /// Content fingerprint
    pub hash: DocumentHash,
    /// Human readable name
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Hash function used to produce `hash`
    pub algorithm: HashAlgorithm,
}

impl RegisterDocument {
    /// Create a registration request.
    pub fn new(
        hash: DocumentHash,
        name: impl Into<String>,
        description: impl Into<String>,
        algorithm: HashAlgorithm,
    ) -> Self {
        Self {
            hash,
            name: name.into(),
            description: description.into(),
            algorithm,
        }
    }

    pub(crate) fn validate(&self, limits: &LimitConfig) -> Result<()> {
        check_text("name", &self.name, limits)?;
        check_text("description", &self.description, limits)?;
        if self.algorithm.label().trim().is_empty() {
            return Err(LedgerError::invalid_input("algorithm", "label is empty"));
        }
        check_text("algorithm", self.algorithm.label(), limits)
    }
}

/// Request to invite a signatory, optionally escrowing a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteSignatory {
    /// Document to invite onto
    pub hash: DocumentHash,
    /// Identity being invited
    pub address: AccountId,
    /// Counterparty name
    pub full_name: String,
    /// Counterparty description
    pub description: String,
    /// Funds attached to the invite, released on signing
    pub escrow: Amount,
}

impl InviteSignatory {
    /// Create an invite with no escrowed payment.
    pub fn new(
        hash: DocumentHash,
        address: AccountId,
        full_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            hash,
            address,
            full_name: full_name.into(),
            description: description.into(),
            escrow: Amount::ZERO,
        }
    }

    /// Attach funds to release when the signatory signs.
    pub fn with_escrow(mut self, amount: Amount) -> Self {
        self.escrow = amount;
        self
    }

    pub(crate) fn validate(&self, limits: &LimitConfig) -> Result<()> {
        check_text("full_name", &self.full_name, limits)?;
        check_text("description", &self.description, limits)
    }
}

/// Outcome of a successful signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignReceipt {
    /// Document signed
    pub hash: DocumentHash,
    /// Account that signed
    pub signer: AccountId,
    /// Ledger time of signing
    pub signed_at: Timestamp,
    /// Position filled in the signature sequence
    pub slot: usize,
    /// Escrow released to the signer (possibly zero)
    pub paid_out: Amount,
}

// Names and descriptions may be empty; only their size is bounded.
fn check_text(field: &'static str, value: &str, limits: &LimitConfig) -> Result<()> {
    if value.len() > limits.max_text_len {
        return Err(LedgerError::invalid_input(
            field,
            format!(
                "{} bytes exceeds the limit of {}",
                value.len(),
                limits.max_text_len
            ),
        ));
    }
    Ok(())
}
