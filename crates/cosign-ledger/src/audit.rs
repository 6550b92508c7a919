//! Audit view of one document.
//!
//! Built only from the ledger's read accessors, so it shows exactly what any
//! display client could see.

use crate::ledger::DocumentLedger;
use crate::types::{Document, SignatureSlot};
use cosign_core::{AccountId, Amount, DocumentHash, LedgerError, Result, Timestamp};
use serde::{Deserialize, Serialize};

/// One signatory's escrow and signing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatoryAudit {
    /// Signatory identity
    pub address: AccountId,
    /// Counterparty name
    pub full_name: String,
    /// Escrow still owed
    pub amount_due: Amount,
    /// Whether the escrow has been released
    pub paid: bool,
    /// When the signatory signed
    pub signed_at: Option<Timestamp>,
}

/// One filled signature slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningRecord {
    /// Position in signing order
    pub slot: usize,
    /// Who signed
    pub signer: AccountId,
    /// Signer's name as recorded on invitation
    pub full_name: String,
    /// When they signed
    pub signed_at: Option<Timestamp>,
}

/// Document metadata, signatories and signing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAudit {
    /// Registration metadata
    pub document: Document,
    /// Signatories in invitation order
    pub signatories: Vec<SignatoryAudit>,
    /// Filled slots in signing order
    pub signing_order: Vec<SigningRecord>,
    /// Escrow still held for the document
    pub held: Amount,
}

impl DocumentAudit {
    /// Collect the audit view for `hash`.
    ///
    /// Each accessor takes the document lock separately, so a concurrent
    /// signing can land between reads. The result is then rejected with
    /// `InvariantViolation` rather than returned torn; callers may retry.
    pub fn collect(ledger: &DocumentLedger, hash: &DocumentHash) -> Result<Self> {
        let document = ledger.get_document(hash)?;
        let addresses = ledger.list_signatory_addresses(hash)?;

        let mut signatories = Vec::with_capacity(addresses.len());
        for address in &addresses {
            let info = ledger.get_signatory_info(hash, address)?;
            signatories.push(SignatoryAudit {
                address: info.address,
                full_name: info.full_name,
                amount_due: info.amount_due,
                paid: info.paid,
                signed_at: info.signed_at,
            });
        }

        let signing_order = ledger
            .list_signatures(hash)?
            .into_iter()
            .enumerate()
            .filter_map(|(slot, entry)| match entry {
                SignatureSlot::Signed(signer) => Some((slot, signer)),
                SignatureSlot::Unsigned => None,
            })
            .map(|(slot, signer)| {
                let signatory = signatories
                    .iter()
                    .find(|s| s.address == signer && s.paid)
                    .ok_or_else(|| {
                        LedgerError::invariant_violation(
                            hash,
                            format!("signature from {signer} changed during audit"),
                        )
                    })?;
                Ok(SigningRecord {
                    slot,
                    signer,
                    full_name: signatory.full_name.clone(),
                    signed_at: signatory.signed_at,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let held = ledger.held_balance(hash)?;

        Ok(Self {
            document,
            signatories,
            signing_order,
            held,
        })
    }

    /// Whether every signatory has signed. False for a document with none.
    pub fn is_fully_signed(&self) -> bool {
        !self.signatories.is_empty() && self.signing_order.len() == self.signatories.len()
    }

    /// Signatories still waiting to sign, in invitation order.
    pub fn pending(&self) -> impl Iterator<Item = &SignatoryAudit> {
        self.signatories.iter().filter(|s| s.signed_at.is_none())
    }
}
