//! Caller authorization.
//!
//! Checks run against a locked record, in the order the ledger reports them,
//! and never mutate anything.

use crate::store::DocumentRecord;
use cosign_core::{AccountId, LedgerError, Result};

/// Ownership and signatory rules evaluated before every mutation.
pub struct AccessControl;

impl AccessControl {
    /// Validate that `caller` may invite `address` onto the document.
    ///
    /// Owner check first, then duplicate check.
    pub fn authorize_invite(
        record: &DocumentRecord,
        caller: &AccountId,
        address: &AccountId,
    ) -> Result<()> {
        let hash = &record.document.hash;
        if !Self::is_owner(record, caller) {
            return Err(LedgerError::NotOwner {
                hash: hash.clone(),
                caller: *caller,
            });
        }
        if record.signatory_index(address).is_some() {
            return Err(LedgerError::DuplicateSignatory {
                hash: hash.clone(),
                address: *address,
            });
        }
        Ok(())
    }

    /// Validate that `caller` may sign the document and return its signatory index.
    pub fn authorize_signer(record: &DocumentRecord, caller: &AccountId) -> Result<usize> {
        let hash = &record.document.hash;
        let index = record
            .signatory_index(caller)
            .ok_or_else(|| LedgerError::NotAuthorizedSigner {
                hash: hash.clone(),
                caller: *caller,
            })?;
        if record.has_signature_from(caller) {
            return Err(LedgerError::AlreadySigned {
                hash: hash.clone(),
                caller: *caller,
            });
        }
        Ok(index)
    }

    /// Whether `caller` owns the document.
    pub fn is_owner(record: &DocumentRecord, caller: &AccountId) -> bool {
        &record.document.owner == caller
    }
}
