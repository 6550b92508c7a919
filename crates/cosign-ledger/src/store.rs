//! Authoritative document state.
//!
//! The store maps each hash to one `DocumentRecord` behind its own mutex. The
//! map lock is held only to look up or insert an entry, so calls on different
//! documents never wait on each other while calls on the same document are
//! applied one at a time.

use crate::types::{Document, SignatureSlot, Signatory};
use cosign_core::{AccountId, Amount, DocumentHash, LedgerError, Result};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Everything the ledger knows about one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Registration metadata
    pub document: Document,
    /// Signatories in invitation order
    pub signatories: Vec<Signatory>,
    /// Signature slots in signing order, same length as `signatories`
    pub signatures: Vec<SignatureSlot>,
    /// Funds currently held in escrow for this document
    pub held: Amount,
}

impl DocumentRecord {
    pub(crate) fn new(document: Document) -> Self {
        Self {
            document,
            signatories: Vec::new(),
            signatures: Vec::new(),
            held: Amount::ZERO,
        }
    }

    /// Position of `address` in the signatory sequence.
    pub fn signatory_index(&self, address: &AccountId) -> Option<usize> {
        self.signatories
            .iter()
            .position(|signatory| &signatory.address == address)
    }

    /// Whether `address` fills a signature slot.
    pub fn has_signature_from(&self, address: &AccountId) -> bool {
        self.signatures
            .iter()
            .any(|slot| slot.signer() == Some(address))
    }

    /// First slot still waiting for a signature.
    pub fn first_unsigned_slot(&self) -> Option<usize> {
        self.signatures.iter().position(|slot| !slot.is_signed())
    }

    /// Sum of escrow still owed to signatories.
    pub fn outstanding(&self) -> Amount {
        self.signatories
            .iter()
            .filter(|signatory| !signatory.paid)
            .map(|signatory| signatory.amount_due)
            .sum()
    }

    /// Check every structural invariant of the record.
    ///
    /// Holds after every ledger operation; restored snapshots must pass it too.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        if self.signatures.len() != self.signatories.len() {
            return Err(format!(
                "{} signature slots for {} signatories",
                self.signatures.len(),
                self.signatories.len()
            ));
        }

        let mut addresses = HashSet::with_capacity(self.signatories.len());
        for signatory in &self.signatories {
            if !addresses.insert(signatory.address) {
                return Err(format!("signatory {} appears twice", signatory.address));
            }
            if signatory.paid != signatory.has_signed() {
                return Err(format!(
                    "signatory {} has paid={} but signed={}",
                    signatory.address,
                    signatory.paid,
                    signatory.has_signed()
                ));
            }
            if signatory.paid && !signatory.amount_due.is_zero() {
                return Err(format!(
                    "signatory {} is paid but still owed {}",
                    signatory.address, signatory.amount_due
                ));
            }
        }

        let mut signers = HashSet::new();
        let mut seen_unsigned = false;
        for slot in &self.signatures {
            match slot {
                SignatureSlot::Unsigned => seen_unsigned = true,
                SignatureSlot::Signed(signer) => {
                    if seen_unsigned {
                        return Err(format!("signature from {signer} follows an unsigned slot"));
                    }
                    if !signers.insert(*signer) {
                        return Err(format!("{signer} fills two signature slots"));
                    }
                    let signed = self
                        .signatories
                        .iter()
                        .any(|s| &s.address == signer && s.has_signed());
                    if !signed {
                        return Err(format!("slot filled by {signer} without a signed signatory"));
                    }
                }
            }
        }
        let signed_count = self.signatories.iter().filter(|s| s.has_signed()).count();
        if signed_count != signers.len() {
            return Err(format!(
                "{signed_count} signed signatories but {} filled slots",
                signers.len()
            ));
        }

        let outstanding = self.outstanding();
        if outstanding != self.held {
            return Err(format!(
                "escrow holds {} but signatories are owed {outstanding}",
                self.held
            ));
        }
        Ok(())
    }
}

type Entry = Arc<Mutex<DocumentRecord>>;

/// Map from document hash to its record.
#[derive(Debug, Default)]
pub struct LedgerStore {
    documents: RwLock<HashMap<DocumentHash, Entry>>,
}

impl LedgerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records already checked by the caller.
    pub(crate) fn from_records(records: Vec<DocumentRecord>) -> Self {
        let documents = records
            .into_iter()
            .map(|record| {
                (
                    record.document.hash.clone(),
                    Arc::new(Mutex::new(record)),
                )
            })
            .collect();
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Number of registered documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Whether no document is registered.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Whether `hash` is registered.
    pub fn contains(&self, hash: &DocumentHash) -> bool {
        self.documents.read().contains_key(hash)
    }

    /// Insert a new record, running `on_commit` before the map lock is released.
    ///
    /// Fails with `DuplicateHash` and leaves the existing record untouched if
    /// the hash is taken.
    pub(crate) fn insert_new<R>(
        &self,
        document: Document,
        on_commit: impl FnOnce(&DocumentRecord) -> R,
    ) -> Result<R> {
        let mut documents = self.documents.write();
        if documents.contains_key(&document.hash) {
            return Err(LedgerError::duplicate_hash(&document.hash));
        }
        let record = DocumentRecord::new(document);
        let result = on_commit(&record);
        documents.insert(record.document.hash.clone(), Arc::new(Mutex::new(record)));
        Ok(result)
    }

    /// Run `f` with exclusive access to one document's record.
    ///
    /// `f` must leave the record untouched when it returns an error.
    pub(crate) fn with_record_mut<R>(
        &self,
        hash: &DocumentHash,
        f: impl FnOnce(&mut DocumentRecord) -> Result<R>,
    ) -> Result<R> {
        let entry = self.entry(hash)?;
        let mut record = entry.lock();
        f(&mut record)
    }

    /// Run `f` with a consistent view of one document's record.
    pub(crate) fn with_record<R>(
        &self,
        hash: &DocumentHash,
        f: impl FnOnce(&DocumentRecord) -> R,
    ) -> Result<R> {
        let entry = self.entry(hash)?;
        let record = entry.lock();
        Ok(f(&record))
    }

    /// Copy of every record, ordered by hash.
    pub fn records(&self) -> Vec<DocumentRecord> {
        self.records_with(|| ()).0
    }

    /// Copy of every record, ordered by hash, plus the output of `f`.
    ///
    /// `f` runs while the map lock and every record lock are held, so nothing
    /// that commits under those locks can land between the two copies.
    pub(crate) fn records_with<R>(&self, f: impl FnOnce() -> R) -> (Vec<DocumentRecord>, R) {
        let documents = self.documents.read();
        let mut entries: Vec<(&DocumentHash, &Entry)> = documents.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let guards: Vec<_> = entries.iter().map(|(_, entry)| entry.lock()).collect();
        let records = guards.iter().map(|record| (**record).clone()).collect();
        let result = f();
        drop(guards);
        (records, result)
    }

    fn entry(&self, hash: &DocumentHash) -> Result<Entry> {
        self.documents
            .read()
            .get(hash)
            .cloned()
            .ok_or_else(|| LedgerError::document_not_found(hash))
    }
}
