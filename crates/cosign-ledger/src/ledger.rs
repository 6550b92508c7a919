//! The document ledger.
//!
//! `DocumentLedger` is the only entry point: three mutations and the read
//! accessors over their results. Every mutation runs under the target
//! document's lock and follows the same shape:
//!
//! 1. validate the request at the boundary
//! 2. check preconditions in their documented order
//! 3. move funds through the escrow engine (the only fallible side effect)
//! 4. commit the state change and append its event
//!
//! Steps 1-3 leave the record untouched when they fail; step 4 cannot fail.

use crate::access::AccessControl;
use crate::escrow::EscrowEngine;
use crate::events::{Committed, EventLog, LedgerEvent, LedgerEventKind};
use crate::snapshot::{LedgerSnapshot, SnapshotError};
use crate::store::LedgerStore;
use crate::types::{
    Document, InviteSignatory, RegisterDocument, SignReceipt, SignatureSlot, Signatory,
};
use cosign_core::{
    AccountId, Amount, ClockEffects, DocumentHash, LedgerConfig, LedgerError, Result,
    SettlementEffects,
};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Registry of documents, their signatories, signatures and escrow.
pub struct DocumentLedger {
    config: LedgerConfig,
    store: LedgerStore,
    escrow: EscrowEngine,
    events: EventLog,
    clock: Arc<dyn ClockEffects>,
}

impl DocumentLedger {
    /// Create an empty ledger.
    pub fn new(
        config: LedgerConfig,
        clock: Arc<dyn ClockEffects>,
        settlement: Arc<dyn SettlementEffects>,
    ) -> Self {
        let events = EventLog::new(config.events.channel_capacity);
        Self {
            config,
            store: LedgerStore::new(),
            escrow: EscrowEngine::new(settlement),
            events,
            clock,
        }
    }

    /// Rebuild a ledger from a snapshot, re-checking every invariant.
    ///
    /// The settlement handler must already hold the escrowed funds the
    /// snapshot records; the ledger does not move funds on restore.
    pub fn restore(
        config: LedgerConfig,
        clock: Arc<dyn ClockEffects>,
        settlement: Arc<dyn SettlementEffects>,
        snapshot: LedgerSnapshot,
    ) -> std::result::Result<Self, SnapshotError> {
        snapshot.validate()?;
        let document_count = snapshot.documents.len();
        let event_count = snapshot.events.len();
        let events = EventLog::with_history(snapshot.events, config.events.channel_capacity);
        tracing::info!(
            documents = document_count,
            events = event_count,
            "ledger restored from snapshot"
        );
        Ok(Self {
            config,
            store: LedgerStore::from_records(snapshot.documents),
            escrow: EscrowEngine::new(settlement),
            events,
            clock,
        })
    }

    /// Register a new document owned by `caller`.
    ///
    /// # Errors
    /// * `InvalidInput` - if a text field exceeds the configured limit
    /// * `DuplicateHash` - if the hash is already registered
    pub fn register_document(
        &self,
        caller: AccountId,
        request: RegisterDocument,
    ) -> Result<Committed<Document>> {
        request.validate(&self.config.limits)?;

        let document = Document {
            hash: request.hash,
            name: request.name,
            description: request.description,
            owner: caller,
            algorithm: request.algorithm,
            created_at: self.clock.now(),
        };

        let result = self.store.insert_new(document, |record| {
            let document = record.document.clone();
            let event = self.events.append(
                &document.hash,
                document.created_at,
                LedgerEventKind::DocumentAdded { owner: caller },
            );
            Committed {
                value: document,
                event,
            }
        });

        match &result {
            Ok(committed) => tracing::info!(
                document = %committed.value.hash,
                owner = %caller,
                algorithm = %committed.value.algorithm,
                sequence = committed.event.sequence,
                "document registered"
            ),
            Err(err) => tracing::debug!(caller = %caller, error = %err, "registration rejected"),
        }
        result
    }

    /// Invite `request.address` to sign, escrowing `request.escrow` from `caller`.
    ///
    /// # Errors
    /// * `InvalidInput` - if a text field exceeds the configured limit
    /// * `DocumentNotFound` - if the hash is not registered
    /// * `NotOwner` - if `caller` does not own the document
    /// * `DuplicateSignatory` - if the address is already a signatory
    /// * `SignatoryLimitReached` - if the document is at its signatory limit
    /// * `EscrowOverflow` - if the deposit would overflow the escrow balance
    /// * `Settlement` - if the funds could not be collected
    ///
    /// On any error no signatory is added and no funds leave `caller`.
    pub fn invite_signatory(
        &self,
        caller: AccountId,
        request: InviteSignatory,
    ) -> Result<Committed<Signatory>> {
        request.validate(&self.config.limits)?;
        let max = self.config.limits.max_signatories_per_document;

        let result = self.store.with_record_mut(&request.hash, |record| {
            AccessControl::authorize_invite(record, &caller, &request.address)?;
            if record.signatories.len() >= max {
                return Err(LedgerError::SignatoryLimitReached {
                    hash: request.hash.clone(),
                    max,
                });
            }

            let deposit = self.escrow.collect(record, &caller, request.escrow)?;

            let at = self.clock.now();
            let signatory = Signatory::invited(&request);
            deposit.commit(record, signatory.clone());
            let event = self.events.append(
                &request.hash,
                at,
                LedgerEventKind::SignatoryAdded {
                    address: request.address,
                    escrowed: request.escrow,
                },
            );
            debug_assert!(record.check_invariants().is_ok());

            Ok(Committed {
                value: signatory,
                event,
            })
        });

        match &result {
            Ok(committed) => tracing::info!(
                document = %request.hash,
                owner = %caller,
                signatory = %request.address,
                escrowed = %request.escrow,
                sequence = committed.event.sequence,
                "signatory invited"
            ),
            Err(err) => tracing::debug!(
                document = %request.hash,
                caller = %caller,
                signatory = %request.address,
                error = %err,
                "invite rejected"
            ),
        }
        result
    }

    /// Sign `hash` as `caller`, releasing any escrow owed to `caller`.
    ///
    /// The signature fills the first unsigned slot, so slot order follows
    /// signing order.
    ///
    /// # Errors
    /// * `DocumentNotFound` - if the hash is not registered
    /// * `NotAuthorizedSigner` - if `caller` was never invited
    /// * `AlreadySigned` - if `caller` has already signed
    /// * `Settlement` - if the payout could not be transferred
    pub fn sign_document(
        &self,
        caller: AccountId,
        hash: &DocumentHash,
    ) -> Result<Committed<SignReceipt>> {
        let result = self.store.with_record_mut(hash, |record| {
            let index = AccessControl::authorize_signer(record, &caller)?;
            let slot = record.first_unsigned_slot().ok_or_else(|| {
                LedgerError::invariant_violation(hash, "no unsigned slot for an unsigned signatory")
            })?;

            let payout = self.escrow.release(record, index)?;

            let at = self.clock.now();
            let paid_out = payout.amount;
            record.signatures[slot] = SignatureSlot::Signed(caller);
            payout.commit(record, at);
            let event = self.events.append(
                hash,
                at,
                LedgerEventKind::DocumentSigned {
                    signer: caller,
                    amount_paid: paid_out,
                },
            );
            debug_assert!(record.check_invariants().is_ok());

            Ok(Committed {
                value: SignReceipt {
                    hash: hash.clone(),
                    signer: caller,
                    signed_at: at,
                    slot,
                    paid_out,
                },
                event,
            })
        });

        match &result {
            Ok(committed) => tracing::info!(
                document = %hash,
                signer = %caller,
                slot = committed.value.slot,
                paid_out = %committed.value.paid_out,
                sequence = committed.event.sequence,
                "document signed"
            ),
            Err(err) => tracing::debug!(
                document = %hash,
                caller = %caller,
                error = %err,
                "signing rejected"
            ),
        }
        result
    }

    /// The document registered under `hash`.
    pub fn get_document(&self, hash: &DocumentHash) -> Result<Document> {
        self.store.with_record(hash, |record| record.document.clone())
    }

    /// Signatory addresses in invitation order.
    ///
    /// Empty for a registered document with no signatories; `DocumentNotFound`
    /// when the hash is unknown.
    pub fn list_signatory_addresses(&self, hash: &DocumentHash) -> Result<Vec<AccountId>> {
        self.store.with_record(hash, |record| {
            record
                .signatories
                .iter()
                .map(|signatory| signatory.address)
                .collect()
        })
    }

    /// Details of one signatory.
    pub fn get_signatory_info(
        &self,
        hash: &DocumentHash,
        address: &AccountId,
    ) -> Result<Signatory> {
        self.store
            .with_record(hash, |record| {
                record
                    .signatory_index(address)
                    .map(|index| record.signatories[index].clone())
            })?
            .ok_or_else(|| LedgerError::SignatoryNotFound {
                hash: hash.clone(),
                address: *address,
            })
    }

    /// Signature slots in signing order, one per signatory.
    pub fn list_signatures(&self, hash: &DocumentHash) -> Result<Vec<SignatureSlot>> {
        self.store.with_record(hash, |record| record.signatures.clone())
    }

    /// Funds currently held in escrow for `hash`.
    pub fn held_balance(&self, hash: &DocumentHash) -> Result<Amount> {
        self.store.with_record(hash, |record| record.held)
    }

    /// Whether `hash` is registered.
    pub fn contains(&self, hash: &DocumentHash) -> bool {
        self.store.contains(hash)
    }

    /// Number of registered documents.
    pub fn document_count(&self) -> usize {
        self.store.len()
    }

    /// The event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Subscribe to events committed from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Consistent copy of every record and the event history.
    ///
    /// Registrations and per-document mutations wait while the copy is taken,
    /// so the history holds exactly the events behind the copied records.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let (records, events) = self.store.records_with(|| self.events.history());
        LedgerSnapshot::new(records, events)
    }

    /// Active configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}

impl std::fmt::Debug for DocumentLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentLedger")
            .field("documents", &self.store.len())
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}
