//! Ledger events.
//!
//! Each successful mutation appends exactly one `LedgerEvent` while the
//! document's lock is still held, and returns it to the caller inside
//! `Committed`. The log keeps the full history and fans events out to live
//! observers over a bounded broadcast channel.

use cosign_core::{AccountId, Amount, DocumentHash, Timestamp};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEventKind {
    /// A document was registered
    DocumentAdded {
        /// Registering account
        owner: AccountId,
    },
    /// A signatory was invited
    SignatoryAdded {
        /// Invited address
        address: AccountId,
        /// Funds escrowed for the signatory
        escrowed: Amount,
    },
    /// A signatory signed
    DocumentSigned {
        /// Signing account
        signer: AccountId,
        /// Escrow released to the signer
        amount_paid: Amount,
    },
}

/// Immutable record of one committed state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Position in the ledger-wide event order, starting at zero
    pub sequence: u64,
    /// Document the transition applied to
    pub hash: DocumentHash,
    /// Ledger time of the transition
    pub at: Timestamp,
    /// The transition
    pub kind: LedgerEventKind,
}

impl LedgerEvent {
    /// Account responsible for the transition.
    pub fn actor(&self) -> &AccountId {
        match &self.kind {
            LedgerEventKind::DocumentAdded { owner } => owner,
            LedgerEventKind::SignatoryAdded { address, .. } => address,
            LedgerEventKind::DocumentSigned { signer, .. } => signer,
        }
    }

    /// Funds moved by the transition.
    pub fn amount(&self) -> Amount {
        match &self.kind {
            LedgerEventKind::DocumentAdded { .. } => Amount::ZERO,
            LedgerEventKind::SignatoryAdded { escrowed, .. } => *escrowed,
            LedgerEventKind::DocumentSigned { amount_paid, .. } => *amount_paid,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            LedgerEventKind::DocumentAdded { .. } => "DocumentAdded",
            LedgerEventKind::SignatoryAdded { .. } => "SignatoryAdded",
            LedgerEventKind::DocumentSigned { .. } => "DocumentSigned",
        }
    }
}

/// A committed value together with the event describing its commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    /// State after the commit
    pub value: T,
    /// Event appended by the commit
    pub event: LedgerEvent,
}

impl<T> Committed<T> {
    /// Split into value and event.
    pub fn into_parts(self) -> (T, LedgerEvent) {
        (self.value, self.event)
    }
}

/// Append-only event history with live fan-out.
#[derive(Debug)]
pub struct EventLog {
    history: Mutex<Vec<LedgerEvent>>,
    sender: broadcast::Sender<LedgerEvent>,
}

impl EventLog {
    /// Create an empty log whose broadcast channel buffers `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self::with_history(Vec::new(), capacity)
    }

    /// Create a log that continues after `history`.
    ///
    /// `history` must be ordered with sequence numbers `0..len`.
    pub fn with_history(history: Vec<LedgerEvent>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            history: Mutex::new(history),
            sender,
        }
    }

    /// Append an event and publish it to observers.
    pub(crate) fn append(
        &self,
        hash: &DocumentHash,
        at: Timestamp,
        kind: LedgerEventKind,
    ) -> LedgerEvent {
        let mut history = self.history.lock();
        let event = LedgerEvent {
            sequence: history.len() as u64,
            hash: hash.clone(),
            at,
            kind,
        };
        history.push(event.clone());
        // No receivers is fine; the history still has the event.
        let _ = self.sender.send(event.clone());
        event
    }

    /// Subscribe to events appended from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }

    /// Every event so far, in order.
    pub fn history(&self) -> Vec<LedgerEvent> {
        self.history.lock().clone()
    }

    /// Events with `sequence >= from`.
    pub fn since(&self, from: u64) -> Vec<LedgerEvent> {
        let history = self.history.lock();
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(history.len());
        history[start..].to_vec()
    }

    /// Events for one document, in order.
    pub fn for_document(&self, hash: &DocumentHash) -> Vec<LedgerEvent> {
        self.history
            .lock()
            .iter()
            .filter(|event| &event.hash == hash)
            .cloned()
            .collect()
    }

    /// Number of events appended so far.
    pub fn len(&self) -> usize {
        self.history.lock().len()
    }

    /// Whether no event has been appended.
    pub fn is_empty(&self) -> bool {
        self.history.lock().is_empty()
    }
}
