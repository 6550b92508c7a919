//! # Cosign Ledger - Document Registry and Escrow
//!
//! **Purpose**: Register documents by content hash, invite signatories with
//! optional escrowed payments, and record signatures that release those
//! payments.
//!
//! # Architecture Constraints
//!
//! - YES Document state, authorization and escrow accounting
//! - YES One ordered event per committed mutation
//! - YES In-memory effect handlers for time and settlement
//! - NO identity verification (callers arrive already authenticated)
//! - NO hash verification against file contents
//! - NO persistence beyond explicit snapshots
//!
//! # Concurrency
//!
//! Mutations on one document are serialized by that document's lock; a
//! mutation either commits fully, including its event and any fund transfer,
//! or leaves the document exactly as it was. Documents are independent of
//! each other.
//!
//! ```ignore
//! use cosign_ledger::{DocumentLedger, InviteSignatory, RegisterDocument};
//!
//! let ledger = DocumentLedger::new(config, clock, bank);
//! ledger.register_document(alice, RegisterDocument::new(hash.clone(), "Lease", "", algorithm))?;
//! ledger.invite_signatory(alice, InviteSignatory::new(hash.clone(), bob, "Bob", "").with_escrow(amount))?;
//! let receipt = ledger.sign_document(bob, &hash)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Caller authorization rules
pub mod access;

/// Read-only audit projection of a document
pub mod audit;

/// Escrow collection and release
pub mod escrow;

/// Committed event log
pub mod events;

/// Effect handlers for production and tests
pub mod handlers;

/// The ledger facade
pub mod ledger;

/// Snapshot export and restore
pub mod snapshot;

/// Per-document record storage
pub mod store;

/// Records and requests
pub mod types;

pub use access::AccessControl;
pub use audit::{DocumentAudit, SignatoryAudit, SigningRecord};
pub use escrow::{Deposit, EscrowEngine, Payout};
pub use events::{Committed, EventLog, LedgerEvent, LedgerEventKind};
pub use handlers::{InMemoryBank, SystemClock};
pub use ledger::DocumentLedger;
pub use snapshot::{LedgerSnapshot, SnapshotError, SNAPSHOT_VERSION};
pub use store::{DocumentRecord, LedgerStore};
pub use types::{
    Document, InviteSignatory, RegisterDocument, SignReceipt, SignatureSlot, Signatory,
};
