//! Ledger snapshots.
//!
//! A snapshot is every document record plus the full event history, written
//! as JSON. Restoring never trusts the file: each record is re-checked, and
//! the history must agree with the records it claims to have produced.

use crate::events::{LedgerEvent, LedgerEventKind};
use crate::store::DocumentRecord;
use cosign_core::DocumentHash;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u16 = 1;

/// Errors from exporting or restoring a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Snapshot was written by an incompatible version
    #[error("unsupported snapshot version {found}, expected {expected}")]
    UnsupportedVersion {
        /// Version this build reads
        expected: u16,
        /// Version found in the snapshot
        found: u16,
    },

    /// Reading or writing the snapshot file failed
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot is not valid JSON for this format
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Two records share a hash
    #[error("document {hash} appears more than once")]
    DuplicateDocument {
        /// Repeated hash
        hash: DocumentHash,
    },

    /// A record breaks a ledger invariant or disagrees with the history
    #[error("document {hash} is inconsistent: {reason}")]
    InvalidRecord {
        /// Offending document
        hash: DocumentHash,
        /// What is wrong with it
        reason: String,
    },

    /// Event sequence numbers are not dense from zero
    #[error("event sequence gap: expected {expected}, found {found}")]
    EventSequence {
        /// Next sequence number
        expected: u64,
        /// Sequence number in the snapshot
        found: u64,
    },

    /// An event refers to a document the snapshot does not contain
    #[error("event {sequence} refers to unknown document {hash}")]
    OrphanEvent {
        /// Event sequence number
        sequence: u64,
        /// Hash it refers to
        hash: DocumentHash,
    },
}

impl SnapshotError {
    fn invalid(hash: &DocumentHash, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            hash: hash.clone(),
            reason: reason.into(),
        }
    }
}

/// Serializable copy of a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Format version
    pub version: u16,
    /// Every document record, ordered by hash
    pub documents: Vec<DocumentRecord>,
    /// Full event history in sequence order
    pub events: Vec<LedgerEvent>,
}

#[derive(Default)]
struct EventTally {
    owner: Option<cosign_core::AccountId>,
    registrations: usize,
    invites: usize,
    signatures: usize,
}

impl LedgerSnapshot {
    /// Wrap records and history in the current format.
    pub fn new(documents: Vec<DocumentRecord>, events: Vec<LedgerEvent>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            documents,
            events,
        }
    }

    /// Check the snapshot can be restored.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                expected: SNAPSHOT_VERSION,
                found: self.version,
            });
        }

        let mut tallies: HashMap<&DocumentHash, EventTally> =
            HashMap::with_capacity(self.documents.len());
        for record in &self.documents {
            let hash = &record.document.hash;
            if tallies.insert(hash, EventTally::default()).is_some() {
                return Err(SnapshotError::DuplicateDocument { hash: hash.clone() });
            }
            record
                .check_invariants()
                .map_err(|reason| SnapshotError::invalid(hash, reason))?;
        }

        for (expected, event) in (0u64..).zip(&self.events) {
            if event.sequence != expected {
                return Err(SnapshotError::EventSequence {
                    expected,
                    found: event.sequence,
                });
            }
            let tally =
                tallies
                    .get_mut(&event.hash)
                    .ok_or_else(|| SnapshotError::OrphanEvent {
                        sequence: event.sequence,
                        hash: event.hash.clone(),
                    })?;
            match &event.kind {
                LedgerEventKind::DocumentAdded { owner } => {
                    tally.registrations += 1;
                    tally.owner = Some(*owner);
                }
                LedgerEventKind::SignatoryAdded { .. } => tally.invites += 1,
                LedgerEventKind::DocumentSigned { .. } => tally.signatures += 1,
            }
        }

        for record in &self.documents {
            let hash = &record.document.hash;
            let Some(tally) = tallies.get(hash) else {
                continue;
            };
            if tally.registrations != 1 {
                return Err(SnapshotError::invalid(
                    hash,
                    format!("registered {} times in the history", tally.registrations),
                ));
            }
            if tally.owner != Some(record.document.owner) {
                return Err(SnapshotError::invalid(
                    hash,
                    "owner differs from the registration event",
                ));
            }
            if tally.invites != record.signatories.len() {
                return Err(SnapshotError::invalid(
                    hash,
                    format!(
                        "{} signatories but {} invite events",
                        record.signatories.len(),
                        tally.invites
                    ),
                ));
            }
            let signed = record.signatures.iter().filter(|s| s.is_signed()).count();
            if tally.signatures != signed {
                return Err(SnapshotError::invalid(
                    hash,
                    format!("{signed} signatures but {} signing events", tally.signatures),
                ));
            }
        }
        Ok(())
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON without validating.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write to `path`, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> Result<(), SnapshotError> {
        std::fs::write(path, self.to_json()?)?;
        tracing::debug!(
            path = %path.display(),
            documents = self.documents.len(),
            events = self.events.len(),
            "snapshot written"
        );
        Ok(())
    }

    /// Read from `path` without validating.
    pub fn read_from(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
