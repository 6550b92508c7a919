//! # Cosign Core - Foundation
//!
//! **Purpose**: Define the value types, error vocabulary and effect interfaces
//! shared by every Cosign crate.
//!
//! # Architecture Constraints
//!
//! - YES Strongly typed identities, hashes, amounts and timestamps
//! - YES Unified error types for ledger operations
//! - YES Effect traits for time and value settlement
//! - YES Ledger configuration loading and validation
//! - NO ledger state or state transitions (that's `cosign-ledger`)
//! - NO effect handler implementations (that's `cosign-ledger::handlers`)
//!
//! Everything entering the ledger is validated here first: an identity is a
//! fixed-width account, an amount is an unsigned integer, and a hash is a
//! non-empty byte string. Nothing downstream ever sees a raw string where one
//! of these types is expected.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Hash algorithm labels recorded on registration
pub mod algorithm;

/// Escrow amounts with checked arithmetic
pub mod amount;

/// Ledger configuration
pub mod config;

/// Effect traits consumed by the ledger
pub mod effects;

/// Unified error types
pub mod errors;

/// Account and document identifiers
pub mod identifiers;

/// Ledger timestamps
pub mod time;

pub use algorithm::HashAlgorithm;
pub use amount::Amount;
pub use config::{ConfigError, EventConfig, LedgerConfig, LimitConfig};
pub use effects::{ClockEffects, SettlementEffects};
pub use errors::{LedgerError, ParseError, Result, SettlementError};
pub use identifiers::{AccountId, DocumentHash};
pub use time::Timestamp;
