//! Cosign Testing Infrastructure
//!
//! Shared setup for ledger tests: a manual clock, a settlement wrapper that
//! fails on demand, a ready-made ledger fixture, and proptest strategies for
//! operation sequences.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! cosign-testkit = { workspace = true }
//! ```
//!
//! ```rust,no_run
//! use cosign_testkit::*;
//!
//! #[test]
//! fn my_test() {
//!     let fixture = LedgerFixture::new();
//!     let alice = test_account(1);
//!     let hash = fixture.register(alice, "abc123");
//!     // ... test logic
//! }
//! ```

pub mod clock;
pub mod fixture;
pub mod settlement;
pub mod strategies;

pub use clock::ManualClock;
pub use fixture::{LedgerFixture, FIXTURE_EPOCH_MS};
pub use settlement::FlakySettlement;

use cosign_core::{AccountId, DocumentHash};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test subscriber honouring `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Deterministic account identity derived from `seed`.
pub fn test_account(seed: u8) -> AccountId {
    let mut bytes = [0u8; 20];
    bytes[0] = 0xc0;
    bytes[19] = seed;
    AccountId::from_bytes(bytes)
}

/// Document hash whose bytes are the UTF-8 encoding of `label`.
pub fn test_hash(label: &str) -> DocumentHash {
    DocumentHash::from_bytes(label.as_bytes().to_vec()).expect("label must be non-empty")
}
