//! In-process effect handlers.
//!
//! Production handlers for hosts that run the ledger in a single process.
//! Deterministic handlers for tests live in `cosign-testkit`.

mod bank;
mod clock;

pub use bank::InMemoryBank;
pub use clock::SystemClock;
