//! Escrow amounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

/// Quantity of funds held in or released from escrow.
///
/// Unsigned, so a negative deposit cannot be expressed. Arithmetic is checked;
/// callers decide what an overflow means in their context.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    /// No funds.
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from its smallest unit.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Return the raw value.
    pub const fn value(self) -> u128 {
        self.0
    }

    /// Whether this amount is zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction.
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self::new(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self::new(u128::from(value))
    }
}

/// Saturating sum, used for reconciliation views where the exact total is
/// compared against a checked balance.
impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| Amount(acc.0.saturating_add(a.0)))
    }
}
