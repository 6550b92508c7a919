//! Account and document identifiers.
//!
//! Both identifiers are opaque to the ledger: they are compared for equality
//! and rendered for display, never interpreted.

use crate::errors::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length in bytes of an account identity.
pub const ACCOUNT_ID_LEN: usize = 20;

/// Fixed-width identity of a ledger participant.
///
/// Supplied by the caller's wallet/identity provider and trusted verbatim.
/// Rendered and parsed as `0x`-prefixed lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId([u8; ACCOUNT_ID_LEN]);

impl AccountId {
    /// Create an account identity from raw bytes.
    pub const fn from_bytes(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for AccountId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_str = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(hex_str).map_err(|e| ParseError::InvalidHex {
            kind: "account id",
            reason: e.to_string(),
        })?;
        let array: [u8; ACCOUNT_ID_LEN] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| ParseError::InvalidLength {
                    kind: "account id",
                    expected: ACCOUNT_ID_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }
}

impl From<[u8; ACCOUNT_ID_LEN]> for AccountId {
    fn from(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self::from_bytes(bytes)
    }
}

/// Content fingerprint identifying a registered document.
///
/// The ledger never recomputes or checks the hash against file contents; it is
/// a primary key and nothing more. Always non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct DocumentHash(Vec<u8>);

impl DocumentHash {
    /// Create a document hash from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, ParseError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ParseError::Empty {
                kind: "document hash",
            });
        }
        Ok(Self(bytes))
    }

    /// Parse a hex digest such as the output of `sha256sum`.
    pub fn from_hex(digest: &str) -> Result<Self, ParseError> {
        let hex_str = digest
            .strip_prefix("0x")
            .or_else(|| digest.strip_prefix("0X"))
            .unwrap_or(digest);
        let bytes = hex::decode(hex_str).map_err(|e| ParseError::InvalidHex {
            kind: "document hash",
            reason: e.to_string(),
        })?;
        Self::from_bytes(bytes)
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes in the hash.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DocumentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl FromStr for DocumentHash {
    type Err = ParseError;

    /// Takes the string's UTF-8 bytes verbatim. Use `from_hex` to decode a digest.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes().to_vec())
    }
}

impl TryFrom<Vec<u8>> for DocumentHash {
    type Error = ParseError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_bytes(value)
    }
}

impl From<DocumentHash> for Vec<u8> {
    fn from(hash: DocumentHash) -> Self {
        hash.0
    }
}
