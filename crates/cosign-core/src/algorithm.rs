//! Hash algorithm labels.
//!
//! The label is informational: it records how the registrant computed the
//! document hash so an auditor can recompute it off-ledger.

use crate::errors::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hash function named at registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum HashAlgorithm {
    /// MD5
    Md5,
    /// SHA-0 (`sha`)
    Sha,
    /// SHA-1
    Sha1,
    /// SHA-224
    Sha224,
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
    /// Any other label, preserved verbatim
    Other(String),
}

impl HashAlgorithm {
    /// Labels produced by the companion hashing tool.
    pub const KNOWN_LABELS: &'static [&'static str] =
        &["md5", "sha", "sha1", "sha224", "sha256", "sha384", "sha512"];

    /// Canonical label.
    pub fn label(&self) -> &str {
        match self {
            Self::Md5 => "md5",
            Self::Sha => "sha",
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Other(label) => label,
        }
    }

    /// Whether the label is one the hashing tool emits.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl FromStr for HashAlgorithm {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseError::Empty {
                kind: "hash algorithm",
            });
        }
        let normalized = trimmed.to_ascii_lowercase().replace('-', "");
        Ok(match normalized.as_str() {
            "md5" => Self::Md5,
            "sha" => Self::Sha,
            "sha1" => Self::Sha1,
            "sha224" => Self::Sha224,
            "sha256" => Self::Sha256,
            "sha384" => Self::Sha384,
            "sha512" => Self::Sha512,
            _ => Self::Other(trimmed.to_string()),
        })
    }
}

impl TryFrom<String> for HashAlgorithm {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HashAlgorithm> for String {
    fn from(algorithm: HashAlgorithm) -> Self {
        algorithm.label().to_string()
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
