//! Ledger configuration.
//!
//! Loaded from TOML (or JSON, chosen by file extension), then overridden by
//! `COSIGN_*` environment variables, then validated.
//!
//! ```toml
//! [limits]
//! max_signatories_per_document = 64
//! max_text_len = 1024
//!
//! [events]
//! channel_capacity = 256
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "COSIGN_";

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file extension is not a supported format.
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// The contents did not parse.
    #[error("invalid {format} config: {reason}")]
    Parse {
        /// Format being parsed
        format: &'static str,
        /// Parser message
        reason: String,
    },

    /// An environment override had an unparseable value.
    #[error("invalid value for {key}: {value}")]
    InvalidOverride {
        /// Environment variable name
        key: String,
        /// Offending value
        value: String,
    },

    /// A setting is out of range.
    #[error("invalid configuration: {field} - {reason}")]
    Invalid {
        /// Offending setting
        field: &'static str,
        /// Why it is invalid
        reason: String,
    },
}

/// Boundary limits enforced before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitConfig {
    /// Maximum signatories per document. Bounds the duplicate-check scan.
    pub max_signatories_per_document: usize,
    /// Maximum byte length of free-text fields (names, descriptions, labels).
    pub max_text_len: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_signatories_per_document: 256,
            max_text_len: 4096,
        }
    }
}

/// Event fan-out settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventConfig {
    /// Capacity of the live broadcast channel. Observers that fall further
    /// behind than this lose the oldest events (the history keeps them).
    pub channel_capacity: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// Top-level ledger configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Boundary limits
    pub limits: LimitConfig,
    /// Event settings
    pub events: EventConfig,
}

impl LedgerConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            format: "TOML",
            reason: e.to_string(),
        })
    }

    /// Load from a `.toml` or `.json` file, apply environment overrides and validate.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content)?,
            Some("json") => serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                format: "JSON",
                reason: e.to_string(),
            })?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };

        config.merge_with_env()?;
        config.validate()?;
        tracing::debug!(path = %path.display(), ?config, "loaded ledger configuration");
        Ok(config)
    }

    /// Apply `COSIGN_*` overrides from the process environment.
    pub fn merge_with_env(&mut self) -> Result<(), ConfigError> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `COSIGN_*` overrides from an explicit variable list.
    ///
    /// Recognised keys: `COSIGN_MAX_SIGNATORIES`, `COSIGN_MAX_TEXT_LEN`,
    /// `COSIGN_EVENT_CHANNEL_CAPACITY`. Other `COSIGN_*` keys are ignored.
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let key = key.as_ref();
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let target = match name {
                "MAX_SIGNATORIES" => &mut self.limits.max_signatories_per_document,
                "MAX_TEXT_LEN" => &mut self.limits.max_text_len,
                "EVENT_CHANNEL_CAPACITY" => &mut self.events.channel_capacity,
                _ => continue,
            };
            *target = value
                .as_ref()
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride {
                    key: key.to_string(),
                    value: value.as_ref().to_string(),
                })?;
        }
        Ok(())
    }

    /// Check every setting is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_signatories_per_document == 0 {
            return Err(ConfigError::Invalid {
                field: "limits.max_signatories_per_document",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.limits.max_text_len == 0 {
            return Err(ConfigError::Invalid {
                field: "limits.max_text_len",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.events.channel_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "events.channel_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
