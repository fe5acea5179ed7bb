#![forbid(unsafe_code)]

//! History configuration.
//!
//! [`HistoryConfig`] is a plain struct with sensible defaults. With the
//! `config` feature it can also be loaded from TOML or JSON:
//!
//! ```toml
//! # rewind.toml
//! max_depth = 250      # or "unlimited"
//! ```
//!
//! ```rust,ignore
//! let config = HistoryConfig::load_toml_file("rewind.toml")?;
//! let config = HistoryConfig::from_json_str(r#"{"max_depth": 50}"#)?;
//! ```

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Default undo depth.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Configuration for a [`History`](crate::History).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct HistoryConfig {
    /// Maximum number of snapshots retained on the undo stack.
    /// Oldest snapshots are evicted when this limit is exceeded.
    /// `usize::MAX` means unlimited and is written as `"unlimited"` in files.
    #[cfg_attr(
        feature = "config",
        serde(serialize_with = "serialize_depth", deserialize_with = "deserialize_depth")
    )]
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl HistoryConfig {
    /// Create a new configuration with the given depth limit.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Create an unlimited configuration.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }

    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.max_depth == usize::MAX
    }

    /// Check parameters are usable.
    ///
    /// Returns a list of problems; empty means valid. A depth of zero is
    /// accepted by [`new`](Self::new) but keeps no history at all, so a
    /// loaded file asking for it is almost certainly a mistake.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.max_depth == 0 {
            errors.push("max_depth must be > 0".into());
        }
        errors
    }
}

#[cfg(feature = "config")]
impl HistoryConfig {
    /// Parse from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Parse from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load and validate a TOML file.
    pub fn load_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)?.validated()
    }

    /// Load and validate a JSON file.
    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)?.validated()
    }

    /// Return `self` if [`validate`](Self::validate) finds no problems.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Serialize to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}

#[cfg(feature = "config")]
const UNLIMITED: &str = "unlimited";

#[cfg(feature = "config")]
fn serialize_depth<S>(depth: &usize, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if *depth == usize::MAX {
        return serializer.serialize_str(UNLIMITED);
    }
    // TOML integers are i64; wider depths are unbounded in practice.
    match i64::try_from(*depth) {
        Ok(depth) => serializer.serialize_i64(depth),
        Err(_) => serializer.serialize_str(UNLIMITED),
    }
}

#[cfg(feature = "config")]
fn deserialize_depth<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Depth {
        Count(u64),
        Word(String),
    }

    match Depth::deserialize(deserializer)? {
        Depth::Count(n) => usize::try_from(n)
            .map_err(|_| serde::de::Error::custom(format!("max_depth out of range: {n}"))),
        Depth::Word(word) if word == UNLIMITED => Ok(usize::MAX),
        Depth::Word(other) => Err(serde::de::Error::custom(format!(
            "max_depth must be a count or \"{UNLIMITED}\", got \"{other}\""
        ))),
    }
}

/// Errors from loading a [`HistoryConfig`].
#[cfg(feature = "config")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
