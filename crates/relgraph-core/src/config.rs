//! Validation configuration.
//!
//! Defaults apply when an application never configures anything;
//! `ValidationConfig::from_toml_str` reads the same shape from a flat TOML
//! document.

use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid validation config: {field} {message}")]
    Invalid {
        field: &'static str,
        message: &'static str,
    },

    #[error("failed to parse validation config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// UnknownKeys
///
/// Policy for object keys that name no field, relation or operator.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, FromStr, PartialEq, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeys {
    /// Report `UnknownKey`.
    #[default]
    Strict,
    /// Drop the key silently.
    Strip,
}

///
/// ValidationConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    pub unknown_keys: UnknownKeys,

    /// Maximum nesting of filters, nested writes and embedded relation views.
    pub max_depth: usize,

    /// Maximum nesting of JSON values stored in JSON fields.
    pub max_json_depth: usize,

    /// Maximum length of any list in a payload.
    pub max_list_len: usize,
}

impl ValidationConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 32;
    pub const DEFAULT_MAX_JSON_DEPTH: usize = 64;
    pub const DEFAULT_MAX_LIST_LEN: usize = 10_000;

    /// Parse and check a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.check()?;

        Ok(config)
    }

    /// Reject limits that would make every payload invalid.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "max_depth",
                message: "must be at least 1",
            });
        }
        if self.max_json_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "max_json_depth",
                message: "must be at least 1",
            });
        }

        Ok(())
    }

    #[must_use]
    pub const fn with_unknown_keys(mut self, unknown_keys: UnknownKeys) -> Self {
        self.unknown_keys = unknown_keys;
        self
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub const fn with_max_list_len(mut self, max_list_len: usize) -> Self {
        self.max_list_len = max_list_len;
        self
    }

    #[must_use]
    pub const fn is_strict(&self) -> bool {
        matches!(self.unknown_keys, UnknownKeys::Strict)
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            unknown_keys: UnknownKeys::Strict,
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_json_depth: Self::DEFAULT_MAX_JSON_DEPTH,
            max_list_len: Self::DEFAULT_MAX_LIST_LEN,
        }
    }
}

///
/// TESTS
///
