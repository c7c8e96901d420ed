//! # Runtime Configuration
//!
//! The options the core consumes from a proof root's `meta.json`. Path
//! discovery and file loading belong to the hosting front-end; this module
//! owns the content: parsing, range validation, defaults, and round-trip
//! preservation of keys it does not recognise.

use serde::{Deserialize, Serialize};
use shared_types::ExitClass;
use std::time::Duration;
use thiserror::Error;

/// The only supported `version` value.
pub const META_VERSION: &str = "1.0";

fn default_lock_timeout() -> u64 {
    300
}
fn default_max_depth() -> u32 {
    20
}
fn default_max_children() -> u32 {
    20
}
fn default_warn_depth() -> u32 {
    3
}
fn default_auto_correct_threshold() -> f64 {
    0.8
}

/// Configuration errors are logic-class: the file content is wrong.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("meta.json is not valid JSON: {message}")]
    Parse { message: String },

    #[error("meta.json version '{found}' unsupported; expected '{expected}'")]
    UnsupportedVersion { found: String, expected: String },

    #[error("meta.json key '{key}' out of range: {message}")]
    OutOfRange { key: &'static str, message: String },
}

impl ConfigError {
    pub fn exit_class(&self) -> ExitClass {
        ExitClass::Logic
    }
}

/// Options recognised by the core. Unknown keys are preserved through a
/// round trip but otherwise ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaConfig {
    /// Schema version; must equal [`META_VERSION`].
    pub version: String,

    /// Default lock duration in seconds (1s to 1h).
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout: u64,

    /// Maximum node depth (1 to 100).
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum children per node (1 to 100).
    #[serde(default = "default_max_children")]
    pub max_children: u32,

    /// Depth at which a warning marker is emitted.
    #[serde(default = "default_warn_depth")]
    pub warn_depth: u32,

    /// Fuzzy-match threshold for front-end suggestions (0.0 to 1.0).
    #[serde(default = "default_auto_correct_threshold")]
    pub auto_correct_threshold: f64,

    /// Keys this core does not recognise, preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for MetaConfig {
    fn default() -> Self {
        MetaConfig {
            version: META_VERSION.to_string(),
            lock_timeout: default_lock_timeout(),
            max_depth: default_max_depth(),
            max_children: default_max_children(),
            warn_depth: default_warn_depth(),
            auto_correct_threshold: default_auto_correct_threshold(),
            extra: serde_json::Map::new(),
        }
    }
}

impl MetaConfig {
    /// Parse and validate `meta.json` content.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: MetaConfig = serde_json::from_str(raw).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialise, unknown keys included.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Range-check every recognised option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != META_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version.clone(),
                expected: META_VERSION.to_string(),
            });
        }
        if !(1..=3600).contains(&self.lock_timeout) {
            return Err(ConfigError::OutOfRange {
                key: "lock_timeout",
                message: format!("{} not in 1..=3600 seconds", self.lock_timeout),
            });
        }
        if !(1..=100).contains(&self.max_depth) {
            return Err(ConfigError::OutOfRange {
                key: "max_depth",
                message: format!("{} not in 1..=100", self.max_depth),
            });
        }
        if !(1..=100).contains(&self.max_children) {
            return Err(ConfigError::OutOfRange {
                key: "max_children",
                message: format!("{} not in 1..=100", self.max_children),
            });
        }
        if !(0.0..=1.0).contains(&self.auto_correct_threshold) {
            return Err(ConfigError::OutOfRange {
                key: "auto_correct_threshold",
                message: format!("{} not in 0.0..=1.0", self.auto_correct_threshold),
            });
        }
        Ok(())
    }

    /// The default claim duration.
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout)
    }
}
