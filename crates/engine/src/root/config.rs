//! Root configuration
//!
//! Roots work with no configuration at all. `RootConfig` exists for the
//! knobs an embedding application may want to pin down: a label for log
//! output and the sizing of the slot storage. It can be built in code or
//! parsed from TOML:
//!
//! ```toml
//! label = "settings-panel"
//! initial_capacity = 64
//! shard_amount = 8
//! ```

use atomstore_core::{AtomError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a [`Root`](super::Root)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootConfig {
    /// Human name used as a log field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Slots to pre-allocate
    #[serde(default)]
    pub initial_capacity: usize,
    /// Storage shard count; must be a power of two greater than one.
    /// `None` lets the storage pick based on available parallelism.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard_amount: Option<usize>,
}

impl RootConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: RootConfig =
            toml::from_str(s).map_err(|e| AtomError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AtomError::invalid_config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| AtomError::invalid_config(e.to_string()))
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if let Some(shards) = self.shard_amount {
            if shards < 2 || !shards.is_power_of_two() {
                return Err(AtomError::invalid_config(format!(
                    "shard_amount must be a power of two greater than one, got {}",
                    shards
                )));
            }
        }
        if let Some(label) = &self.label {
            if label.trim().is_empty() {
                return Err(AtomError::invalid_config("label must not be blank"));
            }
        }
        Ok(())
    }
}
