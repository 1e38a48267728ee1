//! # Store Configuration
//!
//! Growth and clear policy for a component store.
//!
//! Configs are plain data, usually built in code with [`StoreConfig::default`]
//! or a preset, or loaded once at startup from TOML:
//!
//! ```toml
//! initial_capacity = 10000
//! shrink_on_clear = false
//!
//! [growth]
//! policy = "increment"
//! step = 512
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Smallest capacity a doubling store grows to from empty.
pub const MIN_DOUBLING_CAPACITY: usize = 16;

/// How a full store grows when `create` needs a new slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum GrowthPolicy {
    /// Double the capacity (at least [`MIN_DOUBLING_CAPACITY`]).
    Doubling,
    /// Add a fixed number of slots.
    Increment {
        /// Slots added per growth. Must be non-zero.
        step: usize,
    },
}

impl GrowthPolicy {
    /// Capacity to grow to from a full store of `current` slots.
    ///
    /// Always strictly greater than `current` for a valid policy, saturating
    /// at `usize::MAX`.
    #[inline]
    #[must_use]
    pub fn next_capacity(self, current: usize) -> usize {
        match self {
            Self::Doubling => current.saturating_mul(2).max(MIN_DOUBLING_CAPACITY),
            Self::Increment { step } => current.saturating_add(step.max(1)),
        }
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::Doubling
    }
}

/// Configuration for a [`ComponentStore`](crate::ComponentStore).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Slots reserved at construction.
    pub initial_capacity: usize,
    /// Release column and mask allocations on `clear`.
    pub shrink_on_clear: bool,
    /// Growth applied when `create` finds the store full.
    pub growth: GrowthPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            shrink_on_clear: false,
            growth: GrowthPolicy::Doubling,
        }
    }
}

impl StoreConfig {
    /// Particle emitter config: `count` slots up front, then fixed steps of a
    /// tenth of that, matching a spray of roughly 10% of the particle budget
    /// per frame.
    #[must_use]
    pub const fn particles(count: usize) -> Self {
        let step = if count / 10 == 0 { 1 } else { count / 10 };
        Self {
            initial_capacity: count,
            shrink_on_clear: false,
            growth: GrowthPolicy::Increment { step },
        }
    }

    /// Parses and validates a TOML config.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] on a parse error, an unknown key,
    /// or a zero increment step.
    pub fn from_toml_str(source: &str) -> StoreResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| StoreError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if the file cannot be read or
    /// [`from_toml_str`](Self::from_toml_str) rejects it.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            StoreError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&source)
    }

    /// Serializes the config to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if serialization fails.
    pub fn to_toml_string(&self) -> StoreResult<String> {
        toml::to_string(self).map_err(|e| StoreError::InvalidConfig(e.to_string()))
    }

    /// Checks the config for values the store cannot honor.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] for a zero increment step.
    pub fn validate(&self) -> StoreResult<()> {
        if let GrowthPolicy::Increment { step: 0 } = self.growth {
            return Err(StoreError::InvalidConfig(
                "growth step must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}
