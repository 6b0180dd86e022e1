//! # Pool Configuration
//!
//! Pool settings loaded once at startup from TOML.
//!
//! ```toml
//! strict_check = "debug_only"
//!
//! [default_pool]
//! capacity = 256
//! expire_secs = 60.0
//! auto_release_interval_secs = 5.0
//!
//! [pools."game::Bullet.player"]
//! allow_multi_get = false
//! capacity = 1024
//! priority = 10
//! ```
//!
//! Per-pool tables are keyed by the rendered [`PoolKey`](crate::PoolKey).
//! Pools without an entry use `default_pool`.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use oroboros_core::{PoolError, PoolResult, StrictCheck};
use serde::{Deserialize, Serialize};

/// Settings of one object pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Whether one object may be held by several callers at once.
    pub allow_multi_get: bool,
    /// Soft capacity. `None` means unbounded.
    pub capacity: Option<usize>,
    /// Seconds of idleness after which an object expires. `None` means never.
    pub expire_secs: Option<f64>,
    /// Seconds between periodic eviction passes. `None` means never.
    pub auto_release_interval_secs: Option<f64>,
    /// Pool priority. Bulk operations visit lower numbers first.
    pub priority: i32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            allow_multi_get: false,
            capacity: None,
            expire_secs: None,
            auto_release_interval_secs: None,
            priority: i32::MAX,
        }
    }
}

impl PoolSettings {
    /// Sets `allow_multi_get`.
    #[must_use]
    pub const fn with_multi_get(mut self, allow: bool) -> Self {
        self.allow_multi_get = allow;
        self
    }

    /// Sets the capacity.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Sets the expiry time in seconds.
    #[must_use]
    pub fn with_expire_secs(mut self, secs: f64) -> Self {
        self.expire_secs = Some(secs);
        self
    }

    /// Sets the auto-release interval in seconds.
    #[must_use]
    pub fn with_auto_release_interval_secs(mut self, secs: f64) -> Self {
        self.auto_release_interval_secs = Some(secs);
        self
    }

    /// Sets the pool priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Capacity as a count, `usize::MAX` when unbounded.
    #[inline]
    #[must_use]
    pub fn capacity_or_unbounded(&self) -> usize {
        self.capacity.unwrap_or(usize::MAX)
    }

    /// Expiry time.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidArgument`] if the value is negative or not finite.
    pub fn expire_time(&self) -> PoolResult<Option<Duration>> {
        seconds("expire_secs", self.expire_secs)
    }

    /// Auto-release interval.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidArgument`] if the value is negative or not finite.
    pub fn auto_release_interval(&self) -> PoolResult<Option<Duration>> {
        seconds("auto_release_interval_secs", self.auto_release_interval_secs)
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidArgument`] naming the first invalid field.
    pub fn validate(&self) -> PoolResult<()> {
        self.expire_time()?;
        self.auto_release_interval()?;
        Ok(())
    }
}

fn seconds(field: &str, value: Option<f64>) -> PoolResult<Option<Duration>> {
    value
        .map(|secs| {
            Duration::try_from_secs_f64(secs).map_err(|_| {
                PoolError::InvalidArgument(format!(
                    "{field} must be a finite, non-negative number of seconds (got {secs})"
                ))
            })
        })
        .transpose()
}

/// Configuration of the whole pooling system.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSystemConfig {
    /// When memory pools run their contract checks.
    pub strict_check: StrictCheck,
    /// Settings for pools without an override.
    pub default_pool: PoolSettings,
    /// Overrides keyed by rendered pool key.
    pub pools: HashMap<String, PoolSettings>,
}

impl PoolSystemConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidConfig`] on malformed TOML, unknown fields or
    /// invalid values.
    pub fn from_toml_str(source: &str) -> PoolResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|err| PoolError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidConfig`] if the file cannot be read or is invalid.
    pub fn from_toml_file(path: impl AsRef<Path>) -> PoolResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|err| PoolError::InvalidConfig(format!("{}: {err}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks the default settings and every override.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidConfig`] naming the offending pool.
    pub fn validate(&self) -> PoolResult<()> {
        self.default_pool
            .validate()
            .map_err(|err| PoolError::InvalidConfig(format!("default_pool: {err}")))?;
        for (key, settings) in &self.pools {
            settings
                .validate()
                .map_err(|err| PoolError::InvalidConfig(format!("pools.\"{key}\": {err}")))?;
        }
        Ok(())
    }

    /// Settings for the pool rendered as `key`.
    #[must_use]
    pub fn settings_for(&self, key: &str) -> &PoolSettings {
        self.pools.get(key).unwrap_or(&self.default_pool)
    }
}
