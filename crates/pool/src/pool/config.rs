//! Pool configuration types

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for a pool instance. Immutable once the pool is built.
///
/// With the `serde` feature, durations are written in humantime form
/// (`"1500ms"`, `"10s"`) and missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfig {
    /// Resources created eagerly by [`Pool::build`](crate::Pool::build)
    pub pool_size: usize,
    /// Hard ceiling on resources the pool may hold at once
    pub max_pool_size: usize,
    /// How long a resource may sit idle before maintenance evicts it
    #[cfg_attr(feature = "serde", serde(with = "humantime_serde"))]
    pub max_idle_time: Duration,
    /// How long a caller waits for a resource before the pool gives up
    #[cfg_attr(feature = "serde", serde(with = "humantime_serde"))]
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            max_pool_size: 15,
            max_idle_time: Duration::from_millis(1500),
            acquire_timeout: Duration::from_millis(10_000),
        }
    }
}

impl PoolConfig {
    /// Build a configuration from millisecond-denominated timings.
    #[must_use]
    pub fn from_millis(
        pool_size: usize,
        max_pool_size: usize,
        max_idle_ms: u64,
        acquire_timeout_ms: u64,
    ) -> Self {
        Self {
            pool_size,
            max_pool_size,
            max_idle_time: Duration::from_millis(max_idle_ms),
            acquire_timeout: Duration::from_millis(acquire_timeout_ms),
        }
    }

    /// Validate pool configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.max_pool_size == 0 {
            return Err(Error::configuration("max_pool_size must be greater than 0"));
        }
        if self.pool_size > self.max_pool_size {
            return Err(Error::configuration(format!(
                "pool_size ({}) must not exceed max_pool_size ({})",
                self.pool_size, self.max_pool_size
            )));
        }
        if self.acquire_timeout.is_zero() {
            return Err(Error::configuration("acquire_timeout must be greater than zero"));
        }
        Ok(())
    }
}
