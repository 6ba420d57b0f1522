//! Cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use geocache_core::constants::DEFAULT_CACHE_TTL;
use geocache_core::error::{GeocodeError, Result};

use crate::value::CacheValue;

/// When an entry's expiry clock starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryPolicy {
    /// Entries expire a fixed time after they were loaded.
    #[default]
    AfterWrite,
    /// Every hit re-arms the entry for another full lifetime.
    AfterAccess,
}

/// Cache configuration.
///
/// Durations use humantime notation when (de)serialized, e.g. `"24h"` or `"90s"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of a successfully loaded entry. Must be positive.
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
    /// Lifetime of a "no result" entry (see [`CacheValue::is_negative`]).
    /// `None` applies `ttl` to every entry.
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub negative_ttl: Option<Duration>,
    /// Fixed or sliding expiry.
    pub expiry: ExpiryPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_CACHE_TTL,
            negative_ttl: None,
            expiry: ExpiryPolicy::AfterWrite,
        }
    }
}

impl CacheConfig {
    /// Creates a config with the given TTL and default everything else.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Default::default()
        }
    }

    /// Sets a separate lifetime for "no result" entries.
    pub fn with_negative_ttl(mut self, negative_ttl: Duration) -> Self {
        self.negative_ttl = Some(negative_ttl);
        self
    }

    /// Switches to sliding expiry.
    pub fn sliding(mut self) -> Self {
        self.expiry = ExpiryPolicy::AfterAccess;
        self
    }

    /// Checks that every duration is positive.
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(GeocodeError::ConfigError("cache ttl must be positive".into()));
        }
        if let Some(negative) = self.negative_ttl {
            if negative.is_zero() {
                return Err(GeocodeError::ConfigError(
                    "cache negative_ttl must be positive when set".into(),
                ));
            }
        }
        Ok(())
    }

    /// Lifetime to give `value` when it is stored.
    pub(crate) fn lifetime_for<V: CacheValue>(&self, value: &V) -> Duration {
        match self.negative_ttl {
            Some(negative) if value.is_negative() => negative,
            _ => self.ttl,
        }
    }
}
