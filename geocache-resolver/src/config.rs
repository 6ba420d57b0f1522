//! Facade configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use geocache_cache::CacheConfig;
use geocache_core::error::{GeocodeError, Result};
use geocache_core::types::Locale;

/// Configuration of a [`CachingGeocoder`](crate::CachingGeocoder).
///
/// `cache` applies to every operation unless a per-operation override is set.
///
/// ```json
/// {
///   "cache": { "ttl": "24h" },
///   "lookup": { "ttl": "7d", "negative_ttl": "10m" },
///   "default_locale": "de-AT"
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Shared cache settings
    pub cache: CacheConfig,
    /// Override for forward geocoding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward: Option<CacheConfig>,
    /// Override for reverse geocoding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse: Option<CacheConfig>,
    /// Override for lookup by id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup: Option<CacheConfig>,
    /// Locale used when a call does not name one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_locale: Option<String>,
}

impl ResolverConfig {
    /// Creates a config with the given TTL for every operation.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: CacheConfig::with_ttl(ttl),
            ..Default::default()
        }
    }

    /// Sets the default locale.
    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = Some(locale.into());
        self
    }

    /// Overrides the forward geocoding cache.
    pub fn with_forward(mut self, config: CacheConfig) -> Self {
        self.forward = Some(config);
        self
    }

    /// Overrides the reverse geocoding cache.
    pub fn with_reverse(mut self, config: CacheConfig) -> Self {
        self.reverse = Some(config);
        self
    }

    /// Overrides the lookup cache.
    pub fn with_lookup(mut self, config: CacheConfig) -> Self {
        self.lookup = Some(config);
        self
    }

    /// Effective forward cache settings.
    pub fn forward_cache(&self) -> &CacheConfig {
        self.forward.as_ref().unwrap_or(&self.cache)
    }

    /// Effective reverse cache settings.
    pub fn reverse_cache(&self) -> &CacheConfig {
        self.reverse.as_ref().unwrap_or(&self.cache)
    }

    /// Effective lookup cache settings.
    pub fn lookup_cache(&self) -> &CacheConfig {
        self.lookup.as_ref().unwrap_or(&self.cache)
    }

    /// Checks every cache setting and the default locale.
    pub fn validate(&self) -> Result<()> {
        self.forward_cache().validate()?;
        self.reverse_cache().validate()?;
        self.lookup_cache().validate()?;
        self.parsed_default_locale()?;
        Ok(())
    }

    /// The normalized default locale; a blank string counts as unset.
    pub(crate) fn parsed_default_locale(&self) -> Result<Option<Locale>> {
        Locale::parse_opt(self.default_locale.as_deref())
            .map_err(|e| GeocodeError::ConfigError(format!("default_locale: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use geocache_cache::ExpiryPolicy;

    #[test]
    fn test_overrides_fall_back_to_shared() {
        let config = ResolverConfig::with_ttl(Duration::from_secs(60))
            .with_lookup(CacheConfig::with_ttl(Duration::from_secs(5)).sliding());

        assert_eq!(config.forward_cache().ttl, Duration::from_secs(60));
        assert_eq!(config.reverse_cache().ttl, Duration::from_secs(60));
        assert_eq!(config.lookup_cache().ttl, Duration::from_secs(5));
        assert_eq!(config.lookup_cache().expiry, ExpiryPolicy::AfterAccess);
    }

    #[test]
    fn test_validate() {
        assert!(ResolverConfig::default().validate().is_ok());
        assert!(ResolverConfig::default().with_default_locale("pt_br").validate().is_ok());

        let err = ResolverConfig::default().with_default_locale("x!").validate().unwrap_err();
        assert!(err.is_config_error());

        let err = ResolverConfig::default()
            .with_reverse(CacheConfig::with_ttl(Duration::ZERO))
            .validate()
            .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_blank_default_locale_is_unset() {
        let config = ResolverConfig::default().with_default_locale("  ");
        assert_eq!(config.parsed_default_locale().unwrap(), None);
    }

    #[test]
    fn test_deserialize() {
        let config: ResolverConfig = serde_json::from_str(
            r#"{
                "cache": { "ttl": "2h" },
                "lookup": { "ttl": "7days", "negative_ttl": "10m" },
                "default_locale": "de_at"
            }"#,
        )
        .unwrap();

        assert_eq!(config.forward_cache().ttl, Duration::from_secs(7200));
        assert_eq!(config.lookup_cache().ttl, Duration::from_secs(7 * 86_400));
        assert_eq!(config.lookup_cache().negative_ttl, Some(Duration::from_secs(600)));
        assert_eq!(config.parsed_default_locale().unwrap().unwrap().as_str(), "de-AT");
    }
}
