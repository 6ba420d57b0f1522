//! Caching facade over a geocoding provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use geocache_cache::{CacheStats, ExpiringCache};
use geocache_core::error::{GeocodeError, Result};
use geocache_core::traits::Geocoder;
use geocache_core::types::{Coordinate, Locale, Place};

use crate::config::ResolverConfig;
use crate::key::LookupKey;

type PlacesCache = ExpiringCache<LookupKey, Vec<Place>, GeocodeError>;
type PlaceCache = ExpiringCache<LookupKey, Option<Place>, GeocodeError>;

/// Geocoder that caches another geocoder's answers.
///
/// Forward, reverse and id lookups each go through their own expiring cache,
/// keyed by the term and the effective locale. For each key:
/// 1. An unexpired cached answer is returned without touching the provider
/// 2. Otherwise the provider is called once, however many callers are asking
/// 3. Successful answers, including "no match", are cached; failures are not
///
/// The facade is itself a [`Geocoder`], so it can be stacked or handed to
/// anything that takes a provider.
pub struct CachingGeocoder {
    provider: Arc<dyn Geocoder>,
    default_locale: Option<Locale>,
    forward: PlacesCache,
    reverse: PlacesCache,
    lookup: PlaceCache,
    config: ResolverConfig,
}

impl CachingGeocoder {
    /// Wraps `provider` with the given configuration.
    ///
    /// Fails with [`GeocodeError::ConfigError`] on a non-positive TTL or an
    /// invalid default locale.
    pub fn new(provider: Arc<dyn Geocoder>, config: ResolverConfig) -> Result<Self> {
        config.validate()?;
        let default_locale = config.parsed_default_locale()?;

        Ok(Self {
            provider,
            default_locale,
            forward: ExpiringCache::new(config.forward_cache().clone())?,
            reverse: ExpiringCache::new(config.reverse_cache().clone())?,
            lookup: ExpiringCache::new(config.lookup_cache().clone())?,
            config,
        })
    }

    /// Wraps `provider` with one TTL for every operation.
    pub fn with_ttl(provider: Arc<dyn Geocoder>, ttl: Duration) -> Result<Self> {
        Self::new(provider, ResolverConfig::with_ttl(ttl))
    }

    /// Resolves an address to places.
    ///
    /// `locale` is normalized first (`"en_us"` and `"en-US"` are the same
    /// locale); blank or `None` falls back to the default locale.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let places = geocoder.geocode("Jakob-Haringer-Straße 3, Salzburg", Some("de")).await?;
    /// ```
    #[instrument(skip(self))]
    pub async fn geocode(&self, address: &str, locale: Option<&str>) -> Result<Vec<Place>> {
        let locale = self.resolve_locale(locale)?;
        self.cached_geocode(address, locale).await
    }

    /// Resolves a coordinate to the places at or near it.
    #[instrument(skip(self))]
    pub async fn reverse_geocode(&self, coordinate: Coordinate, locale: Option<&str>) -> Result<Vec<Place>> {
        let locale = self.resolve_locale(locale)?;
        self.cached_reverse(coordinate, locale).await
    }

    /// Resolves a place id. `Ok(None)` (the id does not resolve) is cached too.
    #[instrument(skip(self))]
    pub async fn lookup(&self, id: &str, locale: Option<&str>) -> Result<Option<Place>> {
        let locale = self.resolve_locale(locale)?;
        self.cached_lookup(id, locale).await
    }

    /// Drops the cached forward answer for `address`. Returns true if one existed.
    pub fn invalidate_geocode(&self, address: &str, locale: Option<&str>) -> Result<bool> {
        let key = LookupKey::text(address, self.resolve_locale(locale)?);
        Ok(self.forward.invalidate(&key))
    }

    /// Drops the cached reverse answer for `coordinate`. Returns true if one existed.
    pub fn invalidate_reverse(&self, coordinate: Coordinate, locale: Option<&str>) -> Result<bool> {
        let key = LookupKey::coordinate(coordinate, self.resolve_locale(locale)?);
        Ok(self.reverse.invalidate(&key))
    }

    /// Drops the cached answer for place `id`. Returns true if one existed.
    pub fn invalidate_lookup(&self, id: &str, locale: Option<&str>) -> Result<bool> {
        let key = LookupKey::id(id, self.resolve_locale(locale)?);
        Ok(self.lookup.invalidate(&key))
    }

    /// Clears all three caches.
    pub fn clear_cache(&self) {
        self.forward.invalidate_all();
        self.reverse.invalidate_all();
        self.lookup.invalidate_all();
    }

    /// Purges expired entries from all caches, returning how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let removed = self.forward.cleanup_expired() + self.reverse.cleanup_expired() + self.lookup.cleanup_expired();
        if removed > 0 {
            debug!(removed, "Purged expired entries");
        }
        removed
    }

    /// Returns per-operation cache statistics.
    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            forward: self.forward.stats(),
            reverse: self.reverse.stats(),
            lookup: self.lookup.stats(),
        }
    }

    /// Returns the wrapped provider.
    pub fn provider(&self) -> &Arc<dyn Geocoder> {
        &self.provider
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns the normalized default locale.
    pub fn default_locale(&self) -> Option<&Locale> {
        self.default_locale.as_ref()
    }

    fn resolve_locale(&self, raw: Option<&str>) -> Result<Option<Locale>> {
        Ok(self.effective_locale(Locale::parse_opt(raw)?))
    }

    fn effective_locale(&self, locale: Option<Locale>) -> Option<Locale> {
        locale.or_else(|| self.default_locale.clone())
    }

    async fn cached_geocode(&self, address: &str, locale: Option<Locale>) -> Result<Vec<Place>> {
        let key = LookupKey::text(address, locale);
        self.forward
            .get_or_load(key, |key| async move {
                let places = self
                    .provider
                    .geocode(address, key.locale())
                    .await
                    .map_err(|e| {
                        warn!(address, locale = ?key.locale(), error = %e, "Geocoding failed");
                        e
                    })?;
                debug!(address, results = places.len(), "Geocoded");
                Ok(places)
            })
            .await
    }

    async fn cached_reverse(&self, coordinate: Coordinate, locale: Option<Locale>) -> Result<Vec<Place>> {
        let key = LookupKey::coordinate(coordinate, locale);
        self.reverse
            .get_or_load(key, |key| async move {
                let places = self
                    .provider
                    .reverse_geocode(coordinate, key.locale())
                    .await
                    .map_err(|e| {
                        warn!(%coordinate, locale = ?key.locale(), error = %e, "Reverse geocoding failed");
                        e
                    })?;
                debug!(%coordinate, results = places.len(), "Reverse geocoded");
                Ok(places)
            })
            .await
    }

    async fn cached_lookup(&self, id: &str, locale: Option<Locale>) -> Result<Option<Place>> {
        let key = LookupKey::id(id, locale);
        self.lookup
            .get_or_load(key, |key| async move {
                let place = self.provider.lookup(id, key.locale()).await.map_err(|e| {
                    warn!(id, locale = ?key.locale(), error = %e, "Lookup failed");
                    e
                })?;
                debug!(id, found = place.is_some(), "Looked up");
                Ok(place)
            })
            .await
    }
}

/// The trait methods take an already-normalized locale; `None` still falls
/// back to the default locale.
#[async_trait]
impl Geocoder for CachingGeocoder {
    async fn geocode(&self, address: &str, locale: Option<&Locale>) -> Result<Vec<Place>> {
        self.cached_geocode(address, self.effective_locale(locale.cloned())).await
    }

    async fn reverse_geocode(&self, coordinate: Coordinate, locale: Option<&Locale>) -> Result<Vec<Place>> {
        self.cached_reverse(coordinate, self.effective_locale(locale.cloned())).await
    }

    async fn lookup(&self, id: &str, locale: Option<&Locale>) -> Result<Option<Place>> {
        self.cached_lookup(id, self.effective_locale(locale.cloned())).await
    }
}

/// Cache statistics of a [`CachingGeocoder`], one set per operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolverStats {
    /// Forward geocoding cache
    pub forward: CacheStats,
    /// Reverse geocoding cache
    pub reverse: CacheStats,
    /// Lookup-by-id cache
    pub lookup: CacheStats,
}

impl ResolverStats {
    /// Provider calls made across all operations, failed ones included.
    pub fn provider_calls(&self) -> u64 {
        self.forward.misses + self.reverse.misses + self.lookup.misses
    }
}
