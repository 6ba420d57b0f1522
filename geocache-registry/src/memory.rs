//! In-memory place index.
//!
//! Fast, thread-safe storage suitable for development, testing,
//! and as the backing store of the file provider.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, instrument};

use geocache_core::error::{GeocodeError, Result};
use geocache_core::traits::Geocoder;
use geocache_core::types::{Coordinate, Locale, Place};

/// Default search radius for reverse geocoding.
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 1.0;

/// Default cap on reverse geocoding results.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// In-memory geocoding provider.
///
/// # Queries
///
/// - Forward: case-insensitive substring match against the display address
///   and every address component, ordered by id
/// - Reverse: places within `max_distance_km`, nearest first, at most
///   `max_results` of them
/// - Lookup: by id
///
/// Locales are accepted and ignored; every place has one display form.
///
/// # Thread Safety
///
/// All operations are thread-safe and can be called concurrently.
#[derive(Debug)]
pub struct MemoryGeocoder {
    /// Primary storage: id → place
    places: DashMap<String, Place>,
    max_distance_km: f64,
    max_results: usize,
    /// Simulated upstream latency
    latency: Option<Duration>,
    /// Number of geocoding requests served
    requests: AtomicU64,
}

impl MemoryGeocoder {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            places: DashMap::new(),
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            max_results: DEFAULT_MAX_RESULTS,
            latency: None,
            requests: AtomicU64::new(0),
        }
    }

    /// Creates an index holding `places`.
    pub fn with_places(places: impl IntoIterator<Item = Place>) -> Self {
        let geocoder = Self::new();
        geocoder.import(places);
        geocoder
    }

    /// Sets the reverse geocoding radius in kilometres.
    pub fn with_max_distance_km(mut self, km: f64) -> Result<Self> {
        if !km.is_finite() || km < 0.0 {
            return Err(GeocodeError::ConfigError(format!(
                "max_distance_km must be a non-negative number, got {}",
                km
            )));
        }
        self.max_distance_km = km;
        Ok(self)
    }

    /// Caps the number of reverse geocoding results.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Delays every request by `latency`, like a remote service would.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Adds or replaces a place. Returns the place it replaced.
    pub fn insert(&self, place: Place) -> Option<Place> {
        self.places.insert(place.id().to_string(), place)
    }

    /// Adds or replaces many places. Returns how many were given.
    pub fn import(&self, places: impl IntoIterator<Item = Place>) -> usize {
        let mut imported = 0;
        for place in places {
            self.insert(place);
            imported += 1;
        }
        imported
    }

    /// Removes a place by id.
    pub fn remove(&self, id: &str) -> Option<Place> {
        self.places.remove(id).map(|(_, place)| place)
    }

    /// Removes every place.
    pub fn clear(&self) {
        self.places.clear();
    }

    /// Returns the number of places.
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Returns all places, ordered by id.
    pub fn all_places(&self) -> Vec<Place> {
        let mut places: Vec<Place> = self.places.iter().map(|entry| entry.value().clone()).collect();
        places.sort_by(|a, b| a.id().cmp(b.id()));
        places
    }

    /// Returns how many geocoding requests have been served.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    async fn begin_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn matches(place: &Place, needle: &str) -> bool {
        let address = place.address().map(str::to_lowercase);
        address.is_some_and(|a| a.contains(needle))
            || place
                .components()
                .any(|component| component.text().to_lowercase().contains(needle))
    }
}

impl Default for MemoryGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for MemoryGeocoder {
    #[instrument(skip(self, _locale))]
    async fn geocode(&self, address: &str, _locale: Option<&Locale>) -> Result<Vec<Place>> {
        self.begin_request().await;

        let needle = address.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut places: Vec<Place> = self
            .places
            .iter()
            .filter(|entry| Self::matches(entry.value(), &needle))
            .map(|entry| entry.value().clone())
            .collect();
        places.sort_by(|a, b| a.id().cmp(b.id()));

        debug!(address, count = places.len(), "Forward search");
        Ok(places)
    }

    #[instrument(skip(self, _locale))]
    async fn reverse_geocode(&self, coordinate: Coordinate, _locale: Option<&Locale>) -> Result<Vec<Place>> {
        self.begin_request().await;

        let mut nearby: Vec<(f64, Place)> = self
            .places
            .iter()
            .filter_map(|entry| {
                let distance = entry.value().coordinate()?.distance_km(&coordinate);
                (distance <= self.max_distance_km).then(|| (distance, entry.value().clone()))
            })
            .collect();
        nearby.sort_by(|(da, a), (db, b)| {
            da.partial_cmp(db)
                .unwrap_or(CmpOrdering::Equal)
                .then_with(|| a.id().cmp(b.id()))
        });
        nearby.truncate(self.max_results);

        debug!(%coordinate, count = nearby.len(), "Reverse search");
        Ok(nearby.into_iter().map(|(_, place)| place).collect())
    }

    #[instrument(skip(self, _locale))]
    async fn lookup(&self, id: &str, _locale: Option<&Locale>) -> Result<Option<Place>> {
        self.begin_request().await;
        Ok(self.places.get(id).map(|entry| entry.value().clone()))
    }
}
