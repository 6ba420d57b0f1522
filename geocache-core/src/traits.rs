//! Common traits for geocache.
//!
//! These traits define the interfaces that different implementations can satisfy,
//! enabling modularity and testing.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Coordinate, Locale, Place};

// ═══════════════════════════════════════════════════════════════════════════════
// GEOCODER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for a geocoding provider.
///
/// Implementations might be:
/// - A remote geocoding HTTP API
/// - A file-backed or in-memory index (for testing/development)
/// - A caching facade wrapping another geocoder
///
/// `locale` is the already-normalized language the caller wants results in;
/// `None` leaves the choice to the provider.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves a free-text address to matching places.
    ///
    /// An empty list means "no match" and is not an error.
    async fn geocode(&self, address: &str, locale: Option<&Locale>) -> Result<Vec<Place>>;

    /// Resolves a coordinate to the places at or near it.
    async fn reverse_geocode(&self, coordinate: Coordinate, locale: Option<&Locale>) -> Result<Vec<Place>>;

    /// Resolves a provider-defined place id.
    ///
    /// Returns `Ok(None)` when the id does not resolve.
    async fn lookup(&self, id: &str, locale: Option<&Locale>) -> Result<Option<Place>>;
}

#[async_trait]
impl<G: Geocoder + ?Sized> Geocoder for Arc<G> {
    async fn geocode(&self, address: &str, locale: Option<&Locale>) -> Result<Vec<Place>> {
        (**self).geocode(address, locale).await
    }

    async fn reverse_geocode(&self, coordinate: Coordinate, locale: Option<&Locale>) -> Result<Vec<Place>> {
        (**self).reverse_geocode(coordinate, locale).await
    }

    async fn lookup(&self, id: &str, locale: Option<&Locale>) -> Result<Option<Place>> {
        (**self).lookup(id, locale).await
    }
}
