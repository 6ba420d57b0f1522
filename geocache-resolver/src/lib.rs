//! # Geocache Resolver
//!
//! Caching facade in front of any [`Geocoder`](geocache_core::Geocoder).
//!
//! [`CachingGeocoder`] keeps three independent expiring caches (forward,
//! reverse, by id) keyed by a [`LookupKey`] of lookup term and effective
//! locale. Concurrent identical requests share one upstream call.
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use async_trait::async_trait;
//! use geocache_core::{Coordinate, Geocoder, Locale, Place, Result};
//! use geocache_resolver::CachingGeocoder;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Geocoder for Echo {
//!     async fn geocode(&self, address: &str, _: Option<&Locale>) -> Result<Vec<Place>> {
//!         Ok(vec![Place::builder(address).address(address).build()])
//!     }
//!     async fn reverse_geocode(&self, _: Coordinate, _: Option<&Locale>) -> Result<Vec<Place>> {
//!         Ok(Vec::new())
//!     }
//!     async fn lookup(&self, _: &str, _: Option<&Locale>) -> Result<Option<Place>> {
//!         Ok(None)
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let geocoder = CachingGeocoder::with_ttl(Arc::new(Echo), Duration::from_secs(60)).unwrap();
//! let places = geocoder.geocode("Main Street 1", Some("en_US")).await.unwrap();
//! assert_eq!(places[0].address(), Some("Main Street 1"));
//! assert_eq!(geocoder.stats().forward.misses, 1);
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod config;
mod key;
mod resolver;

pub use config::ResolverConfig;
pub use key::{LookupKey, Term};
pub use resolver::{CachingGeocoder, ResolverStats};
