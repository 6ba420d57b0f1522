//! # Geocache Registry
//!
//! Geocoding providers backed by local data, for development, testing and
//! offline use:
//!
//! - **Memory**: a concurrent in-memory place index
//! - **File**: the same index loaded from a JSON file of places
//!
//! ## Example
//!
//! ```rust
//! use geocache_core::{Coordinate, Geocoder, Place};
//! use geocache_registry::MemoryGeocoder;
//!
//! # tokio_test::block_on(async {
//! let geocoder = MemoryGeocoder::new();
//! geocoder.insert(
//!     Place::builder("salzburg")
//!         .address("Salzburg, Austria")
//!         .coordinate(Coordinate::new(47.8095, 13.055).unwrap())
//!         .build(),
//! );
//!
//! let found = geocoder.geocode("salz", None).await.unwrap();
//! assert_eq!(found[0].id(), "salzburg");
//!
//! let near = geocoder.reverse_geocode(Coordinate::new(47.81, 13.05).unwrap(), None).await.unwrap();
//! assert_eq!(near.len(), 1);
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod file;
mod memory;

pub use file::FileGeocoder;
pub use memory::MemoryGeocoder;
