//! # Geocache Core
//!
//! Core types, errors, and traits shared by every geocache crate.
//!
//! - **Types**: [`Coordinate`], [`AddressComponent`], [`Place`] and [`Locale`]
//! - **Errors**: [`GeocodeError`], cloneable so one failure can reach many waiters
//! - **Constants**: Defaults for TTLs and coordinate bounds
//! - **Traits**: [`Geocoder`], the provider interface every backend implements
//!
//! ## Example
//!
//! ```rust
//! use geocache_core::{AddressComponentKind, Coordinate, Place};
//!
//! let place = Place::builder("osm:1234")
//!     .address("Jakob-Haringer-Straße 3, 5020 Salzburg")
//!     .coordinate(Coordinate::new(47.8227, 13.0400).unwrap())
//!     .component(AddressComponentKind::City, "Salzburg")
//!     .build();
//!
//! assert_eq!(place.component(AddressComponentKind::City), Some("Salzburg"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{GeocodeError, Result};
pub use traits::*;
pub use types::*;
