//! Expiring single-flight cache for geocache.
//!
//! [`ExpiringCache`] is a generic key → value store that:
//!
//! - runs at most one load per key at a time, handing the outcome to every
//!   caller that arrived while it was running;
//! - expires entries lazily after a configurable TTL (fixed or sliding);
//! - never stores failures, so the next caller retries.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use geocache_cache::ExpiringCache;
//! use geocache_core::GeocodeError;
//!
//! # tokio_test::block_on(async {
//! let cache: ExpiringCache<String, String, GeocodeError> =
//!     ExpiringCache::with_ttl(Duration::from_secs(60)).unwrap();
//!
//! let value = cache
//!     .get_or_load("greeting".to_string(), |key| async move { Ok(format!("hello {}", key)) })
//!     .await
//!     .unwrap();
//! assert_eq!(value, "hello greeting");
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
mod config;
mod flight;
mod value;

pub use cache::{CacheStats, ExpiringCache};
pub use config::{CacheConfig, ExpiryPolicy};
pub use value::CacheValue;
