//! Constants shared across geocache crates.

use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default time-to-live for cached lookups (24 hours).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

// ═══════════════════════════════════════════════════════════════════════════════
// COORDINATES
// ═══════════════════════════════════════════════════════════════════════════════

/// Smallest valid latitude in degrees.
pub const MIN_LATITUDE: f64 = -90.0;

/// Largest valid latitude in degrees.
pub const MAX_LATITUDE: f64 = 90.0;

/// Smallest valid longitude in degrees.
pub const MIN_LONGITUDE: f64 = -180.0;

/// Largest valid longitude in degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

/// Mean earth radius used for haversine distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

// ═══════════════════════════════════════════════════════════════════════════════
// LOCALES
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum length of a single locale subtag.
pub const MAX_LOCALE_SUBTAG_LEN: usize = 8;

/// Maximum total length of a locale tag.
pub const MAX_LOCALE_LEN: usize = 35;
