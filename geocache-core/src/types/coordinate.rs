//! Geographic coordinates.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{EARTH_RADIUS_KM, MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE};
use crate::error::{GeocodeError, Result};

/// A WGS84 latitude/longitude pair in degrees.
///
/// Both values are finite and in range; this is checked once in
/// [`Coordinate::new`]. Equality is exact floating-point equality on both
/// fields, so two coordinates a millimetre apart are different cache keys.
///
/// `-0.0` is stored as `0.0` so that hashing the bit pattern agrees with `==`.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Creates a validated coordinate.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(GeocodeError::InvalidCoordinate(format!(
                "latitude and longitude must be finite, got {},{}",
                lat, lon
            )));
        }
        if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&lat) {
            return Err(GeocodeError::InvalidCoordinate(format!(
                "latitude {} outside [{}, {}]",
                lat, MIN_LATITUDE, MAX_LATITUDE
            )));
        }
        if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&lon) {
            return Err(GeocodeError::InvalidCoordinate(format!(
                "longitude {} outside [{}, {}]",
                lon, MIN_LONGITUDE, MAX_LONGITUDE
            )));
        }

        Ok(Self {
            lat: positive_zero(lat),
            lon: positive_zero(lon),
        })
    }

    /// Parses a coordinate from separate latitude and longitude strings.
    pub fn parse_pair(lat: &str, lon: &str) -> Result<Self> {
        let lat = parse_degrees(lat, "latitude")?;
        let lon = parse_degrees(lon, "longitude")?;
        Self::new(lat, lon)
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Great-circle distance to `other` in kilometres (haversine).
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
    }
}

fn positive_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

fn parse_degrees(raw: &str, what: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| GeocodeError::InvalidCoordinate(format!("{} '{}': {}", what, raw.trim(), e)))
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.lat == other.lat && self.lon == other.lon
    }
}

// NaN is rejected at construction, so `==` is reflexive.
impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lat.to_bits().hash(state);
        self.lon.to_bits().hash(state);
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// Parses `"lat,lon"`.
impl FromStr for Coordinate {
    type Err = GeocodeError;

    fn from_str(s: &str) -> Result<Self> {
        let (lat, lon) = s.split_once(',').ok_or_else(|| {
            GeocodeError::InvalidCoordinate(format!("expected 'lat,lon', got '{}'", s))
        })?;
        Self::parse_pair(lat, lon)
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            lat: f64,
            lon: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Coordinate::new(raw.lat, raw.lon).map_err(serde::de::Error::custom)
    }
}
