//! File-backed geocoding provider.
//!
//! Loads places from a JSON file into a [`MemoryGeocoder`] and serves them
//! from memory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use geocache_core::error::{GeocodeError, Result};
use geocache_core::traits::Geocoder;
use geocache_core::types::{Coordinate, Locale, Place};

use crate::MemoryGeocoder;

/// File-backed geocoding provider.
///
/// # File Format
///
/// A JSON array of place records:
///
/// ```json
/// [
///   {
///     "id": "salzburg-hbf",
///     "address": "Südtiroler Platz 1, 5020 Salzburg",
///     "coordinate": { "lat": 47.8128, "lon": 13.0456 },
///     "components": [{ "kind": "city", "text": "Salzburg" }],
///     "metadata": { "source": "osm" }
///   }
/// ]
/// ```
pub struct FileGeocoder {
    /// Path to the places file
    path: PathBuf,
    /// In-memory index
    memory: MemoryGeocoder,
}

impl FileGeocoder {
    /// Loads the places file at `path`.
    ///
    /// A missing or unreadable file, malformed JSON, an invalid coordinate or a
    /// blank place id is an error.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_index(path, MemoryGeocoder::new()).await
    }

    /// Loads the places file at `path` into a preconfigured index.
    pub async fn with_index(path: impl AsRef<Path>, memory: MemoryGeocoder) -> Result<Self> {
        let geocoder = Self {
            path: path.as_ref().to_path_buf(),
            memory,
        };
        geocoder.reload().await?;
        Ok(geocoder)
    }

    /// Re-reads the file, replacing every place. Returns how many were loaded.
    ///
    /// On error the current places are kept.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn reload(&self) -> Result<usize> {
        let contents = fs::read(&self.path).await.map_err(|e| {
            GeocodeError::IoError(format!("failed to read places file {}: {}", self.path.display(), e))
        })?;
        let places: Vec<Place> = serde_json::from_slice(&contents).map_err(|e| {
            GeocodeError::JsonError(format!("invalid places file {}: {}", self.path.display(), e))
        })?;

        self.memory.clear();
        let count = self.memory.import(places);
        info!(count, "Loaded places");
        Ok(count)
    }

    /// Writes the current places back to the file.
    ///
    /// Writes to a temporary file first, then renames it over the original.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn save(&self) -> Result<()> {
        let places = self.memory.all_places();
        let serialized = serde_json::to_vec_pretty(&places)?;

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&serialized).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!(count = places.len(), "Saved places");
        Ok(())
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the underlying index for direct access.
    pub fn memory(&self) -> &MemoryGeocoder {
        &self.memory
    }

    /// Returns the number of places.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }
}

#[async_trait]
impl Geocoder for FileGeocoder {
    async fn geocode(&self, address: &str, locale: Option<&Locale>) -> Result<Vec<Place>> {
        self.memory.geocode(address, locale).await
    }

    async fn reverse_geocode(&self, coordinate: Coordinate, locale: Option<&Locale>) -> Result<Vec<Place>> {
        self.memory.reverse_geocode(coordinate, locale).await
    }

    async fn lookup(&self, id: &str, locale: Option<&Locale>) -> Result<Option<Place>> {
        self.memory.lookup(id, locale).await
    }
}
