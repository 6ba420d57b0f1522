//! The canonical lookup result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{AddressComponent, AddressComponentKind, Coordinate};
use crate::error::GeocodeError;

/// A place returned by a provider.
///
/// Places are immutable once built. A deserialized place must have a
/// non-blank id. `components` holds at most one entry per
/// [`AddressComponentKind`]; when a builder or record supplies the same kind
/// twice, the first value wins.
///
/// # Example
/// ```
/// use geocache_core::{AddressComponentKind, Place};
///
/// let place = Place::builder("42")
///     .component(AddressComponentKind::City, "Salzburg")
///     .component(AddressComponentKind::City, "Linz")
///     .metadata("osm_type", "node")
///     .build();
///
/// assert_eq!(place.component(AddressComponentKind::City), Some("Salzburg"));
/// assert_eq!(place.metadata().get("osm_type").map(String::as_str), Some("node"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PlaceRecord", into = "PlaceRecord")]
pub struct Place {
    id: String,
    address: Option<String>,
    coordinate: Option<Coordinate>,
    components: BTreeMap<AddressComponentKind, String>,
    metadata: BTreeMap<String, String>,
}

impl Place {
    /// Starts building a place with the provider-defined `id`.
    pub fn builder(id: impl Into<String>) -> PlaceBuilder {
        PlaceBuilder {
            place: Place {
                id: id.into(),
                address: None,
                coordinate: None,
                components: BTreeMap::new(),
                metadata: BTreeMap::new(),
            },
        }
    }

    /// Provider-defined identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Formatted display address.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Location of the place.
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    /// Text of the component of the given kind.
    pub fn component(&self, kind: AddressComponentKind) -> Option<&str> {
        self.components.get(&kind).map(String::as_str)
    }

    /// All components, ordered by kind.
    pub fn components(&self) -> impl Iterator<Item = AddressComponent> + '_ {
        self.components
            .iter()
            .map(|(kind, text)| AddressComponent::new(*kind, text.clone()))
    }

    /// Provider-specific key/value pairs.
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}

/// Builder for [`Place`].
#[derive(Debug)]
pub struct PlaceBuilder {
    place: Place,
}

impl PlaceBuilder {
    /// Sets the display address.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.place.address = Some(address.into());
        self
    }

    /// Sets the coordinate.
    pub fn coordinate(mut self, coordinate: Coordinate) -> Self {
        self.place.coordinate = Some(coordinate);
        self
    }

    /// Adds a component unless one of the same kind is already present.
    pub fn component(mut self, kind: AddressComponentKind, text: impl Into<String>) -> Self {
        self.place.components.entry(kind).or_insert_with(|| text.into());
        self
    }

    /// Adds all components, first-wins per kind.
    pub fn components(self, components: impl IntoIterator<Item = AddressComponent>) -> Self {
        components
            .into_iter()
            .fold(self, |builder, c| builder.component(c.kind(), c.text()))
    }

    /// Adds a metadata pair. Later values for the same key replace earlier ones.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.place.metadata.insert(key.into(), value.into());
        self
    }

    /// Finishes the place.
    pub fn build(self) -> Place {
        self.place
    }
}

/// Serialized form of a [`Place`].
#[derive(Clone, Debug, Serialize, Deserialize)]
struct PlaceRecord {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coordinate: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    components: Vec<AddressComponent>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, String>,
}

impl TryFrom<PlaceRecord> for Place {
    type Error = GeocodeError;

    fn try_from(record: PlaceRecord) -> Result<Self, Self::Error> {
        if record.id.trim().is_empty() {
            return Err(GeocodeError::InvalidPlace("place id must not be empty".into()));
        }

        let mut builder = Place::builder(record.id).components(record.components);
        if let Some(address) = record.address {
            builder = builder.address(address);
        }
        if let Some(coordinate) = record.coordinate {
            builder = builder.coordinate(coordinate);
        }
        builder.place.metadata = record.metadata;
        Ok(builder.build())
    }
}

impl From<Place> for PlaceRecord {
    fn from(place: Place) -> Self {
        let components = place.components().collect();
        Self {
            id: place.id,
            address: place.address,
            coordinate: place.coordinate,
            components,
            metadata: place.metadata,
        }
    }
}
