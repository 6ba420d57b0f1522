//! Structured address components.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed set of address component kinds.
///
/// Ordering follows declaration order, from the most specific part of an
/// address to the least specific.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressComponentKind {
    /// House or building number.
    StreetNumber,
    /// Street name.
    Street,
    /// District or neighbourhood.
    Sublocality,
    /// Postal code.
    PostalCode,
    /// City or municipality.
    City,
    /// State, province or region.
    State,
    /// ISO country code.
    CountryCode,
    /// Country name.
    Country,
}

impl AddressComponentKind {
    /// All kinds in declaration order.
    pub const ALL: [AddressComponentKind; 8] = [
        AddressComponentKind::StreetNumber,
        AddressComponentKind::Street,
        AddressComponentKind::Sublocality,
        AddressComponentKind::PostalCode,
        AddressComponentKind::City,
        AddressComponentKind::State,
        AddressComponentKind::CountryCode,
        AddressComponentKind::Country,
    ];

    /// The snake_case name used in serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressComponentKind::StreetNumber => "street_number",
            AddressComponentKind::Street => "street",
            AddressComponentKind::Sublocality => "sublocality",
            AddressComponentKind::PostalCode => "postal_code",
            AddressComponentKind::City => "city",
            AddressComponentKind::State => "state",
            AddressComponentKind::CountryCode => "country_code",
            AddressComponentKind::Country => "country",
        }
    }
}

impl fmt::Display for AddressComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tagged part of an address, e.g. `city = "Salzburg"`.
///
/// Sorts by kind first, then by text.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AddressComponent {
    kind: AddressComponentKind,
    text: String,
}

impl AddressComponent {
    /// Creates a component.
    pub fn new(kind: AddressComponentKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// The component kind.
    pub fn kind(&self) -> AddressComponentKind {
        self.kind
    }

    /// The component text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_order_follows_declaration() {
        let mut sorted = AddressComponentKind::ALL;
        sorted.sort();
        assert_eq!(sorted, AddressComponentKind::ALL);
        assert!(AddressComponentKind::StreetNumber < AddressComponentKind::Country);
    }

    #[test]
    fn test_component_order_by_kind_first() {
        let mut components = vec![
            AddressComponent::new(AddressComponentKind::Country, "Austria"),
            AddressComponent::new(AddressComponentKind::City, "Salzburg"),
            AddressComponent::new(AddressComponentKind::Street, "Getreidegasse"),
        ];
        components.sort();

        let kinds: Vec<_> = components.iter().map(AddressComponent::kind).collect();
        assert_eq!(
            kinds,
            vec![
                AddressComponentKind::Street,
                AddressComponentKind::City,
                AddressComponentKind::Country
            ]
        );
    }

    #[test]
    fn test_serde_names() {
        let c = AddressComponent::new(AddressComponentKind::PostalCode, "5020");
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"kind":"postal_code","text":"5020"}"#);

        for kind in AddressComponentKind::ALL {
            let quoted = serde_json::to_string(&kind).unwrap();
            assert_eq!(quoted, format!("\"{}\"", kind.as_str()));
        }
    }
}
