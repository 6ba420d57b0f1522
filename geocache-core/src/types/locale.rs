//! Locale tags used to request localized results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{MAX_LOCALE_LEN, MAX_LOCALE_SUBTAG_LEN};
use crate::error::{GeocodeError, Result};

/// A normalized BCP 47 style language tag such as `en`, `de-AT` or `zh-Hant-TW`.
///
/// A `Locale` always holds a non-empty, canonical tag. A missing locale is
/// `Option::<Locale>::None` and nothing else: [`Locale::parse`] maps blank
/// input to `None`, so an empty string and an absent value can never produce
/// different cache keys.
///
/// Canonical form:
/// - `_` separators become `-`
/// - the primary language subtag is lowercase
/// - two-letter subtags after it are uppercase (`AT`)
/// - four-letter alphabetic subtags after it are title case (`Hant`)
/// - everything else is lowercase
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale(String);

impl Locale {
    /// Parses and normalizes `raw`.
    ///
    /// Returns `Ok(None)` for empty or whitespace-only input.
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.len() > MAX_LOCALE_LEN {
            return Err(GeocodeError::invalid_locale(
                trimmed,
                format!("longer than {} characters", MAX_LOCALE_LEN),
            ));
        }

        let mut canonical = String::with_capacity(trimmed.len());
        for (i, subtag) in trimmed.split(&['-', '_'][..]).enumerate() {
            if subtag.is_empty() {
                return Err(GeocodeError::invalid_locale(trimmed, "empty subtag"));
            }
            if subtag.len() > MAX_LOCALE_SUBTAG_LEN {
                return Err(GeocodeError::invalid_locale(
                    trimmed,
                    format!("subtag '{}' longer than {} characters", subtag, MAX_LOCALE_SUBTAG_LEN),
                ));
            }

            if i == 0 {
                if subtag.len() < 2 || !subtag.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(GeocodeError::invalid_locale(
                        trimmed,
                        "language must be 2-8 ASCII letters",
                    ));
                }
                canonical.push_str(&subtag.to_ascii_lowercase());
                continue;
            }

            if !subtag.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(GeocodeError::invalid_locale(
                    trimmed,
                    format!("subtag '{}' is not alphanumeric", subtag),
                ));
            }

            canonical.push('-');
            match subtag.len() {
                2 => canonical.push_str(&subtag.to_ascii_uppercase()),
                4 if subtag.chars().all(|c| c.is_ascii_alphabetic()) => {
                    let lower = subtag.to_ascii_lowercase();
                    let mut chars = lower.chars();
                    if let Some(first) = chars.next() {
                        canonical.push(first.to_ascii_uppercase());
                        canonical.push_str(chars.as_str());
                    }
                }
                _ => canonical.push_str(&subtag.to_ascii_lowercase()),
            }
        }

        Ok(Some(Locale(canonical)))
    }

    /// Parses a tag that must be present.
    pub fn new(raw: &str) -> Result<Self> {
        Self::parse(raw)?.ok_or_else(|| GeocodeError::invalid_locale(raw, "locale must not be empty"))
    }

    /// Parses an optional tag, treating `None` and blank strings alike.
    pub fn parse_opt(raw: Option<&str>) -> Result<Option<Self>> {
        match raw {
            Some(raw) => Self::parse(raw),
            None => Ok(None),
        }
    }

    /// The canonical tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The primary language subtag, e.g. `de` for `de-AT`.
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = GeocodeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Locale::new(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("en", "en"; "language only")]
    #[test_case("EN", "en"; "uppercase language")]
    #[test_case("en_us", "en-US"; "underscore region")]
    #[test_case("DE-at", "de-AT"; "mixed case region")]
    #[test_case("zh-hant-tw", "zh-Hant-TW"; "script and region")]
    #[test_case("sr_LATN", "sr-Latn"; "script only")]
    #[test_case("es-419", "es-419"; "numeric region")]
    #[test_case("  fr-CA  ", "fr-CA"; "surrounding whitespace")]
    fn test_normalization(raw: &str, expected: &str) {
        let locale = Locale::parse(raw).unwrap().unwrap();
        assert_eq!(locale.as_str(), expected);
    }

    #[test_case(""; "empty")]
    #[test_case("   "; "whitespace")]
    fn test_blank_is_absent(raw: &str) {
        assert_eq!(Locale::parse(raw).unwrap(), None);
        assert!(Locale::new(raw).is_err());
    }

    #[test_case("e"; "language too short")]
    #[test_case("e1"; "language has digit")]
    #[test_case("en--US"; "empty subtag")]
    #[test_case("en-"; "trailing separator")]
    #[test_case("en-US!"; "punctuation")]
    #[test_case("en-abcdefghi"; "subtag too long")]
    fn test_rejects(raw: &str) {
        let err = Locale::parse(raw).unwrap_err();
        assert!(matches!(err, GeocodeError::InvalidLocale { .. }));
    }

    #[test]
    fn test_parse_opt() {
        assert_eq!(Locale::parse_opt(None).unwrap(), None);
        assert_eq!(Locale::parse_opt(Some("")).unwrap(), None);
        assert_eq!(Locale::parse_opt(Some("de")).unwrap(), Some(Locale::new("de").unwrap()));
    }

    #[test]
    fn test_language() {
        assert_eq!(Locale::new("de-AT").unwrap().language(), "de");
        assert_eq!(Locale::new("it").unwrap().language(), "it");
    }

    #[test]
    fn test_serde() {
        let locale: Locale = serde_json::from_str("\"pt_br\"").unwrap();
        assert_eq!(locale.as_str(), "pt-BR");
        assert_eq!(serde_json::to_string(&locale).unwrap(), "\"pt-BR\"");
        assert!(serde_json::from_str::<Locale>("\"\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_normalization_idempotent(raw in "[a-zA-Z]{2,8}([-_][a-zA-Z0-9]{1,8}){0,3}") {
            if let Some(first) = Locale::parse(&raw).unwrap() {
                let again = Locale::parse(first.as_str()).unwrap().unwrap();
                prop_assert_eq!(first, again);
            }
        }

        #[test]
        fn prop_case_insensitive(raw in "[a-z]{2,3}(-[a-z]{2})?") {
            let lower = Locale::parse(&raw).unwrap();
            let upper = Locale::parse(&raw.to_uppercase()).unwrap();
            prop_assert_eq!(lower, upper);
        }
    }
}
