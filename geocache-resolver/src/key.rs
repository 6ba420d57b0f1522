//! Compound cache keys.

use std::fmt;

use geocache_core::types::{Coordinate, Locale};

/// What is being looked up.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    /// Free-text address, kept verbatim.
    Text(String),
    /// Coordinate for reverse lookup.
    Coordinate(Coordinate),
    /// Provider-defined place id.
    Id(String),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Text(text) => write!(f, "{:?}", text),
            Term::Coordinate(coordinate) => write!(f, "({})", coordinate),
            Term::Id(id) => write!(f, "#{}", id),
        }
    }
}

/// Cache key: a lookup term plus the effective locale.
///
/// Two keys are equal iff both parts are equal. The locale has already been
/// normalized, so "absent" has exactly one representation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LookupKey {
    term: Term,
    locale: Option<Locale>,
}

impl LookupKey {
    /// Key for a forward lookup.
    pub fn text(text: impl Into<String>, locale: Option<Locale>) -> Self {
        Self {
            term: Term::Text(text.into()),
            locale,
        }
    }

    /// Key for a reverse lookup.
    pub fn coordinate(coordinate: Coordinate, locale: Option<Locale>) -> Self {
        Self {
            term: Term::Coordinate(coordinate),
            locale,
        }
    }

    /// Key for a lookup by id.
    pub fn id(id: impl Into<String>, locale: Option<Locale>) -> Self {
        Self {
            term: Term::Id(id.into()),
            locale,
        }
    }

    /// Returns the lookup term.
    pub fn term(&self) -> &Term {
        &self.term
    }

    /// Returns the effective locale.
    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.locale {
            Some(locale) => write!(f, "{}@{}", self.term, locale),
            None => write!(f, "{}", self.term),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    fn locale(raw: &str) -> Option<Locale> {
        Locale::parse(raw).unwrap()
    }

    #[test]
    fn test_equality_covers_term_and_locale() {
        assert_eq!(LookupKey::text("Wien", locale("de")), LookupKey::text("Wien", locale("de")));
        assert_ne!(LookupKey::text("Wien", locale("de")), LookupKey::text("Wien", locale("en")));
        assert_ne!(LookupKey::text("Wien", None), LookupKey::text("Wien", locale("de")));
        assert_ne!(LookupKey::text("Wien", None), LookupKey::text("wien", None));
    }

    #[test]
    fn test_blank_and_absent_locale_match() {
        assert_eq!(LookupKey::id("42", locale("  ")), LookupKey::id("42", None));
        assert_eq!(LookupKey::id("42", locale("EN_us")), LookupKey::id("42", locale("en-US")));
    }

    #[test]
    fn test_term_kinds_never_collide() {
        let keys: HashSet<_> = [
            LookupKey::text("1", None),
            LookupKey::id("1", None),
            LookupKey::coordinate(Coordinate::new(1.0, 1.0).unwrap(), None),
        ]
        .into_iter()
        .collect();
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_display() {
        let key = LookupKey::coordinate(Coordinate::new(45.0, 12.0).unwrap(), locale("de_at"));
        assert_eq!(key.to_string(), "(45,12)@de-AT");
        assert_eq!(LookupKey::id("abc", None).to_string(), "#abc");
        assert_eq!(LookupKey::text("Main St", None).to_string(), "\"Main St\"");
    }
}
